//! Field validators
//!
//! Each validator either accepts a value (possibly normalising it) or fails
//! with `GradebookError::Validation` naming the field. Entity types list the
//! validators for their fields as a static `FieldRule` table, and
//! `Entity::construct` applies that table uniformly before building the
//! instance, both for rows coming back from storage and for new instances.

use crate::entity::Record;
use crate::errors::{GradebookError, Result};
use crate::value::Value;
use sha2::{Digest, Sha256};

const RUSSIAN_ALPHABET: &str = "абвгдеёжзийклмнопрстуфхцчшщъыьэюя";
const EMAIL_EXTRA_CHARS: &str = "-.@_";

pub const PERSONAL_DATA_LENGTH: (usize, usize) = (2, 20);
pub const PASSWORD_LENGTH: (usize, usize) = (8, 25);
pub const TITLE_MAX_LENGTH: usize = 30;
pub const GRADE_RANGE: (i64, i64) = (1, 5);

/// Validator applied to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    /// Names: Russian letters only, normalised to `Capitalised` form
    PersonalData,
    Email,
    /// Stored password: SHA-256 hex digest
    PasswordDigest,
    GradeValue,
    /// Class and subject names
    Title,
}

/// Binding of a validator to a field name
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: FieldCheck,
}

impl FieldRule {
    pub const fn new(field: &'static str, check: FieldCheck) -> Self {
        Self { field, check }
    }
}

/// Run every rule against the record, replacing values with their
/// normalised form. Fields absent from the record are left for the
/// entity constructor to report.
pub fn apply_rules(rules: &[FieldRule], record: &mut Record) -> Result<()> {
    for rule in rules {
        let Some(value) = record.get_value_mut(rule.field) else {
            continue;
        };
        *value = check_value(rule, value)?;
    }
    Ok(())
}

fn check_value(rule: &FieldRule, value: &Value) -> Result<Value> {
    match rule.check {
        FieldCheck::GradeValue => {
            let grade = value.as_i64().ok_or_else(|| {
                GradebookError::validation(rule.field, "grade must be an integer")
            })?;
            validate_grade_value(grade)?;
            Ok(Value::Integer(grade))
        }
        FieldCheck::PersonalData => {
            check_text(rule, value, |text| validate_personal_data(rule.field, text))
        }
        FieldCheck::Email => check_text(rule, value, |text| {
            validate_email(text)?;
            Ok(text.to_string())
        }),
        FieldCheck::PasswordDigest => check_text(rule, value, |text| {
            validate_password_digest(text)?;
            Ok(text.to_string())
        }),
        FieldCheck::Title => check_text(rule, value, |text| validate_title(rule.field, text)),
    }
}

fn check_text(
    rule: &FieldRule,
    value: &Value,
    check: impl FnOnce(&str) -> Result<String>,
) -> Result<Value> {
    let text = value
        .as_text()
        .ok_or_else(|| GradebookError::validation(rule.field, "argument must be a string"))?;
    check(text).map(Value::Text)
}

fn check_length(field: &str, value: &str, (min, max): (usize, usize)) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(GradebookError::validation(
            field,
            format!("length must be within [{}; {}]", min, max),
        ));
    }
    Ok(())
}

fn check_characters(field: &str, value: &str, allowed: impl Fn(char) -> bool) -> Result<()> {
    if value.to_lowercase().chars().all(allowed) {
        Ok(())
    } else {
        Err(GradebookError::validation(
            field,
            "contains characters that are not allowed",
        ))
    }
}

/// First, second and patronymic names
///
/// Returns the name in lower case with a capital first letter.
pub fn validate_personal_data(field: &str, value: &str) -> Result<String> {
    check_length(field, value, PERSONAL_DATA_LENGTH)?;
    check_characters(field, value, |c| RUSSIAN_ALPHABET.contains(c))?;

    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    Ok(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    })
}

pub fn validate_email(value: &str) -> Result<()> {
    if !value.contains('@') {
        return Err(GradebookError::validation("email", "invalid email"));
    }
    check_characters("email", value, |c| {
        c.is_ascii_alphanumeric() || EMAIL_EXTRA_CHARS.contains(c)
    })
}

/// Raw password strength rules, checked before hashing
pub fn validate_password(value: &str) -> Result<()> {
    check_length("password", value, PASSWORD_LENGTH)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_ascii_punctuation())
    {
        return Err(GradebookError::validation(
            "password",
            "contains characters that are not allowed",
        ));
    }

    let required: [(&str, fn(&char) -> bool); 4] = [
        ("a lower-case letter", char::is_ascii_lowercase),
        ("an upper-case letter", char::is_ascii_uppercase),
        ("a digit", char::is_ascii_digit),
        ("a punctuation character", char::is_ascii_punctuation),
    ];
    for (description, predicate) in required {
        if !value.chars().any(|c| predicate(&c)) {
            return Err(GradebookError::validation(
                "password",
                format!("must contain at least {}", description),
            ));
        }
    }
    Ok(())
}

pub fn validate_password_digest(value: &str) -> Result<()> {
    let is_digest = value.len() == 64
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if is_digest {
        Ok(())
    } else {
        Err(GradebookError::validation(
            "password",
            "stored password must be a SHA-256 hex digest",
        ))
    }
}

pub fn validate_grade_value(value: i64) -> Result<()> {
    let (min, max) = GRADE_RANGE;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GradebookError::validation(
            "value",
            format!("grade must be within [{}; {}]", min, max),
        ))
    }
}

/// Class and subject names: trimmed, non-empty, bounded
pub fn validate_title(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    check_length(field, trimmed, (1, TITLE_MAX_LENGTH))?;
    Ok(trimmed.to_string())
}

/// Digest stored in place of a user's password
///
/// Salted with the user's second name and email, so equal passwords of
/// different users produce different digests.
pub fn password_hash(second_name: &str, password: &str, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(second_name.as_bytes());
    hasher.update(password.as_bytes());
    hasher.update(email.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_data_is_capitalised() {
        assert_eq!(
            validate_personal_data("first_name", "иВАН").unwrap(),
            "Иван"
        );
    }

    #[test]
    fn test_personal_data_rejects_latin_and_bad_length() {
        assert!(validate_personal_data("first_name", "Ivan").is_err());
        assert!(validate_personal_data("first_name", "я").is_err());
        assert!(validate_personal_data("first_name", &"а".repeat(21)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("student.one@school-1.ru").is_ok());
        assert!(validate_email("no-at-sign.ru").is_err());
        assert!(validate_email("semi;colon@school.ru").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Qwerty1!").is_ok());
        assert!(validate_password("Qw1!").is_err());
        assert!(validate_password("qwerty1!").is_err());
        assert!(validate_password("QWERTY1!").is_err());
        assert!(validate_password("Qwertyu!").is_err());
        assert!(validate_password("Qwerty12").is_err());
        assert!(validate_password("Qwerty1! ").is_err());
    }

    #[test]
    fn test_password_hash_is_a_valid_digest() {
        let digest = password_hash("Иванов", "Qwerty1!", "ivanov@school.ru");
        assert!(validate_password_digest(&digest).is_ok());
        assert_ne!(
            digest,
            password_hash("Петров", "Qwerty1!", "ivanov@school.ru")
        );
    }

    #[test]
    fn test_grade_range() {
        assert!(validate_grade_value(1).is_ok());
        assert!(validate_grade_value(5).is_ok());
        assert!(validate_grade_value(0).is_err());
        assert!(validate_grade_value(6).is_err());
    }

    #[test]
    fn test_title_is_trimmed() {
        assert_eq!(validate_title("name", "  10А ").unwrap(), "10А");
        assert!(validate_title("name", "   ").is_err());
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = validate_personal_data("patronymic", "x").unwrap_err();
        assert!(matches!(err, GradebookError::Validation { ref field, .. } if field == "patronymic"));
    }
}
