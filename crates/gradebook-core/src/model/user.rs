//! School users: teachers, students and administrators
//!
//! All three share the same personal data block. Passwords are never kept
//! in clear: a new user is built from a raw password, which is validated
//! and then replaced by its salted digest.

use gradebook_core_types::Sensitive;
use serde::Serialize;
use std::fmt;

use super::school::Class;
use crate::entity::{Attribute, Entity, Record, Related};
use crate::errors::Result;
use crate::rules::validation::{
    validate_email, validate_password, validate_personal_data, FieldCheck, FieldRule,
};
use crate::rules::password_hash;
use crate::schema::{Relation, Schema};

/// Validators shared by every user type
const PERSON_RULES: &[FieldRule] = &[
    FieldRule::new("first_name", FieldCheck::PersonalData),
    FieldRule::new("second_name", FieldCheck::PersonalData),
    FieldRule::new("patronymic", FieldCheck::PersonalData),
    FieldRule::new("email", FieldCheck::Email),
    FieldRule::new("password", FieldCheck::PasswordDigest),
];

pub static TEACHER_SCHEMA: Schema = Schema {
    entity: "Teacher",
    table: "teachers",
    attributes: &[
        "pk",
        "first_name",
        "second_name",
        "patronymic",
        "email",
        "password",
        "information",
    ],
    relations: &[],
};

pub static STUDENT_SCHEMA: Schema = Schema {
    entity: "Student",
    table: "students",
    attributes: &[
        "pk",
        "first_name",
        "second_name",
        "patronymic",
        "email",
        "password",
        "school_class",
    ],
    relations: &[Relation {
        attribute: "school_class",
        target: &super::school::CLASS_SCHEMA,
    }],
};

pub static ADMINISTRATOR_SCHEMA: Schema = Schema {
    entity: "Administrator",
    table: "administrators",
    attributes: &[
        "pk",
        "first_name",
        "second_name",
        "patronymic",
        "email",
        "password",
    ],
    relations: &[],
};

/// Raw personal data supplied when registering a user
#[derive(Debug, Clone)]
pub struct NewPerson<'a> {
    pub first_name: &'a str,
    pub second_name: &'a str,
    pub patronymic: &'a str,
    pub email: &'a str,
    /// Clear-text password; validated, then only its digest is kept
    pub password: Sensitive<String>,
}

/// Personal data block of a stored user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub first_name: String,
    pub second_name: String,
    pub patronymic: String,
    pub email: String,
    #[serde(skip)]
    password: String,
}

impl Person {
    /// Start a record for `schema` holding the person's fields
    ///
    /// The raw password is checked against the password policy and the
    /// digest is computed over the normalised second name.
    fn new_record(schema: &'static Schema, new: &NewPerson<'_>) -> Result<Record> {
        let password = new.password.expose();
        validate_password(password)?;
        validate_email(new.email)?;
        let second_name = validate_personal_data("second_name", new.second_name)?;
        let digest = password_hash(&second_name, password, new.email);
        Record::new(schema)
            .with("first_name", new.first_name)?
            .with("second_name", second_name)?
            .with("patronymic", new.patronymic)?
            .with("email", new.email)?
            .with("password", digest)
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Person {
            first_name: record.take_text("first_name")?,
            second_name: record.take_text("second_name")?,
            patronymic: record.take_text("patronymic")?,
            email: record.take_text("email")?,
            password: record.take_text("password")?,
        })
    }

    fn write(&self, record: Record) -> Result<Record> {
        record
            .with("first_name", &self.first_name)?
            .with("second_name", &self.second_name)?
            .with("patronymic", &self.patronymic)?
            .with("email", &self.email)?
            .with("password", &self.password)
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        let value = match name {
            "first_name" => &self.first_name,
            "second_name" => &self.second_name,
            "patronymic" => &self.patronymic,
            "email" => &self.email,
            "password" => &self.password,
            _ => return None,
        };
        Some(Attribute::Value(value.into()))
    }

    /// Stored password digest
    pub fn password_digest(&self) -> &str {
        &self.password
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        password_hash(&self.second_name, candidate, &self.email) == self.password
    }

    /// `Second First Patronymic`
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.second_name, self.first_name, self.patronymic)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.full_name(), self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teacher {
    pub pk: Option<i64>,
    #[serde(flatten)]
    pub person: Person,
    /// Free-form note shown on the teacher's profile
    pub information: Option<String>,
}

impl Teacher {
    pub fn new(person: NewPerson<'_>, information: Option<&str>) -> Result<Self> {
        let record = Person::new_record(&TEACHER_SCHEMA, &person)?.with("information", information)?;
        Self::construct(record)
    }
}

impl Entity for Teacher {
    fn schema() -> &'static Schema {
        &TEACHER_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        match name {
            "information" => Some(Attribute::Value(self.information.clone().into())),
            _ => self.person.attribute(name),
        }
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Teacher {
            pk: None,
            person: Person::from_record(record)?,
            information: record.take_optional_text("information")?,
        })
    }

    fn field_rules() -> &'static [FieldRule] {
        PERSON_RULES
    }

    fn to_record(&self) -> Result<Record> {
        self.person
            .write(Record::new(&TEACHER_SCHEMA).with("pk", self.pk)?)?
            .with("information", self.information.clone())
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.person)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub pk: Option<i64>,
    #[serde(flatten)]
    pub person: Person,
    pub school_class: Related<Class>,
}

impl Student {
    pub fn new(person: NewPerson<'_>, school_class: impl Into<Related<Class>>) -> Result<Self> {
        let record = Person::new_record(&STUDENT_SCHEMA, &person)?
            .with_related("school_class", &school_class.into())?;
        Self::construct(record)
    }
}

impl Entity for Student {
    fn schema() -> &'static Schema {
        &STUDENT_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        match name {
            "school_class" => Some(self.school_class.to_attribute()),
            _ => self.person.attribute(name),
        }
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Student {
            pk: None,
            person: Person::from_record(record)?,
            school_class: record.take_related("school_class")?,
        })
    }

    fn field_rules() -> &'static [FieldRule] {
        PERSON_RULES
    }

    fn to_record(&self) -> Result<Record> {
        self.person
            .write(Record::new(&STUDENT_SCHEMA).with("pk", self.pk)?)?
            .with_related("school_class", &self.school_class)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.school_class.loaded() {
            Some(class) => write!(f, "{} [{}]", self.person, class.name),
            None => write!(f, "{}", self.person),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Administrator {
    pub pk: Option<i64>,
    #[serde(flatten)]
    pub person: Person,
}

impl Administrator {
    pub fn new(person: NewPerson<'_>) -> Result<Self> {
        Self::construct(Person::new_record(&ADMINISTRATOR_SCHEMA, &person)?)
    }
}

impl Entity for Administrator {
    fn schema() -> &'static Schema {
        &ADMINISTRATOR_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        self.person.attribute(name)
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Administrator {
            pk: None,
            person: Person::from_record(record)?,
        })
    }

    fn field_rules() -> &'static [FieldRule] {
        PERSON_RULES
    }

    fn to_record(&self) -> Result<Record> {
        self.person
            .write(Record::new(&ADMINISTRATOR_SCHEMA).with("pk", self.pk)?)
    }
}

impl fmt::Display for Administrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.person)
    }
}
