//! Shared fixtures for gradebook-core integration tests

use gradebook_core::model::NewPerson;
use gradebook_core::rules::password_hash;
use gradebook_core::Value;
use gradebook_core_types::Sensitive;

pub const PASSWORD: &str = "Qwerty-123";

/// Registration data with a valid password
#[allow(dead_code)]
pub fn person<'a>(first_name: &'a str, second_name: &'a str, email: &'a str) -> NewPerson<'a> {
    NewPerson {
        first_name,
        second_name,
        patronymic: "Сергеевич",
        email,
        password: Sensitive::new(PASSWORD.to_string()),
    }
}

/// Personal data columns as they come back from storage
#[allow(dead_code)]
pub fn person_columns(first_name: &str, second_name: &str, email: &str) -> Vec<Value> {
    vec![
        first_name.into(),
        second_name.into(),
        "Сергеевич".into(),
        email.into(),
        password_hash(second_name, PASSWORD, email).into(),
    ]
}

/// One-hop `students` row: student columns followed by the class columns
#[allow(dead_code)]
pub fn student_row(pk: i64, email: &str, class_pk: i64, class_name: &str) -> Vec<Value> {
    let mut row = vec![Value::Integer(pk)];
    row.extend(person_columns("Пётр", "Петров", email));
    row.push(Value::Integer(class_pk));
    row.push(Value::Integer(class_pk));
    row.push(class_name.into());
    row
}
