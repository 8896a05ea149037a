//! Domain model of the gradebook
//!
//! Every type here implements [`Entity`](crate::entity::Entity) with a
//! static schema whose attribute order is the column order of the table.

pub mod grade;
pub mod school;
pub mod user;

pub use grade::{Grade, SubjectClassTeacher, GRADE_SCHEMA, SUBJECT_CLASS_TEACHER_SCHEMA};
pub use school::{Class, Period, Subject, CLASS_SCHEMA, PERIOD_SCHEMA, SUBJECT_SCHEMA};
pub use user::{
    Administrator, NewPerson, Person, Student, Teacher, ADMINISTRATOR_SCHEMA, STUDENT_SCHEMA,
    TEACHER_SCHEMA,
};

use crate::schema::Schema;

/// Every persisted entity schema, in dependency order
pub fn schemas() -> [&'static Schema; 8] {
    [
        &CLASS_SCHEMA,
        &SUBJECT_SCHEMA,
        &PERIOD_SCHEMA,
        &TEACHER_SCHEMA,
        &STUDENT_SCHEMA,
        &ADMINISTRATOR_SCHEMA,
        &GRADE_SCHEMA,
        &SUBJECT_CLASS_TEACHER_SCHEMA,
    ]
}

/// Look a schema up by entity or table name (case-insensitive)
pub fn schema_by_name(name: &str) -> Option<&'static Schema> {
    schemas().into_iter().find(|s| {
        s.entity.eq_ignore_ascii_case(name) || s.table.eq_ignore_ascii_case(name)
    })
}
