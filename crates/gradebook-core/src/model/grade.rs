//! Grades and teaching assignments

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::school::{Class, Subject, CLASS_SCHEMA, SUBJECT_SCHEMA};
use super::user::{Student, Teacher, STUDENT_SCHEMA, TEACHER_SCHEMA};
use crate::entity::{Attribute, Entity, Record, Related};
use crate::errors::Result;
use crate::rules::validation::{FieldCheck, FieldRule};
use crate::schema::{Relation, Schema};

pub static GRADE_SCHEMA: Schema = Schema {
    entity: "Grade",
    table: "grades",
    attributes: &["pk", "value", "student", "subject", "teacher", "date"],
    relations: &[
        Relation {
            attribute: "student",
            target: &STUDENT_SCHEMA,
        },
        Relation {
            attribute: "subject",
            target: &SUBJECT_SCHEMA,
        },
        Relation {
            attribute: "teacher",
            target: &TEACHER_SCHEMA,
        },
    ],
};

pub static SUBJECT_CLASS_TEACHER_SCHEMA: Schema = Schema {
    entity: "SubjectClassTeacher",
    table: "subjects_classes_teachers",
    attributes: &["pk", "subject", "school_class", "teacher"],
    relations: &[
        Relation {
            attribute: "subject",
            target: &SUBJECT_SCHEMA,
        },
        Relation {
            attribute: "school_class",
            target: &CLASS_SCHEMA,
        },
        Relation {
            attribute: "teacher",
            target: &TEACHER_SCHEMA,
        },
    ],
};

const GRADE_RULES: &[FieldRule] = &[FieldRule::new("value", FieldCheck::GradeValue)];

/// One mark given by a teacher to a student in a subject on a date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub pk: Option<i64>,
    /// 1 to 5
    pub value: i64,
    pub student: Related<Student>,
    pub subject: Related<Subject>,
    pub teacher: Related<Teacher>,
    pub date: NaiveDate,
}

impl Grade {
    pub fn new(
        value: i64,
        student: impl Into<Related<Student>>,
        subject: impl Into<Related<Subject>>,
        teacher: impl Into<Related<Teacher>>,
        date: NaiveDate,
    ) -> Result<Self> {
        let record = Record::new(&GRADE_SCHEMA)
            .with("value", value)?
            .with_related("student", &student.into())?
            .with_related("subject", &subject.into())?
            .with_related("teacher", &teacher.into())?
            .with("date", date)?;
        Self::construct(record)
    }
}

impl Entity for Grade {
    fn schema() -> &'static Schema {
        &GRADE_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        match name {
            "value" => Some(Attribute::Value(self.value.into())),
            "student" => Some(self.student.to_attribute()),
            "subject" => Some(self.subject.to_attribute()),
            "teacher" => Some(self.teacher.to_attribute()),
            "date" => Some(Attribute::Value(self.date.into())),
            _ => None,
        }
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Grade {
            pk: None,
            value: record.take_i64("value")?,
            student: record.take_related("student")?,
            subject: record.take_related("subject")?,
            teacher: record.take_related("teacher")?,
            date: record.take_date("date")?,
        })
    }

    fn field_rules() -> &'static [FieldRule] {
        GRADE_RULES
    }

    fn to_record(&self) -> Result<Record> {
        Record::new(&GRADE_SCHEMA)
            .with("pk", self.pk)?
            .with("value", self.value)?
            .with_related("student", &self.student)?
            .with_related("subject", &self.subject)?
            .with_related("teacher", &self.teacher)?
            .with("date", self.date)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.value)?;
        if let Some(subject) = self.subject.loaded() {
            write!(f, " ({})", subject)?;
        }
        Ok(())
    }
}

/// Which teacher teaches which subject to which class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectClassTeacher {
    pub pk: Option<i64>,
    pub subject: Related<Subject>,
    pub school_class: Related<Class>,
    pub teacher: Related<Teacher>,
}

impl SubjectClassTeacher {
    pub fn new(
        subject: impl Into<Related<Subject>>,
        school_class: impl Into<Related<Class>>,
        teacher: impl Into<Related<Teacher>>,
    ) -> Result<Self> {
        let record = Record::new(&SUBJECT_CLASS_TEACHER_SCHEMA)
            .with_related("subject", &subject.into())?
            .with_related("school_class", &school_class.into())?
            .with_related("teacher", &teacher.into())?;
        Self::construct(record)
    }
}

impl Entity for SubjectClassTeacher {
    fn schema() -> &'static Schema {
        &SUBJECT_CLASS_TEACHER_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        match name {
            "subject" => Some(self.subject.to_attribute()),
            "school_class" => Some(self.school_class.to_attribute()),
            "teacher" => Some(self.teacher.to_attribute()),
            _ => None,
        }
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(SubjectClassTeacher {
            pk: None,
            subject: record.take_related("subject")?,
            school_class: record.take_related("school_class")?,
            teacher: record.take_related("teacher")?,
        })
    }

    fn to_record(&self) -> Result<Record> {
        Record::new(&SUBJECT_CLASS_TEACHER_SCHEMA)
            .with("pk", self.pk)?
            .with_related("subject", &self.subject)?
            .with_related("school_class", &self.school_class)?
            .with_related("teacher", &self.teacher)
    }
}

impl fmt::Display for SubjectClassTeacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            self.subject.loaded(),
            self.school_class.loaded(),
            self.teacher.loaded(),
        ) {
            (Some(subject), Some(class), Some(teacher)) => {
                write!(f, "{} / {} / {}", subject, class, teacher.person.full_name())
            }
            _ => write!(
                f,
                "subject {:?} / class {:?} / teacher {:?}",
                self.subject.pk(),
                self.school_class.pk(),
                self.teacher.pk()
            ),
        }
    }
}
