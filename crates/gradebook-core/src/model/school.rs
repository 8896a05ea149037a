//! School structure: classes, subjects and grading periods

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::entity::{Attribute, Entity, Record};
use crate::errors::{GradebookError, Result};
use crate::rules::validation::{FieldCheck, FieldRule};
use crate::schema::Schema;

const TITLE_RULES: &[FieldRule] = &[FieldRule::new("name", FieldCheck::Title)];

pub static CLASS_SCHEMA: Schema = Schema {
    entity: "Class",
    table: "classes",
    attributes: &["pk", "name"],
    relations: &[],
};

pub static SUBJECT_SCHEMA: Schema = Schema {
    entity: "Subject",
    table: "subjects",
    attributes: &["pk", "name"],
    relations: &[],
};

pub static PERIOD_SCHEMA: Schema = Schema {
    entity: "Period",
    table: "periods",
    attributes: &["pk", "start", "finish", "is_current"],
    relations: &[],
};

/// A school class such as `9А`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub pk: Option<i64>,
    pub name: String,
}

impl Class {
    pub fn new(name: &str) -> Result<Self> {
        Self::construct(Record::new(&CLASS_SCHEMA).with("name", name)?)
    }
}

impl Entity for Class {
    fn schema() -> &'static Schema {
        &CLASS_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        (name == "name").then(|| Attribute::Value(self.name.clone().into()))
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Class {
            pk: None,
            name: record.take_text("name")?,
        })
    }

    fn field_rules() -> &'static [FieldRule] {
        TITLE_RULES
    }

    fn to_record(&self) -> Result<Record> {
        Record::new(&CLASS_SCHEMA)
            .with("pk", self.pk)?
            .with("name", &self.name)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subject {
    pub pk: Option<i64>,
    pub name: String,
}

impl Subject {
    pub fn new(name: &str) -> Result<Self> {
        Self::construct(Record::new(&SUBJECT_SCHEMA).with("name", name)?)
    }
}

impl Entity for Subject {
    fn schema() -> &'static Schema {
        &SUBJECT_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        (name == "name").then(|| Attribute::Value(self.name.clone().into()))
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        Ok(Subject {
            pk: None,
            name: record.take_text("name")?,
        })
    }

    fn field_rules() -> &'static [FieldRule] {
        TITLE_RULES
    }

    fn to_record(&self) -> Result<Record> {
        Record::new(&SUBJECT_SCHEMA)
            .with("pk", self.pk)?
            .with("name", &self.name)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A grading period (term); at most one is current at a time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub pk: Option<i64>,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub is_current: bool,
}

impl Period {
    pub fn new(start: NaiveDate, finish: NaiveDate, is_current: bool) -> Result<Self> {
        let record = Record::new(&PERIOD_SCHEMA)
            .with("start", start)?
            .with("finish", finish)?
            .with("is_current", is_current)?;
        Self::construct(record)
    }

    /// Every date from `start` to `finish`, inclusive
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.finish)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.finish
    }
}

impl Entity for Period {
    fn schema() -> &'static Schema {
        &PERIOD_SCHEMA
    }

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn attribute(&self, name: &str) -> Option<Attribute> {
        let value = match name {
            "start" => self.start.into(),
            "finish" => self.finish.into(),
            "is_current" => self.is_current.into(),
            _ => return None,
        };
        Some(Attribute::Value(value))
    }

    fn from_record(record: &mut Record) -> Result<Self> {
        let start = record.take_date("start")?;
        let finish = record.take_date("finish")?;
        if start > finish {
            return Err(GradebookError::validation(
                "finish",
                format!("period ends ({}) before it starts ({})", finish, start),
            ));
        }
        Ok(Period {
            pk: None,
            start,
            finish,
            is_current: record.take_bool("is_current")?,
        })
    }

    fn to_record(&self) -> Result<Record> {
        Record::new(&PERIOD_SCHEMA)
            .with("pk", self.pk)?
            .with("start", self.start)?
            .with("finish", self.finish)?
            .with("is_current", self.is_current)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.finish)?;
        if self.is_current {
            f.write_str(" (current)")?;
        }
        Ok(())
    }
}
