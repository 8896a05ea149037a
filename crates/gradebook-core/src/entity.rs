//! Entity trait and the intermediate record form
//!
//! Hydration is two-pass. A result row is first consumed into a
//! [`Record`], a name→slot map where related entities are nested records.
//! [`Entity::construct`] then turns a record into an instance bottom-up:
//! nested records become related instances (through [`Record::take_related`])
//! before the owning instance exists, so field validators always see fully
//! resolved values. New instances built by callers go through the same
//! `construct` path, which is the single place validators run.

use crate::errors::{GradebookError, Result};
use crate::rules::validation::{self, FieldRule};
use crate::schema::{Schema, PK};
use crate::value::Value;
use chrono::NaiveDate;
use serde::Serialize;

/// One slot of a record: a scalar or a nested related record
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Value(Value),
    Nested(Record),
}

/// Name→slot map for one entity, in schema attribute order
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    slots: Vec<(&'static str, Slot)>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.slots == other.slots
    }
}

/// A writable attribute as the statement builder sees it
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Value(Value),
    /// Foreign key of a relational attribute; `None` when the related
    /// instance has not been persisted yet
    Reference(Option<i64>),
}

impl Record {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            slots: Vec::with_capacity(schema.attributes.len()),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Set a slot; the attribute must be declared by the schema
    pub fn insert(&mut self, attribute: &str, slot: Slot) -> Result<()> {
        let name = self
            .schema
            .attributes
            .iter()
            .copied()
            .find(|a| *a == attribute)
            .ok_or_else(|| GradebookError::UnknownAttribute {
                entity: self.schema.entity.to_string(),
                attribute: attribute.to_string(),
            })?;
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = slot,
            None => self.slots.push((name, slot)),
        }
        Ok(())
    }

    /// Builder-style scalar insert, for constructing new instances
    pub fn with(mut self, attribute: &str, value: impl Into<Value>) -> Result<Self> {
        self.insert(attribute, Slot::Value(value.into()))?;
        Ok(self)
    }

    /// Builder-style insert of a relational attribute
    pub fn with_related<T: Entity>(mut self, attribute: &str, related: &Related<T>) -> Result<Self> {
        let slot = match related {
            Related::Id(id) => Slot::Value(Value::Integer(*id)),
            Related::Loaded(entity) => Slot::Nested(entity.to_record()?),
        };
        self.insert(attribute, slot)?;
        Ok(self)
    }

    pub fn get(&self, attribute: &str) -> Option<&Slot> {
        self.slots
            .iter()
            .find(|(n, _)| *n == attribute)
            .map(|(_, s)| s)
    }

    pub fn get_value_mut(&mut self, attribute: &str) -> Option<&mut Value> {
        self.slots
            .iter_mut()
            .find(|(n, _)| *n == attribute)
            .and_then(|(_, s)| match s {
                Slot::Value(v) => Some(v),
                Slot::Nested(_) => None,
            })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove and return a slot
    pub fn take(&mut self, attribute: &str) -> Result<Slot> {
        let index = self
            .slots
            .iter()
            .position(|(n, _)| *n == attribute)
            .ok_or_else(|| GradebookError::validation(attribute, "value is missing"))?;
        Ok(self.slots.remove(index).1)
    }

    /// Pop the identity, if the schema has one and it is set
    pub fn take_pk(&mut self) -> Result<Option<i64>> {
        if self.get(PK).is_none() {
            return Ok(None);
        }
        match self.take(PK)? {
            Slot::Value(Value::Null) => Ok(None),
            Slot::Value(Value::Integer(pk)) => Ok(Some(pk)),
            other => Err(GradebookError::hydration(
                self.schema.entity,
                format!("identity must be an integer, got {:?}", other),
            )),
        }
    }

    pub fn take_value(&mut self, attribute: &str) -> Result<Value> {
        match self.take(attribute)? {
            Slot::Value(v) => Ok(v),
            Slot::Nested(_) => Err(GradebookError::validation(
                attribute,
                "expected a scalar, got a related record",
            )),
        }
    }

    pub fn take_text(&mut self, attribute: &str) -> Result<String> {
        match self.take_value(attribute)? {
            Value::Text(s) => Ok(s),
            other => Err(type_mismatch(attribute, "text", &other)),
        }
    }

    /// Nullable text column
    pub fn take_optional_text(&mut self, attribute: &str) -> Result<Option<String>> {
        match self.take_value(attribute)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            other => Err(type_mismatch(attribute, "text or null", &other)),
        }
    }

    pub fn take_i64(&mut self, attribute: &str) -> Result<i64> {
        let value = self.take_value(attribute)?;
        value
            .as_i64()
            .ok_or_else(|| type_mismatch(attribute, "integer", &value))
    }

    pub fn take_bool(&mut self, attribute: &str) -> Result<bool> {
        let value = self.take_value(attribute)?;
        value
            .as_bool()
            .ok_or_else(|| type_mismatch(attribute, "boolean", &value))
    }

    pub fn take_date(&mut self, attribute: &str) -> Result<NaiveDate> {
        let value = self.take_value(attribute)?;
        value
            .as_date()
            .ok_or_else(|| type_mismatch(attribute, "date", &value))
    }

    /// Resolve a relational attribute, constructing the related instance
    /// first when the slot holds a nested record
    pub fn take_related<T: Entity>(&mut self, attribute: &str) -> Result<Related<T>> {
        match self.take(attribute)? {
            Slot::Nested(record) => Ok(Related::Loaded(Box::new(T::construct(record)?))),
            Slot::Value(Value::Integer(id)) => Ok(Related::Id(id)),
            Slot::Value(other) => Err(type_mismatch(attribute, "reference", &other)),
        }
    }
}

fn type_mismatch(attribute: &str, expected: &str, found: &Value) -> GradebookError {
    GradebookError::validation(
        attribute,
        format!("expected {}, got {}", expected, found.type_name()),
    )
}

/// Reference to a related entity: a raw identity or a loaded instance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Related<T> {
    Id(i64),
    Loaded(Box<T>),
}

impl<T: Entity> Related<T> {
    /// Identity of the referenced row, resolved through a loaded instance
    pub fn pk(&self) -> Option<i64> {
        match self {
            Related::Id(id) => Some(*id),
            Related::Loaded(entity) => entity.pk(),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Related::Id(_) => None,
            Related::Loaded(entity) => Some(entity),
        }
    }

    pub fn to_attribute(&self) -> Attribute {
        Attribute::Reference(self.pk())
    }
}

impl<T: Entity> From<T> for Related<T> {
    fn from(entity: T) -> Self {
        Related::Loaded(Box::new(entity))
    }
}

/// A persisted record type
///
/// Implementors describe their schema, expose attribute values for the
/// statement builder and build themselves from a validated [`Record`].
pub trait Entity: Sized {
    fn schema() -> &'static Schema;

    fn pk(&self) -> Option<i64>;

    fn set_pk(&mut self, pk: i64);

    /// Current value of one writable (non-`pk`) attribute
    fn attribute(&self, name: &str) -> Option<Attribute>;

    /// Build an instance from a record whose `pk` has been removed and
    /// whose fields already passed [`Entity::field_rules`]
    fn from_record(record: &mut Record) -> Result<Self>;

    /// Field validators applied by [`Entity::construct`]
    fn field_rules() -> &'static [FieldRule] {
        &[]
    }

    /// The single construction path: pop `pk`, validate, build, assign `pk`
    fn construct(mut record: Record) -> Result<Self> {
        let pk = record.take_pk()?;
        validation::apply_rules(Self::field_rules(), &mut record)?;
        let mut entity = Self::from_record(&mut record)?;
        if let Some(pk) = pk {
            entity.set_pk(pk);
        }
        Ok(entity)
    }

    /// Flatten back into a record (related instances become nested records)
    fn to_record(&self) -> Result<Record>;
}
