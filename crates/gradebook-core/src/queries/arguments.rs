//! Keyword arguments for entity manager operations
//!
//! An ordered name→argument list. Order matters: conditions become WHERE
//! terms in the order they were given. The reserved name `execution`
//! controls whether a write flushes immediately and is never a condition.

use crate::entity::{Entity, Related};
use crate::errors::{GradebookError, Result};
use crate::value::Value;

/// Reserved argument: flush the queued write in autocommit mode
pub const EXECUTION: &str = "execution";

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Value(Value),
    /// An entity instance used as a condition value; reduced to its identity
    Entity {
        entity: &'static str,
        pk: Option<i64>,
    },
}

impl Argument {
    /// Scalar bound for this argument
    ///
    /// Entity arguments bind their primary key; an unsaved entity has none.
    pub fn to_binding(&self, context: &str) -> Result<Value> {
        match self {
            Argument::Value(value) => Ok(value.for_binding()),
            Argument::Entity { entity, pk } => {
                pk.map(Value::Integer)
                    .ok_or_else(|| GradebookError::MissingIdentity {
                        entity: entity.to_string(),
                        context: context.to_string(),
                    })
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs {
    entries: Vec<(String, Argument)>,
}

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an argument; a repeated name replaces the earlier value in place
    pub fn set(&mut self, name: impl Into<String>, argument: Argument) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = argument,
            None => self.entries.push((name, argument)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, Argument::Value(value.into()));
        self
    }

    pub fn with_entity<E: Entity>(mut self, name: impl Into<String>, entity: &E) -> Self {
        self.set(
            name,
            Argument::Entity {
                entity: E::schema().entity,
                pk: entity.pk(),
            },
        );
        self
    }

    pub fn with_related<T: Entity>(mut self, name: impl Into<String>, related: &Related<T>) -> Self {
        self.set(
            name,
            Argument::Entity {
                entity: T::schema().entity,
                pk: related.pk(),
            },
        );
        self
    }

    /// Shorthand for the reserved `execution` argument
    pub fn execution(self, flag: bool) -> Self {
        self.with(EXECUTION, flag)
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn remove(&mut self, name: &str) -> Option<Argument> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove the reserved `execution` argument
    ///
    /// Absent means `false`; anything other than a boolean is rejected.
    pub fn take_execution(&mut self) -> Result<bool> {
        match self.remove(EXECUTION) {
            None => Ok(false),
            Some(Argument::Value(Value::Boolean(flag))) => Ok(flag),
            Some(Argument::Value(other)) => Err(GradebookError::InvalidExecutionFlag {
                found: other.to_string(),
            }),
            Some(Argument::Entity { entity, .. }) => Err(GradebookError::InvalidExecutionFlag {
                found: format!("{} instance", entity),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }
}
