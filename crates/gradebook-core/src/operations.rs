//! The fixed set of entity manager operations and their dispatch table

use crate::entity::Entity;
use crate::errors::{GradebookError, Result};
use crate::queries::{self, Kwargs};
use crate::schema::Schema;
use crate::statement::Statement;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    All,
    Filter,
    Get,
    Save,
    Create,
    Delete,
}

/// Builder entry for one operation
pub enum Handler<E> {
    /// Works on the entity type with keyword conditions
    Type(fn(&'static Schema, &Kwargs) -> Result<Statement>),
    /// Works on one instance
    Instance(fn(&E) -> Result<Statement>),
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::All,
        Operation::Filter,
        Operation::Get,
        Operation::Save,
        Operation::Create,
        Operation::Delete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::All => "all",
            Operation::Filter => "filter",
            Operation::Get => "get",
            Operation::Save => "save",
            Operation::Create => "create",
            Operation::Delete => "delete",
        }
    }

    /// Reads flush immediately because their rows are needed now
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::All | Operation::Filter | Operation::Get)
    }

    pub fn takes_conditions(&self) -> bool {
        matches!(self, Operation::Filter | Operation::Get)
    }

    pub fn handler<E: Entity>(&self) -> Handler<E> {
        match self {
            Operation::All => Handler::Type(|schema, _| Ok(queries::build_fetch_all(schema))),
            Operation::Filter => Handler::Type(queries::build_fetch_filtered),
            Operation::Get => Handler::Type(queries::build_fetch_one),
            Operation::Save => Handler::Instance(queries::build_save::<E>),
            Operation::Create => Handler::Instance(queries::build_create::<E>),
            Operation::Delete => Handler::Instance(queries::build_delete::<E>),
        }
    }

    /// Build the statement for this operation
    ///
    /// `conditions` must already have the reserved `execution` flag removed.
    /// Operations without conditions reject any leftover argument.
    pub fn build<E: Entity>(&self, instance: Option<&E>, conditions: &Kwargs) -> Result<Statement> {
        if !self.takes_conditions() && !conditions.is_empty() {
            return Err(GradebookError::UnexpectedArguments {
                operation: self.name().to_string(),
                names: conditions.names(),
            });
        }
        match (self.handler::<E>(), instance) {
            (Handler::Type(build), _) => build(E::schema(), conditions),
            (Handler::Instance(build), Some(entity)) => build(entity),
            (Handler::Instance(_), None) => Err(GradebookError::InvalidSubject {
                operation: self.name().to_string(),
                reason: format!("needs a {} instance", E::schema().entity),
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = GradebookError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| GradebookError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Attribute, Record};

    static LABELS: Schema = Schema {
        entity: "Label",
        table: "labels",
        attributes: &["pk", "text"],
        relations: &[],
    };

    struct Label {
        pk: Option<i64>,
        text: String,
    }

    impl Entity for Label {
        fn schema() -> &'static Schema {
            &LABELS
        }
        fn pk(&self) -> Option<i64> {
            self.pk
        }
        fn set_pk(&mut self, pk: i64) {
            self.pk = Some(pk);
        }
        fn attribute(&self, name: &str) -> Option<Attribute> {
            (name == "text").then(|| Attribute::Value(self.text.clone().into()))
        }
        fn from_record(record: &mut Record) -> Result<Self> {
            Ok(Label {
                pk: None,
                text: record.take_text("text")?,
            })
        }
        fn to_record(&self) -> Result<Record> {
            Record::new(&LABELS).with("pk", self.pk)?.with("text", &self.text)
        }
    }

    #[test]
    fn test_parse_known_names() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "truncate".parse::<Operation>().unwrap_err();
        assert_eq!(
            err,
            GradebookError::UnknownOperation {
                name: "truncate".to_string()
            }
        );
    }

    #[test]
    fn test_read_and_condition_flags() {
        assert!(Operation::All.is_read() && !Operation::All.takes_conditions());
        assert!(Operation::Get.is_read() && Operation::Get.takes_conditions());
        assert!(!Operation::Save.is_read() && !Operation::Save.takes_conditions());
    }

    #[test]
    fn test_leftover_arguments_rejected() {
        let label = Label {
            pk: Some(1),
            text: "x".to_string(),
        };
        let conditions = Kwargs::new().with("text", "y");
        for op in [Operation::All, Operation::Save, Operation::Create, Operation::Delete] {
            let err = op.build(Some(&label), &conditions).unwrap_err();
            assert!(
                matches!(err, GradebookError::UnexpectedArguments { .. }),
                "{} accepted leftover arguments",
                op
            );
        }
    }

    #[test]
    fn test_instance_operation_needs_instance() {
        let err = Operation::Create
            .build::<Label>(None, &Kwargs::new())
            .unwrap_err();
        assert!(matches!(err, GradebookError::InvalidSubject { .. }));
    }

    #[test]
    fn test_type_operation_ignores_instance() {
        let label = Label {
            pk: Some(1),
            text: "x".to_string(),
        };
        let stmt = Operation::All.build(Some(&label), &Kwargs::new()).unwrap();
        assert!(stmt.sql().starts_with("SELECT"));
    }
}
