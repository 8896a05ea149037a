//! SQL generation for the six entity manager operations
//!
//! Every fetch selects an explicit column list: the main table's columns in
//! attribute order, then each relation target's columns in its attribute
//! order. Each relation is joined once under an alias equal to the
//! relational attribute name, so `school_class__name` resolves to
//! `"school_class"."name"` and two relations to the same table never clash.
//! Joins are one hop deep: a related table's own relations stay as raw keys.

use super::arguments::Kwargs;
use super::ident::{qualified, quote_ident};
use crate::entity::{Attribute, Entity};
use crate::errors::{GradebookError, Result};
use crate::schema::{Schema, ID_COLUMN, RELATED_SEPARATOR};
use crate::statement::{Statement, PLACEHOLDER};
use crate::value::Value;

/// `SELECT ... FROM ... JOIN ...` shared by every fetch
fn select_clause(schema: &Schema) -> String {
    let mut columns: Vec<String> = schema
        .attributes
        .iter()
        .map(|a| qualified(schema.table, &schema.column_for(a)))
        .collect();
    for relation in schema.relations {
        columns.extend(
            relation
                .target
                .attributes
                .iter()
                .map(|a| qualified(relation.attribute, &relation.target.column_for(a))),
        );
    }

    let mut sql = format!(
        "SELECT {} FROM {}",
        columns.join(", "),
        quote_ident(schema.table)
    );
    for relation in schema.relations {
        sql.push_str(&format!(
            " JOIN {} AS {} ON {} = {}",
            quote_ident(relation.target.table),
            quote_ident(relation.attribute),
            qualified(schema.table, &schema.column_for(relation.attribute)),
            qualified(relation.attribute, ID_COLUMN),
        ));
    }
    sql
}

/// Tables without an identity column keep storage order
fn order_clause(schema: &Schema) -> String {
    if schema.has_identity() {
        format!(" ORDER BY {}", qualified(schema.table, ID_COLUMN))
    } else {
        String::new()
    }
}

/// Resolve a condition key to its qualified column
///
/// `name` addresses the main table; `relation__name` addresses the joined
/// table of that relation.
fn condition_column(schema: &Schema, key: &str) -> Result<String> {
    let unknown = || GradebookError::UnknownAttribute {
        entity: schema.entity.to_string(),
        attribute: key.to_string(),
    };

    match key.split_once(RELATED_SEPARATOR) {
        Some((relation_name, attribute)) => {
            let relation = schema.relation(relation_name).ok_or_else(unknown)?;
            if !relation.target.has_attribute(attribute) {
                return Err(unknown());
            }
            Ok(qualified(
                relation.attribute,
                &relation.target.column_for(attribute),
            ))
        }
        None => {
            if !schema.has_attribute(key) {
                return Err(unknown());
            }
            Ok(qualified(schema.table, &schema.column_for(key)))
        }
    }
}

pub fn build_fetch_all(schema: &Schema) -> Statement {
    let sql = format!("{}{}", select_clause(schema), order_clause(schema));
    Statement::with_output(sql, Vec::new())
}

/// Fetch rows matching every condition (conjunction)
///
/// Parameters are bound in the order the conditions were supplied. With no
/// conditions this is the same statement as [`build_fetch_all`].
pub fn build_fetch_filtered(schema: &Schema, conditions: &Kwargs) -> Result<Statement> {
    let mut terms = Vec::with_capacity(conditions.len());
    let mut parameters = Vec::with_capacity(conditions.len());
    for (key, argument) in conditions.iter() {
        terms.push(format!("{} = {}", condition_column(schema, key)?, PLACEHOLDER));
        parameters.push(argument.to_binding("filter")?);
    }

    let mut sql = select_clause(schema);
    if !terms.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&terms.join(" AND "));
    }
    sql.push_str(&order_clause(schema));
    Ok(Statement::with_output(sql, parameters))
}

/// Same statement as [`build_fetch_filtered`]; the caller checks cardinality
pub fn build_fetch_one(schema: &Schema, conditions: &Kwargs) -> Result<Statement> {
    build_fetch_filtered(schema, conditions)
}

/// Bound value of one writable attribute of an instance
fn bind_attribute<E: Entity>(entity: &E, attribute: &str, context: &str) -> Result<Value> {
    let schema = E::schema();
    match entity.attribute(attribute) {
        Some(Attribute::Value(value)) => Ok(value.for_binding()),
        Some(Attribute::Reference(Some(id))) => Ok(Value::Integer(id)),
        Some(Attribute::Reference(None)) => Err(GradebookError::MissingIdentity {
            entity: schema
                .relation(attribute)
                .map_or(schema.entity, |r| r.target.entity)
                .to_string(),
            context: format!("{}.{}", context, attribute),
        }),
        None => Err(GradebookError::UnknownAttribute {
            entity: schema.entity.to_string(),
            attribute: attribute.to_string(),
        }),
    }
}

fn require_pk<E: Entity>(entity: &E, context: &str) -> Result<i64> {
    entity.pk().ok_or_else(|| GradebookError::MissingIdentity {
        entity: E::schema().entity.to_string(),
        context: context.to_string(),
    })
}

pub fn build_create<E: Entity>(entity: &E) -> Result<Statement> {
    let schema = E::schema();
    let mut columns = Vec::new();
    let mut parameters = Vec::new();
    for attribute in schema.writable_attributes() {
        columns.push(quote_ident(&schema.column_for(attribute)));
        parameters.push(bind_attribute(entity, attribute, "create")?);
    }

    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quote_ident(schema.table))
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(schema.table),
            columns.join(", "),
            vec![PLACEHOLDER; columns.len()].join(", ")
        )
    };
    Ok(Statement::without_output(sql, parameters))
}

/// Update every writable attribute of a persisted instance
pub fn build_save<E: Entity>(entity: &E) -> Result<Statement> {
    let schema = E::schema();
    let pk = require_pk(entity, "save")?;

    let mut assignments = Vec::new();
    let mut parameters = Vec::new();
    for attribute in schema.writable_attributes() {
        assignments.push(format!(
            "{} = {}",
            quote_ident(&schema.column_for(attribute)),
            PLACEHOLDER
        ));
        parameters.push(bind_attribute(entity, attribute, "save")?);
    }
    parameters.push(Value::Integer(pk));

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quote_ident(schema.table),
        assignments.join(", "),
        quote_ident(ID_COLUMN),
        PLACEHOLDER
    );
    Ok(Statement::without_output(sql, parameters))
}

pub fn build_delete<E: Entity>(entity: &E) -> Result<Statement> {
    let schema = E::schema();
    let pk = require_pk(entity, "delete")?;
    let sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quote_ident(schema.table),
        quote_ident(ID_COLUMN),
        PLACEHOLDER
    );
    Ok(Statement::without_output(sql, vec![Value::Integer(pk)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Record, Related};
    use crate::schema::Relation;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    static CLASSES: Schema = Schema {
        entity: "Class",
        table: "classes",
        attributes: &["pk", "name"],
        relations: &[],
    };

    static PUPILS: Schema = Schema {
        entity: "Pupil",
        table: "pupils",
        attributes: &["pk", "first_name", "born", "school_class"],
        relations: &[Relation {
            attribute: "school_class",
            target: &CLASSES,
        }],
    };

    #[derive(Debug, Clone)]
    struct Klass {
        pk: Option<i64>,
        name: String,
    }

    impl Entity for Klass {
        fn schema() -> &'static Schema {
            &CLASSES
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
        fn from_record(record: &mut Record) -> crate::errors::Result<Self> {
            Ok(Klass {
                pk: None,
                name: record.take_text("name")?,
            })
        }
        fn to_record(&self) -> crate::errors::Result<Record> {
            Record::new(&CLASSES).with("pk", self.pk)?.with("name", &self.name)
        }
    }

    #[derive(Debug, Clone)]
    struct Pupil {
        pk: Option<i64>,
        first_name: String,
        born: NaiveDate,
        school_class: Related<Klass>,
    }

    impl Entity for Pupil {
        fn schema() -> &'static Schema {
            &PUPILS
        }
        fn pk(&self) -> Option<i64> {
            self.pk
        }
        fn set_pk(&mut self, pk: i64) {
            self.pk = Some(pk);
        }
        fn attribute(&self, name: &str) -> Option<Attribute> {
            match name {
                "first_name" => Some(Attribute::Value(self.first_name.clone().into())),
                "born" => Some(Attribute::Value(self.born.into())),
                "school_class" => Some(self.school_class.to_attribute()),
                _ => None,
            }
        }
        fn from_record(record: &mut Record) -> crate::errors::Result<Self> {
            Ok(Pupil {
                pk: None,
                first_name: record.take_text("first_name")?,
                born: record.take_date("born")?,
                school_class: record.take_related("school_class")?,
            })
        }
        fn to_record(&self) -> crate::errors::Result<Record> {
            Record::new(&PUPILS)
                .with("pk", self.pk)?
                .with("first_name", &self.first_name)?
                .with("born", self.born)?
                .with_related("school_class", &self.school_class)
        }
    }

    fn pupil(pk: Option<i64>, school_class: Related<Klass>) -> Pupil {
        Pupil {
            pk,
            first_name: "Иван".to_string(),
            born: NaiveDate::from_ymd_opt(2010, 3, 7).unwrap(),
            school_class,
        }
    }

    const SELECT_PUPILS: &str = concat!(
        r#"SELECT "pupils"."id", "pupils"."first_name", "pupils"."born", "pupils"."school_class_id", "#,
        r#""school_class"."id", "school_class"."name" FROM "pupils" "#,
        r#"JOIN "classes" AS "school_class" ON "pupils"."school_class_id" = "school_class"."id""#
    );

    #[test]
    fn test_fetch_all_joins_each_relation_once() {
        let stmt = build_fetch_all(&PUPILS);
        assert_eq!(
            stmt.sql(),
            format!(r#"{} ORDER BY "pupils"."id""#, SELECT_PUPILS)
        );
        assert!(stmt.parameters().is_empty());
        assert!(stmt.expects_rows());
    }

    #[test]
    fn test_fetch_all_without_relations() {
        let stmt = build_fetch_all(&CLASSES);
        assert_eq!(
            stmt.sql(),
            r#"SELECT "classes"."id", "classes"."name" FROM "classes" ORDER BY "classes"."id""#
        );
    }

    #[test]
    fn test_filter_binds_in_supplied_order() {
        let born = NaiveDate::from_ymd_opt(2010, 3, 7).unwrap();
        let conditions = Kwargs::new()
            .with("school_class__name", "9A")
            .with("born", born)
            .with("pk", 4_i64);
        let stmt = build_fetch_filtered(&PUPILS, &conditions).unwrap();

        assert_eq!(
            stmt.sql(),
            format!(
                r#"{} WHERE "school_class"."name" = %s AND "pupils"."born" = %s AND "pupils"."id" = %s ORDER BY "pupils"."id""#,
                SELECT_PUPILS
            )
        );
        assert_eq!(
            stmt.parameters(),
            &[
                Value::Text("9A".to_string()),
                Value::Text("2010/3/7".to_string()),
                Value::Integer(4),
            ]
        );
    }

    #[test]
    fn test_filter_reduces_entity_to_pk() {
        let klass = Klass {
            pk: Some(2),
            name: "9A".to_string(),
        };
        let conditions = Kwargs::new().with_entity("school_class", &klass);
        let stmt = build_fetch_filtered(&PUPILS, &conditions).unwrap();
        assert!(stmt.sql().contains(r#"WHERE "pupils"."school_class_id" = %s"#));
        assert_eq!(stmt.parameters(), &[Value::Integer(2)]);
    }

    #[test]
    fn test_filter_rejects_unknown_attribute() {
        for key in ["nickname", "teacher__name", "school_class__motto"] {
            let err = build_fetch_filtered(&PUPILS, &Kwargs::new().with(key, 1_i64)).unwrap_err();
            assert!(
                matches!(err, GradebookError::UnknownAttribute { .. }),
                "{} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_fetch_one_matches_filter() {
        let conditions = Kwargs::new().with("first_name", "Иван");
        assert_eq!(
            build_fetch_one(&PUPILS, &conditions).unwrap(),
            build_fetch_filtered(&PUPILS, &conditions).unwrap()
        );
    }

    #[test]
    fn test_create_suffixes_relational_column() {
        let stmt = build_create(&pupil(None, Related::Id(3))).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"INSERT INTO "pupils" ("first_name", "born", "school_class_id") VALUES (%s, %s, %s)"#
        );
        assert_eq!(
            stmt.parameters(),
            &[
                Value::Text("Иван".to_string()),
                Value::Text("2010/3/7".to_string()),
                Value::Integer(3),
            ]
        );
        assert!(!stmt.expects_rows());
    }

    #[test]
    fn test_create_resolves_loaded_instance_pk() {
        let klass = Klass {
            pk: Some(8),
            name: "5B".to_string(),
        };
        let stmt = build_create(&pupil(None, klass.into())).unwrap();
        assert_eq!(stmt.parameters().last(), Some(&Value::Integer(8)));
    }

    #[test]
    fn test_create_rejects_unsaved_related_instance() {
        let klass = Klass {
            pk: None,
            name: "5B".to_string(),
        };
        let err = build_create(&pupil(None, klass.into())).unwrap_err();
        assert!(matches!(err, GradebookError::MissingIdentity { ref entity, .. } if entity == "Class"));
    }

    #[test]
    fn test_save_binds_pk_last() {
        let stmt = build_save(&pupil(Some(12), Related::Id(3))).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"UPDATE "pupils" SET "first_name" = %s, "born" = %s, "school_class_id" = %s WHERE "id" = %s"#
        );
        assert_eq!(stmt.parameters().len(), 4);
        assert_eq!(stmt.parameters()[3], Value::Integer(12));
    }

    #[test]
    fn test_save_requires_identity() {
        let err = build_save(&pupil(None, Related::Id(3))).unwrap_err();
        assert!(matches!(err, GradebookError::MissingIdentity { ref context, .. } if context == "save"));
    }

    #[test]
    fn test_delete_binds_pk() {
        let stmt = build_delete(&pupil(Some(5), Related::Id(3))).unwrap();
        assert_eq!(stmt.sql(), r#"DELETE FROM "pupils" WHERE "id" = %s"#);
        assert_eq!(stmt.parameters(), &[Value::Integer(5)]);
        assert!(build_delete(&pupil(None, Related::Id(3))).is_err());
    }

    proptest! {
        #[test]
        fn prop_filter_placeholders_match_parameters(
            picks in proptest::collection::vec(0usize..4, 0..8),
            text in "[a-zA-Zа-яА-Я%s\"']{0,12}",
        ) {
            let keys = ["pk", "first_name", "school_class", "school_class__name"];
            let mut conditions = Kwargs::new();
            for pick in &picks {
                conditions = conditions.with(keys[*pick], text.as_str());
            }
            let stmt = build_fetch_filtered(&PUPILS, &conditions).unwrap();
            prop_assert_eq!(stmt.placeholder_count(), stmt.parameters().len());
            prop_assert_eq!(stmt.parameters().len(), conditions.len());
        }
    }
}
