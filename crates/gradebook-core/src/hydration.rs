//! Row → entity hydration
//!
//! Column order of a fetched row mirrors the statement builder's column
//! list: the main schema's attributes, then each relation target's
//! attributes in relation order. [`hydrate_record`] walks that layout with a
//! cursor and builds a [`Record`] in which each relational attribute holds
//! its nested related record (the foreign-key column is consumed and then
//! superseded). [`Entity::construct`] finishes the job bottom-up.
//!
//! A row narrower than the schema expects is a hydration error, as is one
//! with columns left over or one whose identity column is NULL.

use crate::entity::{Entity, Record, Slot};
use crate::errors::{GradebookError, Result};
use crate::schema::{Schema, PK};
use crate::value::{Row, Value};

/// Joins go one hop from the fetched table
const MAX_JOIN_DEPTH: usize = 1;

/// Sequential reader over one result row
struct RowCursor<'r> {
    row: &'r [Value],
    position: usize,
    entity: &'static str,
}

impl<'r> RowCursor<'r> {
    fn new(row: &'r [Value], entity: &'static str) -> Self {
        Self {
            row,
            position: 0,
            entity,
        }
    }

    fn next_value(&mut self) -> Result<Value> {
        let value = self.row.get(self.position).cloned().ok_or_else(|| {
            GradebookError::hydration(
                self.entity,
                format!("row has {} columns, more were expected", self.row.len()),
            )
        })?;
        self.position += 1;
        Ok(value)
    }

    fn remaining(&self) -> usize {
        self.row.len().saturating_sub(self.position)
    }
}

fn consume(schema: &'static Schema, cursor: &mut RowCursor<'_>, depth: usize) -> Result<Record> {
    let mut record = Record::new(schema);
    for attribute in schema.attributes {
        let value = cursor.next_value()?;
        if *attribute == PK && value.is_null() {
            return Err(GradebookError::hydration(
                schema.entity,
                "stored row has a NULL identity",
            ));
        }
        record.insert(attribute, Slot::Value(value))?;
    }
    if depth < MAX_JOIN_DEPTH {
        for relation in schema.relations {
            let nested = consume(relation.target, cursor, depth + 1)?;
            record.insert(relation.attribute, Slot::Nested(nested))?;
        }
    }
    Ok(record)
}

/// Consume one row into a record
pub fn hydrate_record(schema: &'static Schema, row: &[Value]) -> Result<Record> {
    let mut cursor = RowCursor::new(row, schema.entity);
    let record = consume(schema, &mut cursor, 0)?;
    if cursor.remaining() > 0 {
        return Err(GradebookError::hydration(
            schema.entity,
            format!(
                "row has {} columns, expected {}",
                row.len(),
                schema.fetch_width()
            ),
        ));
    }
    Ok(record)
}

pub fn hydrate<E: Entity>(row: &[Value]) -> Result<E> {
    E::construct(hydrate_record(E::schema(), row)?)
}

/// Hydrate every row, preserving row order
pub fn hydrate_rows<E: Entity>(rows: &[Row]) -> Result<Vec<E>> {
    rows.iter().map(|row| hydrate::<E>(row)).collect()
}
