//! Conversion between gradebook values and SQLite values

use gradebook_core::errors::{ExError, GradebookError};
use gradebook_core::statement::render_placeholders;
use gradebook_core::value::{date_for_binding, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};

/// Rewrite `%s` placeholders into SQLite's numbered `?N` form
pub fn render_sql(sql: &str) -> String {
    render_placeholders(sql, |index| format!("?{}", index + 1))
}

/// Bindable form of a parameter
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Date(d) => SqlValue::Text(date_for_binding(*d)),
    }
}

pub fn to_sql_values(values: &[Value]) -> Vec<SqlValue> {
    values.iter().map(to_sql_value).collect()
}

/// Read one result cell; BLOB columns have no gradebook representation
pub fn from_sql_ref(cell: ValueRef<'_>) -> Result<Value, ExError> {
    match cell {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(r) => Ok(Value::Real(r)),
        ValueRef::Text(bytes) => Ok(Value::Text(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(_) => Err(GradebookError::hydration(
            "row",
            "BLOB columns cannot be hydrated",
        )
        .into()),
    }
}
