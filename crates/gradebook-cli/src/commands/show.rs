//! Show command
//!
//! Usage: gradebook [--database PATH] show <ENTITY> [--where KEY=VALUE]... [--json]

use super::CommandResult;
use clap::Args;
use gradebook_core::model::{
    schema_by_name, Administrator, Class, Grade, Period, Student, Subject, SubjectClassTeacher,
    Teacher,
};
use gradebook_core::value::parse_date;
use gradebook_core::{Entity, Kwargs, Value};
use gradebook_store::{ConnectionConfig, ConnectionManager, EntityManager};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Entity type or table name (`Student`, `grades`, ...)
    pub entity: String,

    /// Condition on a column, repeatable; `school_class__name=9А` follows the relation
    #[arg(long = "where", value_name = "KEY=VALUE", value_parser = parse_condition)]
    pub conditions: Vec<(String, String)>,

    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,
}

pub fn execute(config: &ConnectionConfig, args: ShowArgs) -> CommandResult {
    let schema = schema_by_name(&args.entity)
        .ok_or_else(|| format!("unknown entity '{}'", args.entity))?;

    let conditions = args
        .conditions
        .into_iter()
        .fold(Kwargs::new(), |kwargs, (key, raw)| {
            kwargs.with(key, condition_value(&raw))
        });

    let manager = ConnectionManager::new(config.clone())?;
    tracing::debug!(entity = schema.entity, "showing entities");

    match schema.entity {
        "Class" => print_entities::<Class>(&manager, conditions, args.json),
        "Subject" => print_entities::<Subject>(&manager, conditions, args.json),
        "Period" => print_entities::<Period>(&manager, conditions, args.json),
        "Teacher" => print_entities::<Teacher>(&manager, conditions, args.json),
        "Student" => print_entities::<Student>(&manager, conditions, args.json),
        "Administrator" => print_entities::<Administrator>(&manager, conditions, args.json),
        "Grade" => print_entities::<Grade>(&manager, conditions, args.json),
        "SubjectClassTeacher" => {
            print_entities::<SubjectClassTeacher>(&manager, conditions, args.json)
        }
        other => Err(format!("entity '{}' cannot be shown", other).into()),
    }
}

fn print_entities<E>(manager: &ConnectionManager, conditions: Kwargs, json: bool) -> CommandResult
where
    E: Entity + Display + Serialize,
{
    let entities = EntityManager::<E>::new(manager);
    let rows = if conditions.is_empty() {
        entities.all()?
    } else {
        entities.filter(conditions)?
    };

    for entity in &rows {
        if json {
            println!("{}", serde_json::to_string(entity)?);
        } else {
            println!("{}", entity);
        }
    }
    Ok(())
}

fn parse_condition(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// Integers and dates are bound with their own type, anything else as text
fn condition_value(raw: &str) -> Value {
    if let Ok(number) = raw.parse::<i64>() {
        Value::Integer(number)
    } else if let Some(date) = parse_date(raw) {
        Value::Date(date)
    } else {
        Value::Text(raw.to_string())
    }
}
