//! Gradebook Core - mapping layer between school entities and SQL
//!
//! This crate provides everything that does not touch the storage engine:
//! - Schema descriptors and the `Entity` trait
//! - The statement builder for the six entity manager operations
//! - Two-pass hydration of flat result rows into nested entities
//! - Field validators and the school domain model
//! - The error taxonomy and logging facility shared with the store crate

pub mod entity;
pub mod errors;
pub mod hydration;
pub mod logging_facility;
pub mod model;
pub mod operations;
pub mod queries;
pub mod rules;
pub mod schema;
pub mod statement;
pub mod value;

// Re-export commonly used types
pub use entity::{Attribute, Entity, Record, Related, Slot};
pub use errors::{ExError, ExErrorKind, GradebookError, Result};
pub use operations::Operation;
pub use queries::{Argument, Kwargs};
pub use schema::{Relation, Schema};
pub use statement::{Output, Statement};
pub use value::{Row, Value};
