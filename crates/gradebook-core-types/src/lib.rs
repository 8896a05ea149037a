//! Shared vocabulary for the gradebook crates
//!
//! - **Correlation types**: RequestId for entity-manager invocations, BatchId for flushes
//! - **Sensitive data**: Sensitive<T> marker for credentials and password material
//! - **Schema constants**: Canonical structured-logging field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{BatchId, RequestId};
pub use sensitive::Sensitive;
