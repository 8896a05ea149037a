//! Gradebook Store - SQLite persistence for the gradebook mapping layer
//!
//! Provides:
//! - Connection configuration from defaults, `.env` and environment
//! - The connection manager (pending queue, autocommit and transactional flushes)
//! - The entity manager dispatching the six operations for an entity type
//! - Embedded schema migrations with checksums

pub mod config;
pub mod connection;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use config::ConnectionConfig;
pub use connection::{ConnectionManager, FlushMode};
pub use errors::Result;
pub use repo::{EntityManager, Outcome};
