//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open and configure in one step
pub fn open_configured<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = open(path)?;
    configure(&conn)?;
    Ok(conn)
}

/// Configure a connection
pub fn configure(conn: &Connection) -> Result<()> {
    // Relational columns reference their target table
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;
    Ok(())
}
