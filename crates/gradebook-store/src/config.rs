//! Connection configuration
//!
//! Defaults, then a `.env` file, then process environment. The CLI applies
//! its own flags on top.

use crate::errors::{configuration_error, Result};
use gradebook_core_types::Sensitive;
use std::path::PathBuf;

pub const ENV_DATABASE_NAME: &str = "GRADEBOOK_DATABASE_NAME";
pub const ENV_DATABASE_USER: &str = "GRADEBOOK_DATABASE_USER";
pub const ENV_DATABASE_PASSWORD: &str = "GRADEBOOK_DATABASE_PASSWORD";
pub const ENV_DATABASE_HOST: &str = "GRADEBOOK_DATABASE_HOST";
pub const ENV_DATABASE_PORT: &str = "GRADEBOOK_DATABASE_PORT";

pub const DEFAULT_DATABASE: &str = "gradebook.db";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// Parameters supplied once when the connection manager is built
///
/// For SQLite `database` is the file path. `user`, `host` and `port` are
/// carried so the same configuration file serves a server-backed
/// deployment; they only show up in logs here.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub database: PathBuf,
    pub user: String,
    pub password: Sensitive<String>,
    pub host: String,
    pub port: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            user: String::new(),
            password: Sensitive::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ConnectionConfig {
    /// Configuration for a database file, other fields defaulted
    pub fn for_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: path.into(),
            ..Self::default()
        }
    }

    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(database) = lookup(ENV_DATABASE_NAME) {
            config.database = PathBuf::from(database);
        }
        if let Some(user) = lookup(ENV_DATABASE_USER) {
            config.user = user;
        }
        if let Some(password) = lookup(ENV_DATABASE_PASSWORD) {
            config.password = Sensitive::new(password);
        }
        if let Some(host) = lookup(ENV_DATABASE_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_DATABASE_PORT) {
            config.port = port.trim().parse().map_err(|_| {
                configuration_error(
                    ENV_DATABASE_PORT,
                    &format!("port must be a number between 0 and 65535, got '{}'", port),
                )
            })?;
        }
        Ok(config)
    }
}
