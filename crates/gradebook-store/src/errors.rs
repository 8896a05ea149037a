//! Error handling for gradebook-store
//!
//! Wraps gradebook-core ExError with store-specific helpers

use gradebook_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a configuration error
pub fn configuration_error(key: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("load_config")
        .with_field(key)
        .with_message(reason.to_string())
}

/// Map an engine error, keeping its message unchanged
///
/// Constraint failures (UNIQUE, FOREIGN KEY, NOT NULL, CHECK) are told
/// apart so callers can react to them, e.g. a duplicate email.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}
