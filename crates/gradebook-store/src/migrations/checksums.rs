//! Migration checksums
//!
//! The SHA-256 of each migration's SQL is recorded when it is applied, so
//! an edited migration file is caught instead of silently skipped.

use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 of the migration text
pub fn compute_checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}
