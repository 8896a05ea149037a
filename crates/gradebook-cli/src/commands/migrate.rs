//! Migrate command
//!
//! Usage: gradebook [--database PATH] migrate

use super::CommandResult;
use gradebook_store::{db, migrations, ConnectionConfig};

pub fn execute(config: &ConnectionConfig) -> CommandResult {
    let mut conn = db::open_configured(&config.database)?;
    migrations::apply_migrations(&mut conn)?;

    let applied = migrations::applied_migrations(&conn)?;
    println!(
        "✓ {} is up to date ({} migrations applied)",
        config.database.display(),
        applied.len()
    );
    Ok(())
}
