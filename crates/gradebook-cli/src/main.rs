//! Gradebook CLI
//!
//! Command-line interface for the school gradebook store

use clap::{Parser, Subcommand};
use gradebook_core::logging_facility::{self, Profile};
use gradebook_store::ConnectionConfig;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "gradebook")]
#[command(about = "Gradebook - school records over SQLite", long_about = None)]
struct Cli {
    /// Database file; overrides GRADEBOOK_DATABASE_NAME
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Logging profile: development, production or test
    #[arg(long, global = true, env = "GRADEBOOK_LOG_PROFILE", default_value = "test")]
    log_profile: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or upgrade the school tables
    Migrate,
    /// Print stored entities of one type
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log_profile);

    let result = load_config(cli.database).and_then(|config| match cli.command {
        Commands::Migrate => commands::migrate::execute(&config),
        Commands::Show(args) => commands::show::execute(&config, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(database: Option<PathBuf>) -> commands::CommandResult<ConnectionConfig> {
    let mut config = ConnectionConfig::from_env()?;
    if let Some(database) = database {
        config.database = database;
    }
    Ok(config)
}
