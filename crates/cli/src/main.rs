//! Washboard CLI - Database migrations and sample data tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! wb-cli migrate
//!
//! # Import sample data into empty tables
//! wb-cli seed
//! wb-cli seed --dir path/to/sampledata
//!
//! # Show row counts per table
//! wb-cli stats
//! ```
//!
//! Every command reads `WASHBOARD_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wb-cli")]
#[command(author, version, about = "Washboard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import the sample JSON files into tables that are still empty
    Seed {
        /// Directory holding the sample files
        #[arg(short, long, default_value = "crates/web/sampledata")]
        dir: PathBuf,
    },
    /// Show row counts for every table
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { dir } => commands::seed::sample_data(&dir).await,
        Commands::Stats => commands::seed::stats().await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_seed_dir_defaults_to_bundled_samples() {
        let cli = Cli::try_parse_from(["wb-cli", "seed"]).unwrap();
        match cli.command {
            Commands::Seed { dir } => assert_eq!(dir, PathBuf::from("crates/web/sampledata")),
            _ => panic!("expected seed command"),
        }
    }
}
