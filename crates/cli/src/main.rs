//! Fairweather CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Run all database migrations
//! fairweather-cli migrate
//!
//! # Run only the session store migration
//! fairweather-cli migrate --sessions-only
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fairweather-cli")]
#[command(author, version, about = "Fairweather CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Only create the session store table
        #[arg(long)]
        sessions_only: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { sessions_only } => commands::migrate::run(sessions_only).await?,
    }
    Ok(())
}
