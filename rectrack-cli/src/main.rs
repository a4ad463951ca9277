//! rectrack CLI - recommendation status tracking API
//!
//! Entry point for the `rectrack` command-line tool, which provides:
//! - The read-only HTTP API (`serve`)
//! - Explicit schema migration, including legacy flag conversion (`migrate`)
//! - Out-of-band dataset loading (`seed`)
//! - Stats consistency checking (`check`)

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "rectrack",
    author,
    version,
    about = "Serve sections of recommendations with their status and aggregate stats"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create or upgrade the database schema
    Migrate(commands::migrate::MigrateArgs),
    /// Load a JSON dataset into the database
    Seed(commands::seed::SeedArgs),
    /// Print stats and verify they cover every recommendation
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be configured
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::Migrate(args) => commands::migrate::run_migrate(args).await,
        Commands::Seed(args) => commands::seed::run_seed(args).await,
        Commands::Check(args) => commands::check::run_check(args).await,
    }
}
