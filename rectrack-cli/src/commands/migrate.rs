//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use rectrack_server::db::{create_pool_with, migrations, PoolSettings};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Schema holding the tracker tables
    #[arg(long, env = "DATABASE_SCHEMA")]
    pub db_schema: Option<String>,
}

/// Create or upgrade the schema, converting legacy status flags.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let settings = PoolSettings {
        schema: args.db_schema,
        ..PoolSettings::default()
    };
    let pool = create_pool_with(&args.database_url, &settings)
        .await
        .context("Failed to create database pool")?;

    let report = migrations::run(&pool).await.context("Migration failed")?;
    pool.close().await;

    if report.dropped_columns.is_empty() && report.defaulted_rows == 0 {
        println!("Schema is up to date");
    }
    if !report.dropped_columns.is_empty() {
        println!(
            "Converted {} recommendations from legacy flags; dropped columns: {}",
            report.converted_rows,
            report.dropped_columns.join(", ")
        );
    }
    if report.defaulted_rows > 0 {
        println!(
            "Set {} recommendations without a status to notStarted",
            report.defaulted_rows
        );
    }
    Ok(())
}
