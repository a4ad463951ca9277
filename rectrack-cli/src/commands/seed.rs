//! Dataset seeding command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rectrack_server::db::{create_pool_with, seed, PoolSettings};
use rectrack_server::Dataset;

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// JSON dataset with `sections` and `recommendations`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Delete existing sections and recommendations first
    #[arg(long)]
    pub replace: bool,

    /// Validate the dataset without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Schema holding the tracker tables
    #[arg(long, env = "DATABASE_SCHEMA")]
    pub db_schema: Option<String>,
}

/// Validate a dataset file and load it into the database.
pub async fn run_seed(args: SeedArgs) -> Result<()> {
    let dataset = Dataset::load(&args.file)
        .with_context(|| format!("Failed to load dataset {}", args.file.display()))?;

    if args.dry_run {
        println!(
            "Dataset is valid: {} sections, {} recommendations",
            dataset.sections.len(),
            dataset.recommendations.len()
        );
        return Ok(());
    }

    let database_url = args
        .database_url
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;
    let settings = PoolSettings {
        schema: args.db_schema,
        ..PoolSettings::default()
    };
    let pool = create_pool_with(&database_url, &settings)
        .await
        .context("Failed to create database pool")?;

    let report = seed::seed(&pool, &dataset, args.replace)
        .await
        .context("Seeding failed")?;
    pool.close().await;

    println!(
        "Seeded {} sections and {} recommendations",
        report.sections, report.recommendations
    );
    Ok(())
}
