//! Data consistency check command

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use rectrack_server::db::{create_pool_with, PoolSettings};
use rectrack_server::tracker::{self, ConsistencyReport};
use rectrack_server::{Dataset, MemoryStore, PgStore, TrackerStore};

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Database URL (ignored when --fixture is given)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Schema holding the tracker tables
    #[arg(long, env = "DATABASE_SCHEMA")]
    pub db_schema: Option<String>,

    /// Check a JSON dataset instead of a database
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print the stats and verify they add up to the recommendation count.
pub async fn run_check(args: CheckArgs) -> Result<()> {
    let report = match args.fixture {
        Some(path) => {
            let dataset = Dataset::load(&path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            check(&MemoryStore::new(dataset)).await?
        }
        None => {
            let database_url = args.database_url.context(
                "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env",
            )?;
            let settings = PoolSettings {
                schema: args.db_schema,
                ..PoolSettings::default()
            };
            let pool = create_pool_with(&database_url, &settings)
                .await
                .context("Failed to create database pool")?;
            let store = PgStore::new(pool);
            let report = check(&store).await;
            store.close().await;
            report?
        }
    };

    if args.json {
        let value = serde_json::json!({
            "stats": report.stats,
            "total": report.total,
            "consistent": report.is_consistent(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let stats = report.stats;
        println!("done:       {}", stats.done);
        println!("ongoing:    {}", stats.ongoing);
        println!("unsure:     {}", stats.unsure);
        println!("notStarted: {}", stats.not_started);
        println!("total:      {}", report.total);
    }

    if !report.is_consistent() {
        bail!(
            "stats sum to {} but there are {} recommendations",
            report.stats.total(),
            report.total
        );
    }
    Ok(())
}

async fn check(store: &dyn TrackerStore) -> Result<ConsistencyReport> {
    tracker::check_consistency(store)
        .await
        .context("Failed to read stats")
}
