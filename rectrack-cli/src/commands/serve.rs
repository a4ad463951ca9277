//! HTTP server command
//!
//! Serves the read API from Postgres, or from a JSON dataset held in memory.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use rectrack_server::db::pool::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS};
use rectrack_server::db::{create_pool_with, PoolSettings};
use rectrack_server::{run_server, CorsPolicy, Dataset, MemoryStore, PgStore, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Database URL (ignored when --fixture is given)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Schema holding the tracker tables
    #[arg(long, env = "DATABASE_SCHEMA")]
    pub db_schema: Option<String>,

    /// Serve a JSON dataset from memory instead of a database
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Allowed CORS origin (repeatable); all origins when omitted
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Seconds a request waits for a free database connection
    #[arg(long, default_value_t = DEFAULT_ACQUIRE_TIMEOUT.as_secs())]
    pub acquire_timeout: u64,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        cors: CorsPolicy::from_origins(args.cors_origins.as_slice())
            .context("Invalid CORS configuration")?,
    };

    if let Some(path) = args.fixture {
        let dataset = Dataset::load(&path)
            .with_context(|| format!("Failed to load fixture {}", path.display()))?;
        tracing::info!(
            fixture = %path.display(),
            sections = dataset.sections.len(),
            recommendations = dataset.recommendations.len(),
            "Serving in-memory dataset"
        );

        run_server(Arc::new(MemoryStore::new(dataset)), config)
            .await
            .context("Server error")?;
        return Ok(());
    }

    let database_url = args
        .database_url
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

    let settings = PoolSettings {
        max_connections: args.max_connections,
        acquire_timeout: Duration::from_secs(args.acquire_timeout),
        schema: args.db_schema,
    };
    let pool = create_pool_with(&database_url, &settings)
        .await
        .context("Failed to create database pool")?;
    let store = PgStore::new(pool);

    // Run server (blocks until shutdown)
    let result = run_server(Arc::new(store.clone()), config).await;

    store.close().await;
    tracing::info!("Database pool closed");

    result.context("Server error")
}
