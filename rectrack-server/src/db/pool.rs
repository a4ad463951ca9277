//! Connection pool settings
//!
//! The pool is opened once at process start and handed to the store. Requests
//! are short reads, so the pool is small and waits for a free connection only
//! briefly; a saturated or unreachable database surfaces as a 500 instead of a
//! hung request.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// How the tracker connects to Postgres
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a query waits for a pooled connection
    pub acquire_timeout: Duration,
    /// Schema holding the tracker tables; the server default search path
    /// applies when unset
    pub schema: Option<String>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            schema: None,
        }
    }
}

/// Open a pool with the default settings.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with(database_url, &PoolSettings::default()).await
}

/// Open a pool. With a `schema` set, every new connection has its
/// `search_path` pointed at it before it is handed out.
pub async fn create_pool_with(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    let mut options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout);

    if let Some(schema) = &settings.schema {
        let statement = search_path_statement(schema);
        tracing::debug!(schema = %schema, "Pinning search_path on new connections");
        options = options.after_connect(move |conn, _meta| {
            let statement = statement.clone();
            Box::pin(async move {
                sqlx::query(&statement).execute(&mut *conn).await?;
                Ok(())
            })
        });
    }

    options.connect(database_url).await
}

/// `SET search_path` for a single schema, quoted as an identifier.
fn search_path_statement(schema: &str) -> String {
    format!("SET search_path TO \"{}\"", schema.replace('"', "\"\""))
}
