//! Axum server setup
//!
//! Server skeleton with:
//! - Permissive CORS by default, optional origin allow-list
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::routes;
use crate::db::TrackerStore;

/// Cross-origin policy for browser clients
#[derive(Debug, Clone, Default)]
pub enum CorsPolicy {
    /// Any origin may read the API
    #[default]
    Permissive,
    /// Only the listed origins may read the API
    Origins(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// Build a policy from configured origins. No origins, or a `*` entry
    /// anywhere in the list, means permissive. Blank entries are skipped.
    pub fn from_origins<S: AsRef<str>>(origins: &[S]) -> Result<Self, ServerError> {
        let origins: Vec<&str> = origins
            .iter()
            .map(|o| o.as_ref().trim())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() || origins.contains(&"*") {
            return Ok(Self::Permissive);
        }

        origins
            .into_iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| ServerError::InvalidOrigin(o.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Origins)
    }

    fn layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);

        match self {
            Self::Origins(origins) if !origins.iter().any(|o| o.as_bytes() == b"*") => {
                layer.allow_origin(origins.clone())
            }
            // tower-http rejects a wildcard inside an origin list
            _ => layer.allow_origin(Any),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    /// Cross-origin policy (default: permissive)
    pub cors: CorsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            cors: CorsPolicy::Permissive,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackerStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrackerStore>) -> Self {
        Self { store }
    }
}

/// Build the application router with all routes
pub fn build_router(store: Arc<dyn TrackerStore>, cors: &CorsPolicy) -> Router {
    if matches!(cors, CorsPolicy::Permissive) {
        tracing::debug!("CORS: Permissive mode enabled - all origins allowed");
    }

    Router::new()
        .merge(routes::health::router())
        .merge(routes::sections::router())
        .merge(routes::recommendations::router())
        .merge(routes::stats::router())
        .fallback(not_found)
        .layer(cors.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState::new(store)))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(PgStore::new(create_pool(&database_url).await?));
/// run_server(store, ServerConfig::default()).await?;
/// ```
pub async fn run_server(
    store: Arc<dyn TrackerStore>,
    config: ServerConfig,
) -> Result<(), ServerError> {
    let app = build_router(store, &config.cors);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),
}
