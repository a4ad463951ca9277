//! rectrack-server: read-only HTTP API over sections and recommendations
//!
//! Serves sections with their recommendations, recommendations filtered by
//! status, and per-status counts. Data lives in Postgres (or an in-memory
//! dataset) and is only written out-of-band by migrations and seeding.

pub mod db;
pub mod http;
pub mod models;
pub mod tracker;

pub use db::{DbError, MemoryStore, PgStore, TrackerStore};
pub use http::{build_router, run_server, CorsPolicy, ServerConfig, ServerError};
pub use models::{Dataset, Status};
