//! Database layer - connection pool, repositories and the store abstraction
//!
//! # Design Principles
//!
//! - Connection pool (5 connections by default) - no global connection
//! - Section listing uses one JOIN - no N+1 queries
//! - Schema changes only through `migrations::run`, never at serve time
//! - Handlers see `dyn TrackerStore`, so Postgres and in-memory data are
//!   interchangeable

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod seed;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with, PoolSettings};
pub use repos::DbError;
pub use store::{PgStore, SectionRow, TrackerStore};
