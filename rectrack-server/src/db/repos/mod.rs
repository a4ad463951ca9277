//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Section listings come from one JOIN query (no N+1)
//! - Stats come from one grouped COUNT query
//! - Status text is decoded into `Status` at the repository boundary

pub mod recommendations;
pub mod sections;

pub use recommendations::RecommendationRepo;
pub use sections::SectionRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("stored status '{value}' is not a known status")]
    CorruptStatus { value: String },

    #[error("migration failed: {0}")]
    Migration(String),
}
