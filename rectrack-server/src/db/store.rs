//! Storage handle injected into request handlers
//!
//! Provides a trait for the read queries the API needs, with:
//! - Postgres implementation backed by a connection pool
//! - In-memory implementation over a validated dataset (see `memory`)

use async_trait::async_trait;
use sqlx::PgPool;

use super::repos::{DbError, RecommendationRepo, SectionRepo};
use crate::models::{Recommendation, Status, StatusCounts};

/// One recommendation joined with its owning section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRow {
    pub section_id: i32,
    pub section_name: String,
    pub recommendation_id: i32,
    pub number: i32,
    pub text: String,
    pub status: Status,
}

/// Read access to sections and recommendations (testable)
#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// Inner join of sections and recommendations, ordered by section id and
    /// then recommendation id.
    async fn section_rows(&self) -> Result<Vec<SectionRow>, DbError>;

    /// Recommendations whose status text equals `status`, ordered by id.
    async fn recommendations_with_status(
        &self,
        status: &str,
    ) -> Result<Vec<Recommendation>, DbError>;

    /// Count of recommendations in each status bucket.
    async fn status_counts(&self) -> Result<StatusCounts, DbError>;

    /// Total number of recommendations.
    async fn recommendation_count(&self) -> Result<i64, DbError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), DbError>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection. Call after the server has drained.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl TrackerStore for PgStore {
    async fn section_rows(&self) -> Result<Vec<SectionRow>, DbError> {
        SectionRepo::new(&self.pool).joined_rows().await
    }

    async fn recommendations_with_status(
        &self,
        status: &str,
    ) -> Result<Vec<Recommendation>, DbError> {
        RecommendationRepo::new(&self.pool)
            .list_by_status(status)
            .await
    }

    async fn status_counts(&self) -> Result<StatusCounts, DbError> {
        RecommendationRepo::new(&self.pool).count_by_status().await
    }

    async fn recommendation_count(&self) -> Result<i64, DbError> {
        RecommendationRepo::new(&self.pool).count_all().await
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
