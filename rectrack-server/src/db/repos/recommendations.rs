//! Recommendation repository
//!
//! - list_by_status: exact text match on the stored status, ordered by id
//! - count_by_status: one grouped COUNT covering every bucket

use sqlx::{FromRow, PgPool};

use super::DbError;
use crate::models::{Recommendation, Status, StatusCounts};

/// Recommendation row as stored
#[derive(Debug, Clone, FromRow)]
struct RecommendationRow {
    id: i32,
    section_id: i32,
    text: String,
    number: i32,
    status: String,
    link: Option<String>,
}

impl TryFrom<RecommendationRow> for Recommendation {
    type Error = DbError;

    fn try_from(row: RecommendationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            section_id: row.section_id,
            text: row.text,
            number: row.number,
            status: decode_status(row.status)?,
            link: row.link,
        })
    }
}

pub(crate) fn decode_status(value: String) -> Result<Status, DbError> {
    value
        .parse()
        .map_err(|_| DbError::CorruptStatus { value })
}

/// Recommendation repository
pub struct RecommendationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> RecommendationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Recommendations whose stored status equals `status` exactly.
    ///
    /// The token is not validated; an unknown token matches nothing.
    pub async fn list_by_status(&self, status: &str) -> Result<Vec<Recommendation>, DbError> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT id, section_id, text, number, status, link
            FROM recommendations
            WHERE status = $1
            ORDER BY id
            "#,
        )
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Recommendation::try_from).collect()
    }

    /// Count recommendations per status in a single grouped query.
    ///
    /// Buckets with no rows are reported as zero.
    pub async fn count_by_status(&self) -> Result<StatusCounts, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM recommendations GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.add(decode_status(status)?, count);
        }
        Ok(counts)
    }

    /// Total number of recommendations.
    pub async fn count_all(&self) -> Result<i64, DbError> {
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM recommendations")
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }
}
