//! Section repository
//!
//! The listing query is an inner JOIN: sections without recommendations never
//! appear in its output.

use sqlx::{FromRow, PgPool};

use super::recommendations::decode_status;
use super::DbError;
use crate::db::store::SectionRow;

#[derive(Debug, Clone, FromRow)]
struct JoinedRow {
    section_id: i32,
    section_name: String,
    recommendation_id: i32,
    number: i32,
    text: String,
    status: String,
}

/// Section repository
pub struct SectionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SectionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One row per (section, recommendation) pair, ordered by section id and
    /// then recommendation id.
    pub async fn joined_rows(&self) -> Result<Vec<SectionRow>, DbError> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            r#"
            SELECT
                s.id AS section_id,
                s.name AS section_name,
                r.id AS recommendation_id,
                r.number,
                r.text,
                r.status
            FROM sections s
            JOIN recommendations r ON r.section_id = s.id
            ORDER BY s.id, r.id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(SectionRow {
                    section_id: r.section_id,
                    section_name: r.section_name,
                    recommendation_id: r.recommendation_id,
                    number: r.number,
                    text: r.text,
                    status: decode_status(r.status)?,
                })
            })
            .collect()
    }
}
