//! Out-of-band loading of a validated dataset into Postgres
//!
//! - Upserts by primary key (ON CONFLICT), sections before recommendations
//! - One transaction: a failed seed leaves the tables untouched

use sqlx::PgPool;

use super::repos::DbError;
use crate::models::Dataset;

/// Rows written by a seed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub sections: u64,
    pub recommendations: u64,
}

/// Write `dataset` into the tables created by the migrations.
///
/// With `replace`, existing rows are deleted first.
pub async fn seed(pool: &PgPool, dataset: &Dataset, replace: bool) -> Result<SeedReport, DbError> {
    let mut tx = pool.begin().await?;

    if replace {
        sqlx::query("DELETE FROM recommendations").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sections").execute(&mut *tx).await?;
        tracing::info!("Cleared existing sections and recommendations");
    }

    let mut report = SeedReport::default();

    for section in &dataset.sections {
        report.sections += sqlx::query(
            r#"
            INSERT INTO sections (id, name) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(section.id)
        .bind(&section.name)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for rec in &dataset.recommendations {
        report.recommendations += sqlx::query(
            r#"
            INSERT INTO recommendations (id, section_id, text, number, status, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                section_id = EXCLUDED.section_id,
                text = EXCLUDED.text,
                number = EXCLUDED.number,
                status = EXCLUDED.status,
                link = EXCLUDED.link
            "#,
        )
        .bind(rec.id)
        .bind(rec.section_id)
        .bind(&rec.text)
        .bind(rec.number)
        .bind(rec.status.as_str())
        .bind(rec.link.as_deref())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    tracing::info!(
        sections = report.sections,
        recommendations = report.recommendations,
        "Seed complete"
    );
    Ok(report)
}
