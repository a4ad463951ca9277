//! In-memory store over a validated dataset
//!
//! Answers the same queries as the Postgres store with the same ordering, so
//! `serve --fixture` and the router tests behave like a seeded database.

use async_trait::async_trait;

use super::repos::DbError;
use super::store::{SectionRow, TrackerStore};
use crate::models::{Dataset, Recommendation, StatusCounts};

/// Read-only store holding a dataset in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dataset: Dataset,
}

impl MemoryStore {
    pub fn new(mut dataset: Dataset) -> Self {
        dataset.sections.sort_by_key(|s| s.id);
        dataset.recommendations.sort_by_key(|r| r.id);
        Self { dataset }
    }
}

#[async_trait]
impl TrackerStore for MemoryStore {
    async fn section_rows(&self) -> Result<Vec<SectionRow>, DbError> {
        let mut rows = Vec::new();
        for section in &self.dataset.sections {
            let owned = self
                .dataset
                .recommendations
                .iter()
                .filter(|r| r.section_id == section.id);

            rows.extend(owned.map(|r| SectionRow {
                section_id: section.id,
                section_name: section.name.clone(),
                recommendation_id: r.id,
                number: r.number,
                text: r.text.clone(),
                status: r.status,
            }));
        }
        Ok(rows)
    }

    async fn recommendations_with_status(
        &self,
        status: &str,
    ) -> Result<Vec<Recommendation>, DbError> {
        Ok(self
            .dataset
            .recommendations
            .iter()
            .filter(|r| r.status.as_str() == status)
            .cloned()
            .collect())
    }

    async fn status_counts(&self) -> Result<StatusCounts, DbError> {
        let mut counts = StatusCounts::default();
        for rec in &self.dataset.recommendations {
            counts.add(rec.status, 1);
        }
        Ok(counts)
    }

    async fn recommendation_count(&self) -> Result<i64, DbError> {
        Ok(self.dataset.recommendations.len() as i64)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}
