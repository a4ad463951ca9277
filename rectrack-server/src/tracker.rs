//! Section listings, status filtering and stats over a `TrackerStore`

use crate::db::{DbError, SectionRow, TrackerStore};
use crate::models::{Recommendation, SectionItem, SectionListing, StatusCounts};

/// Sections that own at least one recommendation, each with its
/// recommendations sorted by `number`.
pub async fn list_sections(store: &dyn TrackerStore) -> Result<Vec<SectionListing>, DbError> {
    let rows = store.section_rows().await?;
    Ok(group_sections(rows))
}

/// Recommendations whose stored status equals `status`.
///
/// Unknown tokens are not an error; they match nothing.
pub async fn list_recommendations_by_status(
    store: &dyn TrackerStore,
    status: &str,
) -> Result<Vec<Recommendation>, DbError> {
    store.recommendations_with_status(status).await
}

/// Recommendation counts per status. The buckets always sum to the total.
pub async fn compute_stats(store: &dyn TrackerStore) -> Result<StatusCounts, DbError> {
    store.status_counts().await
}

/// Result of comparing the stats buckets with the row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub stats: StatusCounts,
    pub total: i64,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.stats.total() == self.total
    }
}

/// Compute the stats and the total row count side by side.
pub async fn check_consistency(store: &dyn TrackerStore) -> Result<ConsistencyReport, DbError> {
    let stats = store.status_counts().await?;
    let total = store.recommendation_count().await?;
    Ok(ConsistencyReport { stats, total })
}

/// Group joined rows by section, keeping the order sections first appear in.
///
/// The per-section sort is stable, so equal numbers keep retrieval order.
pub fn group_sections(rows: Vec<SectionRow>) -> Vec<SectionListing> {
    let mut grouped: Vec<(i32, SectionListing)> = Vec::new();

    for row in rows {
        let item = SectionItem {
            number: row.number,
            text: row.text,
            status: row.status,
        };

        match grouped.iter_mut().find(|(id, _)| *id == row.section_id) {
            Some((_, listing)) => listing.recommendations.push(item),
            None => grouped.push((
                row.section_id,
                SectionListing {
                    name: row.section_name,
                    recommendations: vec![item],
                },
            )),
        }
    }

    grouped
        .into_iter()
        .map(|(_, mut listing)| {
            listing.recommendations.sort_by_key(|r| r.number);
            listing
        })
        .collect()
}
