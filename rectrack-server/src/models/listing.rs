//! Aggregated views returned by the read endpoints

use serde::Serialize;

use super::Status;

/// A section and its recommendations, sorted by `number`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionListing {
    pub name: String,
    pub recommendations: Vec<SectionItem>,
}

/// Recommendation as shown inside a section listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionItem {
    pub number: i32,
    pub text: String,
    pub status: Status,
}

/// Recommendation counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub done: i64,
    pub ongoing: i64,
    pub unsure: i64,
    #[serde(rename = "notStarted")]
    pub not_started: i64,
}

impl StatusCounts {
    /// Add `count` to the bucket for `status`.
    pub fn add(&mut self, status: Status, count: i64) {
        match status {
            Status::Done => self.done += count,
            Status::Ongoing => self.ongoing += count,
            Status::Unsure => self.unsure += count,
            Status::NotStarted => self.not_started += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.done + self.ongoing + self.unsure + self.not_started
    }
}
