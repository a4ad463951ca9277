//! Section and recommendation records

use serde::{Deserialize, Serialize};

use super::Status;

/// A named grouping of recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: i32,
    pub name: String,
}

/// An actionable item owned by exactly one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub id: i32,
    pub section_id: i32,
    pub text: String,
    /// Display ordering within the owning section; not unique
    pub number: i32,
    pub status: Status,
    pub link: Option<String>,
}
