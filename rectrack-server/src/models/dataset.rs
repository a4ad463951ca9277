//! JSON datasets used for seeding and for in-memory serving
//!
//! A dataset is validated as a whole before anything uses it: ids are unique
//! per kind, every recommendation points at a known section, and every
//! recommendation resolves to exactly one status. Recommendations may carry
//! either a `status` string or the legacy `done`/`ongoing`/`unsure` flags.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::{Recommendation, Section, Status, ValidationError};

/// Error loading a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid dataset: {0}")]
    Invalid(#[from] ValidationError),
}

/// Validated collection of sections and recommendations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub sections: Vec<Section>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Deserialize)]
struct RawDataset {
    #[serde(default)]
    sections: Vec<Section>,
    #[serde(default)]
    recommendations: Vec<RawRecommendation>,
}

#[derive(Deserialize)]
struct RawRecommendation {
    id: i32,
    section_id: i32,
    text: String,
    number: i32,
    status: Option<String>,
    done: Option<bool>,
    ongoing: Option<bool>,
    unsure: Option<bool>,
    link: Option<String>,
}

impl RawRecommendation {
    fn resolve_status(&self) -> Result<Status, ValidationError> {
        let has_flags = self.done.is_some() || self.ongoing.is_some() || self.unsure.is_some();
        let from_flags = Status::from_legacy_flags(
            self.id,
            self.done.unwrap_or(false),
            self.ongoing.unwrap_or(false),
            self.unsure.unwrap_or(false),
        )?;

        match &self.status {
            Some(text) => {
                let status: Status = text.parse()?;
                if has_flags && status != from_flags {
                    return Err(ValidationError::ConflictingFlags {
                        recommendation_id: self.id,
                    });
                }
                Ok(status)
            }
            None => Ok(from_flags),
        }
    }
}

impl Dataset {
    /// Build a dataset from already-typed records, validating references.
    pub fn new(
        sections: Vec<Section>,
        recommendations: Vec<Recommendation>,
    ) -> Result<Self, ValidationError> {
        let dataset = Self {
            sections,
            recommendations,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Parse and validate a JSON dataset.
    pub fn from_json(input: &str) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_str(input)?;

        let recommendations = raw
            .recommendations
            .into_iter()
            .map(|r| {
                let status = r.resolve_status()?;
                Ok(Recommendation {
                    id: r.id,
                    section_id: r.section_id,
                    text: r.text,
                    number: r.number,
                    status,
                    link: r.link,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self::new(raw.sections, recommendations)?)
    }

    /// Read, parse and validate a JSON dataset file.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if !section_ids.insert(section.id) {
                return Err(ValidationError::DuplicateId {
                    resource: "section",
                    id: section.id,
                });
            }
        }

        let mut recommendation_ids = HashSet::new();
        for rec in &self.recommendations {
            if !recommendation_ids.insert(rec.id) {
                return Err(ValidationError::DuplicateId {
                    resource: "recommendation",
                    id: rec.id,
                });
            }
            if !section_ids.contains(&rec.section_id) {
                return Err(ValidationError::MissingSection {
                    recommendation_id: rec.id,
                    section_id: rec.section_id,
                });
            }
        }

        Ok(())
    }
}
