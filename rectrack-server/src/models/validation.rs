//! Validation error types

use std::fmt;

/// Validation error for datasets and domain values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Status text is not one of the four known values
    UnknownStatus { value: String },

    /// Legacy boolean flags mark more than one status at once
    ConflictingFlags { recommendation_id: i32 },

    /// Two records of the same kind share an id
    DuplicateId { resource: &'static str, id: i32 },

    /// A recommendation points at a section that does not exist
    MissingSection { recommendation_id: i32, section_id: i32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatus { value } => write!(f, "invalid status value: '{}'", value),
            Self::ConflictingFlags { recommendation_id } => write!(
                f,
                "recommendation {} has more than one of done/ongoing/unsure set",
                recommendation_id
            ),
            Self::DuplicateId { resource, id } => write!(f, "duplicate {} id {}", resource, id),
            Self::MissingSection {
                recommendation_id,
                section_id,
            } => write!(
                f,
                "recommendation {} references missing section {}",
                recommendation_id, section_id
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
