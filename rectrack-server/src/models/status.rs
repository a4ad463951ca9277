//! Recommendation lifecycle status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Lifecycle status of a recommendation.
///
/// Stored and serialized as `notStarted`, `ongoing`, `unsure` or `done`.
/// Transitions are unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    NotStarted,
    Ongoing,
    Unsure,
    Done,
}

impl Status {
    /// Every status, in the order stats are reported.
    pub const ALL: [Status; 4] = [Self::Done, Self::Ongoing, Self::Unsure, Self::NotStarted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "notStarted",
            Self::Ongoing => "ongoing",
            Self::Unsure => "unsure",
            Self::Done => "done",
        }
    }

    /// Convert the older three-boolean encoding.
    ///
    /// At most one flag may be set; no flag means `NotStarted`.
    pub fn from_legacy_flags(
        recommendation_id: i32,
        done: bool,
        ongoing: bool,
        unsure: bool,
    ) -> Result<Self, ValidationError> {
        match (done, ongoing, unsure) {
            (false, false, false) => Ok(Self::NotStarted),
            (true, false, false) => Ok(Self::Done),
            (false, true, false) => Ok(Self::Ongoing),
            (false, false, true) => Ok(Self::Unsure),
            _ => Err(ValidationError::ConflictingFlags { recommendation_id }),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus {
                value: s.to_owned(),
            })
    }
}
