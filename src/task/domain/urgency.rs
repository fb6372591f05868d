//! Urgency levels used for dashboard ordering.

use super::{ParseUrgencyError, status::normalize_key};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task urgency. Only affects sort order, never scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Most urgent.
    VeryHigh,
    /// Urgent.
    High,
    /// Normal urgency.
    #[default]
    Medium,
    /// Not urgent.
    Low,
    /// Least urgent.
    VeryLow,
    /// Stored value that could not be recognized.
    Unknown,
}

impl Urgency {
    /// Sort rank, lowest first. Unknown values sort after every known level.
    #[must_use]
    pub const fn rank(self) -> u16 {
        match self {
            Self::VeryHigh => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Low => 4,
            Self::VeryLow => 5,
            Self::Unknown => 999,
        }
    }

    /// Returns the storage representation, or `None` for unknown values.
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::VeryHigh => Some("Very High"),
            Self::High => Some("High"),
            Self::Medium => Some("Medium"),
            Self::Low => Some("Low"),
            Self::VeryLow => Some("Very Low"),
            Self::Unknown => None,
        }
    }

    /// Parses a stored urgency, mapping anything unrecognized to
    /// [`Urgency::Unknown`].
    #[must_use]
    pub fn from_storage(value: &str) -> Self {
        Self::try_from(value).unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("Unknown"))
    }
}

impl TryFrom<&str> for Urgency {
    type Error = ParseUrgencyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize_key(value).as_str() {
            "very-high" => Ok(Self::VeryHigh),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "very-low" => Ok(Self::VeryLow),
            _ => Err(ParseUrgencyError(value.to_owned())),
        }
    }
}
