//! Stored task status values.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored task status.
///
/// "Unassigned" is not a status: it is an [`TaskStatus::InProgress`] task
/// with no assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is open, claimed or not.
    InProgress,
    /// Task was marked overdue by an external process.
    Overdue,
    /// Task is blocked pending review.
    Flagged,
    /// Task is finished. Terminal.
    Completed,
}

impl TaskStatus {
    /// Returns the storage representation used by the record repository.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Overdue => "Overdue",
            Self::Flagged => "Flagged",
            Self::Completed => "Completed",
        }
    }

    /// Returns the normalized key consumed by dashboard bucketing.
    #[must_use]
    pub const fn normalized(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Overdue => "overdue",
            Self::Flagged => "flagged",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` for terminal statuses.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize_key(value).as_str() {
            "in-progress" => Ok(Self::InProgress),
            "overdue" => Ok(Self::Overdue),
            "flagged" => Ok(Self::Flagged),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Lowercases, trims and folds spaces and underscores into hyphens.
pub(crate) fn normalize_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '_' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
