//! Names of the lifecycle operations recorded in the audit trail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A lifecycle operation exposed by the task engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOperation {
    /// Task creation.
    Create,
    /// Claim of an unassigned task.
    Claim,
    /// Release of a claimed task.
    Unclaim,
    /// Completion.
    Complete,
    /// Flag raised for review.
    Flag,
    /// Flag resolved back to in progress.
    ResolveFlag,
    /// Flag resolved straight to completion.
    ResolveAndComplete,
    /// Whitelisted field edit.
    Edit,
    /// Administrative deletion.
    Delete,
}

impl TaskOperation {
    /// Returns the audit event type label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create Task",
            Self::Claim => "Claim Task",
            Self::Unclaim => "Unclaim Task",
            Self::Complete => "Complete Task",
            Self::Flag => "Flag Task",
            Self::ResolveFlag => "Resolve Task Flag",
            Self::ResolveAndComplete => "Resolve Flag And Complete Task",
            Self::Edit => "Edit Task",
            Self::Delete => "Delete Task",
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
