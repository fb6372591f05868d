//! Error types for task domain validation, transitions and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or transitioning domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// An identifier was empty after trimming.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Which identifier was empty (`task` or `staff`).
        kind: &'static str,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A flag was raised without a reason.
    #[error("flag reason must not be empty")]
    EmptyFlagReason,

    /// The task already has an assignee.
    #[error("task {0} is already claimed")]
    AlreadyClaimed(TaskId),

    /// The task is unassigned but its status does not allow claiming.
    #[error("task {task_id} cannot be claimed while {status}")]
    NotClaimable {
        /// Task identifier.
        task_id: TaskId,
        /// Status observed when the claim was attempted.
        status: TaskStatus,
    },

    /// The task has already been completed.
    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),

    /// A flag resolution was requested for a task that is not flagged.
    #[error("task {task_id} is not flagged (status {status})")]
    NotFlagged {
        /// Task identifier.
        task_id: TaskId,
        /// Status observed when the resolution was attempted.
        status: TaskStatus,
    },
}

/// Error returned while parsing task statuses from input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing urgency levels from input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown urgency: {0}")]
pub struct ParseUrgencyError(pub String);
