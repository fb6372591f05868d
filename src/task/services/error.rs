//! Service-level error taxonomy for task lifecycle operations.

use crate::task::{
    domain::{StaffId, TaskDomainError, TaskId},
    ports::RecordRepositoryError,
};
use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Entity that could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundTarget {
    /// A task record.
    Task(TaskId),
    /// A staff record.
    Staff(StaffId),
}

impl fmt::Display for NotFoundTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Staff(id) => write!(f, "staff member {id}"),
        }
    }
}

/// Why a lifecycle precondition was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// Somebody already owns the task.
    AlreadyClaimed,
    /// The task is flagged, completed or otherwise closed to claims.
    NotClaimable,
    /// The task was completed before.
    AlreadyCompleted,
    /// Flag resolution requested for a task without an open flag.
    NotFlagged,
    /// The record changed or vanished between read and write.
    ConcurrentModification,
}

impl ConflictReason {
    /// Human-readable reason safe to return to callers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyClaimed => "Task already claimed",
            Self::NotClaimable => "Task is not open for claiming",
            Self::AlreadyCompleted => "Task already completed",
            Self::NotFlagged => "Task is not flagged",
            Self::ConcurrentModification => "Task was modified concurrently",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum TaskLifecycleError {
    /// Malformed or missing input.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending input field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The task or staff member does not exist.
    #[error("{0} not found")]
    NotFound(NotFoundTarget),

    /// A lifecycle precondition was violated.
    #[error("{0}")]
    Conflict(ConflictReason),

    /// A dependency failed, was unreachable or timed out.
    #[error("{dependency} unavailable: {source}")]
    DependencyUnavailable {
        /// Name of the failing dependency.
        dependency: &'static str,
        /// Underlying failure.
        source: RecordRepositoryError,
    },
}

impl TaskLifecycleError {
    /// Builds a [`TaskLifecycleError::Validation`] error.
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// HTTP status an API layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DependencyUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to return to callers. Dependency detail is withheld.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation { .. } => self.to_string(),
            Self::NotFound(NotFoundTarget::Task(_)) => "Task not found".to_owned(),
            Self::NotFound(NotFoundTarget::Staff(_)) => "Staff member not found".to_owned(),
            Self::Conflict(reason) => reason.as_str().to_owned(),
            Self::DependencyUnavailable { .. } => "Service temporarily unavailable".to_owned(),
        }
    }

    /// Returns `true` for input validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<TaskDomainError> for TaskLifecycleError {
    fn from(err: TaskDomainError) -> Self {
        match err {
            TaskDomainError::EmptyIdentifier { kind } => {
                Self::validation(identifier_field(kind), err.to_string())
            }
            TaskDomainError::EmptyTitle => Self::validation("title", err.to_string()),
            TaskDomainError::EmptyFlagReason => Self::validation("reason", err.to_string()),
            TaskDomainError::AlreadyClaimed(_) => Self::Conflict(ConflictReason::AlreadyClaimed),
            TaskDomainError::NotClaimable { .. } => Self::Conflict(ConflictReason::NotClaimable),
            TaskDomainError::AlreadyCompleted(_) => {
                Self::Conflict(ConflictReason::AlreadyCompleted)
            }
            TaskDomainError::NotFlagged { .. } => Self::Conflict(ConflictReason::NotFlagged),
        }
    }
}

fn identifier_field(kind: &'static str) -> &'static str {
    match kind {
        "task" => "task_id",
        "staff" => "staff_id",
        other => other,
    }
}

impl From<RecordRepositoryError> for TaskLifecycleError {
    fn from(err: RecordRepositoryError) -> Self {
        match err {
            // Reads report absence as `None`, so a missing record here means
            // a write raced with a delete.
            RecordRepositoryError::NotFound { .. }
            | RecordRepositoryError::PreconditionFailed { .. } => {
                Self::Conflict(ConflictReason::ConcurrentModification)
            }
            RecordRepositoryError::InvalidCursor(cursor) => {
                Self::validation("cursor", format!("unrecognized page cursor {cursor:?}"))
            }
            RecordRepositoryError::Timeout(_) | RecordRepositoryError::Persistence(_) => {
                Self::DependencyUnavailable {
                    dependency: "record repository",
                    source: err,
                }
            }
        }
    }
}
