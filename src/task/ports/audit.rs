//! Audit recorder port: append-only trail of lifecycle operations.

use crate::task::domain::{StaffId, TaskId, TaskOperation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Outcome recorded with an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Error,
}

/// Immutable audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Acting staff member; `None` for system-triggered operations.
    pub actor: Option<StaffId>,
    /// Operation that was attempted.
    pub operation: TaskOperation,
    /// Target task, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Outcome.
    pub status: AuditStatus,
    /// Human-readable detail.
    pub message: String,
    /// When the outcome was observed.
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates a success event.
    #[must_use]
    pub fn success(
        operation: TaskOperation,
        actor: Option<StaffId>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            actor,
            operation,
            task_id: None,
            status: AuditStatus::Success,
            message: message.into(),
            timestamp,
        }
    }

    /// Creates a failure event.
    #[must_use]
    pub fn failure(
        operation: TaskOperation,
        actor: Option<StaffId>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status: AuditStatus::Error,
            ..Self::success(operation, actor, message, timestamp)
        }
    }

    /// Attaches the target task.
    #[must_use]
    pub fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// Audit persistence contract.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// Appends an event to the audit trail.
    async fn record(&self, event: &AuditEvent) -> AuditResult<()>;
}

/// Errors returned by audit recorder adapters.
#[derive(Debug, Clone, Error)]
pub enum AuditError {
    /// The audit store could not be reached or rejected the event.
    #[error("audit store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditError {
    /// Wraps an audit store error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
