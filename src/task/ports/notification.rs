//! Notification dispatcher port.

use crate::task::domain::StaffId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
    /// Needs immediate attention.
    Critical,
}

/// Message delivered to one or more staff members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipients.
    pub recipients: Vec<StaffId>,
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Severity.
    pub severity: Severity,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(
        recipients: Vec<StaffId>,
        title: impl Into<String>,
        body: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            recipients,
            title: title.into(),
            body: body.into(),
            severity,
        }
    }
}

/// Fire-and-forget delivery contract.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers a notification to its recipients.
    async fn dispatch(&self, notification: &Notification) -> NotificationResult<()>;
}

/// Errors returned by notification adapters.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// Delivery failed.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
