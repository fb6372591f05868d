//! Audit and notification adapters that emit structured `tracing` events.
//!
//! Useful when no audit store or delivery channel is wired up: the trail
//! ends up wherever the subscriber writes.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::task::domain::{StaffId, TaskId};
use crate::task::ports::{
    AuditEvent, AuditRecorder, AuditResult, AuditStatus, Notification, NotificationDispatcher,
    NotificationResult, Severity,
};

/// Audit recorder that logs each event under the `hireflow::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditRecorder;

#[async_trait]
impl AuditRecorder for TracingAuditRecorder {
    async fn record(&self, event: &AuditEvent) -> AuditResult<()> {
        let actor = event.actor.as_ref().map(StaffId::as_str);
        let task_id = event.task_id.as_ref().map(TaskId::as_str);
        match event.status {
            AuditStatus::Success => info!(
                target: "hireflow::audit",
                operation = %event.operation,
                actor,
                task_id,
                timestamp = %event.timestamp,
                "{}",
                event.message
            ),
            AuditStatus::Error => warn!(
                target: "hireflow::audit",
                operation = %event.operation,
                actor,
                task_id,
                timestamp = %event.timestamp,
                "{}",
                event.message
            ),
        }
        Ok(())
    }
}

/// Notification dispatcher that logs each notification under the
/// `hireflow::notify` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingNotificationDispatcher {
    async fn dispatch(&self, notification: &Notification) -> NotificationResult<()> {
        let recipients = notification
            .recipients
            .iter()
            .map(StaffId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        match notification.severity {
            Severity::Info => info!(
                target: "hireflow::notify",
                recipients = %recipients,
                title = %notification.title,
                "{}",
                notification.body
            ),
            Severity::Warning | Severity::Critical => warn!(
                target: "hireflow::notify",
                recipients = %recipients,
                severity = ?notification.severity,
                title = %notification.title,
                "{}",
                notification.body
            ),
        }
        Ok(())
    }
}
