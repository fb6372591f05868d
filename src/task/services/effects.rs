//! Post-write side effects: audit appends and notifications.
//!
//! Both run after the repository acknowledged the write. They are awaited
//! and bounded, and a failure or timeout is logged and swallowed so it never
//! changes the outcome of the operation.

use crate::task::ports::{AuditEvent, AuditRecorder, Notification, NotificationDispatcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Bounded, failure-tolerant access to the audit and notification ports.
#[derive(Debug)]
pub struct SideEffects<A, N> {
    audit: Arc<A>,
    notifier: Arc<N>,
    timeout: Duration,
}

impl<A, N> Clone for SideEffects<A, N> {
    fn clone(&self) -> Self {
        Self {
            audit: Arc::clone(&self.audit),
            notifier: Arc::clone(&self.notifier),
            timeout: self.timeout,
        }
    }
}

impl<A, N> SideEffects<A, N>
where
    A: AuditRecorder,
    N: NotificationDispatcher,
{
    /// Creates the side-effect runner.
    #[must_use]
    pub const fn new(audit: Arc<A>, notifier: Arc<N>, timeout: Duration) -> Self {
        Self {
            audit,
            notifier,
            timeout,
        }
    }

    /// Returns a copy bounded by a different timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends an audit event.
    pub async fn audit(&self, event: &AuditEvent) {
        match timeout(self.timeout, self.audit.record(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(
                operation = %event.operation,
                task_id = ?event.task_id,
                error = %err,
                "audit append failed"
            ),
            Err(_) => warn!(
                operation = %event.operation,
                task_id = ?event.task_id,
                timeout_ms = self.timeout_ms(),
                "audit append timed out"
            ),
        }
    }

    /// Delivers a notification. Notifications without recipients are
    /// dropped.
    pub async fn notify(&self, notification: &Notification) {
        if notification.recipients.is_empty() {
            debug!(title = %notification.title, "notification has no recipients");
            return;
        }
        match timeout(self.timeout, self.notifier.dispatch(notification)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(
                title = %notification.title,
                recipients = notification.recipients.len(),
                error = %err,
                "notification delivery failed"
            ),
            Err(_) => warn!(
                title = %notification.title,
                recipients = notification.recipients.len(),
                timeout_ms = self.timeout_ms(),
                "notification delivery timed out"
            ),
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
