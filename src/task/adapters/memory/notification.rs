//! In-memory notification outbox.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::ports::{
    Notification, NotificationDispatcher, NotificationError, NotificationResult,
};

/// Dispatcher that collects notifications instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationOutbox {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the dispatched notifications.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Delivery`] when the lock is poisoned.
    pub fn sent(&self) -> NotificationResult<Vec<Notification>> {
        let sent = self
            .sent
            .read()
            .map_err(|err| NotificationError::delivery(std::io::Error::other(err.to_string())))?;
        Ok(sent.clone())
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationOutbox {
    async fn dispatch(&self, notification: &Notification) -> NotificationResult<()> {
        let mut sent = self
            .sent
            .write()
            .map_err(|err| NotificationError::delivery(std::io::Error::other(err.to_string())))?;
        sent.push(notification.clone());
        Ok(())
    }
}
