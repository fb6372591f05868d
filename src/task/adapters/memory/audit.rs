//! In-memory audit recorder.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::ports::{AuditError, AuditEvent, AuditRecorder, AuditResult};

/// Audit recorder that keeps events in memory, in append order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditRecorder {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl InMemoryAuditRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Unavailable`] when the lock is poisoned.
    pub fn events(&self) -> AuditResult<Vec<AuditEvent>> {
        let events = self
            .events
            .read()
            .map_err(|err| AuditError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }
}

#[async_trait]
impl AuditRecorder for InMemoryAuditRecorder {
    async fn record(&self, event: &AuditEvent) -> AuditResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|err| AuditError::unavailable(std::io::Error::other(err.to_string())))?;
        events.push(event.clone());
        Ok(())
    }
}
