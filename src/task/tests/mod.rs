//! Unit tests for the task module.


use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex};

/// Clock pinned to a settable instant.
#[derive(Debug, Clone)]
pub(crate) struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// 2026-03-10T09:30:00Z.
    pub(crate) fn morning() -> Self {
        Self::at(
            Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0)
                .single()
                .expect("valid fixed instant"),
        )
    }

    pub(crate) fn advance(&self, by: chrono::TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}
