//! Runtime settings consumed by the task lifecycle service.

use super::ClaimGuard;
use std::time::Duration;

/// Default task table name.
pub const DEFAULT_TASK_TABLE: &str = "Tasks";
/// Default staff table name.
pub const DEFAULT_STAFF_TABLE: &str = "Staff";
/// Default bound on every repository call.
pub const DEFAULT_REPOSITORY_TIMEOUT: Duration = Duration::from_secs(10);
/// Default bound on every audit or notification call.
pub const DEFAULT_SIDE_EFFECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default listing page size.
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Default upper bound for a caller-chosen page size.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Engine settings. Usually derived from
/// [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Table holding task records.
    pub task_table: String,
    /// Table holding staff records.
    pub staff_table: String,
    /// Bound on each repository call.
    pub repository_timeout: Duration,
    /// Bound on each audit or notification call.
    pub side_effect_timeout: Duration,
    /// How claims are written.
    pub claim_guard: ClaimGuard,
    /// Page size used when the caller gives none.
    pub default_page_size: usize,
    /// Largest page size a caller may request.
    pub max_page_size: usize,
}

impl EngineSettings {
    /// Clamps a requested page size to `1..=max_page_size`.
    #[must_use]
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        let upper = self.max_page_size.max(1);
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, upper)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            task_table: DEFAULT_TASK_TABLE.to_owned(),
            staff_table: DEFAULT_STAFF_TABLE.to_owned(),
            repository_timeout: DEFAULT_REPOSITORY_TIMEOUT,
            side_effect_timeout: DEFAULT_SIDE_EFFECT_TIMEOUT,
            claim_guard: ClaimGuard::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}
