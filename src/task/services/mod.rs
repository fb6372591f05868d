//! Application services for task lifecycle orchestration.
//!
//! [`TaskLifecycleService`] is the engine: it validates requests, enforces
//! the state machine against the record repository and runs audit and
//! notification side effects after each acknowledged write.

mod cache;
mod claim;
mod effects;
mod error;
mod lifecycle;
mod requests;
mod settings;

pub use cache::{
    DEFAULT_LIST_CACHE_MAX_ENTRIES, DEFAULT_LIST_CACHE_TTL, ListCacheKey, TaskListCache,
};
pub use claim::{ClaimGuard, claim_precondition};
pub use effects::SideEffects;
pub use error::{ConflictReason, NotFoundTarget, TaskLifecycleError, TaskLifecycleResult};
pub use lifecycle::TaskLifecycleService;
pub use requests::{CreateTaskRequest, EditTaskRequest};
pub use settings::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_REPOSITORY_TIMEOUT,
    DEFAULT_SIDE_EFFECT_TIMEOUT, DEFAULT_STAFF_TABLE, DEFAULT_TASK_TABLE, EngineSettings,
};
