//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use hireflow::task::{
    adapters::memory::{
        InMemoryAuditRecorder, InMemoryNotificationOutbox, InMemoryRecordRepository,
    },
    domain::{Task, TaskId},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<
    InMemoryRecordRepository,
    InMemoryAuditRecorder,
    InMemoryNotificationOutbox,
    DefaultClock,
>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    pub service: TestTaskService,
    pub repository: Arc<InMemoryRecordRepository>,
    pub task_id: Option<TaskId>,
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskLifecycleWorld {
    /// Creates a world with an empty repository.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryRecordRepository::new());
        let service = TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::new(InMemoryAuditRecorder::new()),
            Arc::new(InMemoryNotificationOutbox::new()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            repository,
            task_id: None,
            last_result: None,
        }
    }

    /// Returns the task created by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no task was created yet.
    pub fn task_id(&self) -> Result<&TaskId, eyre::Report> {
        self.task_id
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
