//! Service layer for task lifecycle transitions, assignment and listing.

use super::{
    EngineSettings, SideEffects, TaskListCache,
    cache::ListCacheKey,
    error::{ConflictReason, NotFoundTarget, TaskLifecycleError, TaskLifecycleResult},
    requests::{CreateTaskRequest, EditTaskRequest},
};
use crate::task::{
    domain::{
        NewTask, Staff, StaffId, Task, TaskAttribute, TaskBuckets, TaskEdit, TaskId,
        TaskOperation, TaskStatus,
    },
    mapping::{
        codec::{decode_staff, decode_task, encode_attributes, encode_new_task},
        fields::{STAFF_IS_ADMIN, field_name},
    },
    ports::{
        AuditEvent, AuditRecorder, Notification, NotificationDispatcher, PageCursor, Record,
        RecordFilter, RecordQuery, RecordRepository, RecordRepositoryError,
        RecordRepositoryResult, RecordSort, Severity,
    },
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Task lifecycle orchestration service.
///
/// Every operation reads, checks its precondition, issues one write and then
/// runs its side effects. Nothing is retried.
#[derive(Clone)]
pub struct TaskLifecycleService<R, A, N, C>
where
    R: RecordRepository,
    A: AuditRecorder,
    N: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    effects: SideEffects<A, N>,
    clock: Arc<C>,
    settings: EngineSettings,
    list_cache: Arc<TaskListCache>,
}

impl<R, A, N, C> TaskLifecycleService<R, A, N, C>
where
    R: RecordRepository,
    A: AuditRecorder,
    N: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates a service with default settings and no list cache.
    #[must_use]
    pub fn new(repository: Arc<R>, audit: Arc<A>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        let settings = EngineSettings::default();
        Self {
            repository,
            effects: SideEffects::new(audit, notifier, settings.side_effect_timeout),
            clock,
            settings,
            list_cache: Arc::new(TaskListCache::disabled()),
        }
    }

    /// Replaces the engine settings.
    #[must_use]
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.effects = self.effects.with_timeout(settings.side_effect_timeout);
        self.settings = settings;
        self
    }

    /// Injects a listing cache, possibly shared with other services.
    #[must_use]
    pub fn with_list_cache(mut self, list_cache: Arc<TaskListCache>) -> Self {
        self.list_cache = list_cache;
        self
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Creates a task, unassigned unless the request names an assignee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for malformed input,
    /// [`TaskLifecycleError::NotFound`] when the assignee does not exist and
    /// [`TaskLifecycleError::DependencyUnavailable`] when the repository
    /// fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let draft = request.into_new_task(&*self.clock)?;
        let actor = draft.created_by().cloned();
        let outcome = self.try_create(&draft).await;
        self.finish(TaskOperation::Create, actor.as_ref(), None, outcome)
            .await
    }

    async fn try_create(&self, draft: &NewTask) -> TaskLifecycleResult<Task> {
        if let Some(assignee) = draft.assignee() {
            self.require_staff(assignee).await?;
        }
        let record = self
            .bounded(
                self.repository
                    .create(&self.settings.task_table, encode_new_task(draft)),
            )
            .await?;
        decode_record(&record)
    }

    /// Loads a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and [`TaskLifecycleError::DependencyUnavailable`] when the repository
    /// fails.
    pub async fn find_task(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        self.load_task(task_id).await
    }

    /// Claims an unassigned, in-progress task for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Conflict`] when the task already has an
    /// assignee or is not open for claiming, and
    /// [`TaskLifecycleError::NotFound`] when the task or actor is missing.
    pub async fn claim_task(&self, task_id: &TaskId, actor: &StaffId) -> TaskLifecycleResult<Task> {
        let outcome = self.try_claim(task_id, actor).await;
        self.finish(TaskOperation::Claim, Some(actor), Some(task_id), outcome)
            .await
    }

    async fn try_claim(&self, task_id: &TaskId, actor: &StaffId) -> TaskLifecycleResult<Task> {
        self.require_staff(actor).await?;
        let observed = self.load_record(task_id).await?;
        let mut task = decode_record(&observed)?;
        let touched = task.claim(actor.clone(), &*self.clock)?;
        let written = self
            .bounded(self.settings.claim_guard.write(
                &*self.repository,
                &self.settings.task_table,
                &observed,
                encode_attributes(&task, touched),
            ))
            .await;
        match written {
            Ok(record) => decode_record(&record),
            Err(RecordRepositoryError::PreconditionFailed { .. }) => {
                Err(self.lost_claim(task_id).await)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Explains a claim whose conditional write was refused, from a fresh
    /// read of the task.
    async fn lost_claim(&self, task_id: &TaskId) -> TaskLifecycleError {
        let current = match self.load_task(task_id).await {
            Ok(current) => current,
            Err(err) => return err,
        };
        if current.assignee().is_some() {
            TaskLifecycleError::Conflict(ConflictReason::AlreadyClaimed)
        } else if current.status() == TaskStatus::InProgress {
            TaskLifecycleError::Conflict(ConflictReason::ConcurrentModification)
        } else {
            TaskLifecycleError::Conflict(ConflictReason::NotClaimable)
        }
    }

    /// Releases a task back to the global pool. Accepted in any state.
    ///
    /// `actor` is used for audit attribution only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing.
    pub async fn unclaim_task(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
    ) -> TaskLifecycleResult<Task> {
        let outcome = self.try_unclaim(task_id).await;
        self.finish(TaskOperation::Unclaim, Some(actor), Some(task_id), outcome)
            .await
    }

    async fn try_unclaim(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        let mut task = self.load_task(task_id).await?;
        let touched = task.unclaim();
        self.persist(&task, touched).await
    }

    /// Completes a task and notifies administrators.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Conflict`] when the task is already
    /// completed and [`TaskLifecycleError::NotFound`] when the task or actor
    /// is missing.
    pub async fn complete_task(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
    ) -> TaskLifecycleResult<Task> {
        let outcome = self.try_complete(task_id, actor).await;
        let (task, staff) = self
            .finish(TaskOperation::Complete, Some(actor), Some(task_id), outcome)
            .await?;
        self.notify_admins(
            Severity::Info,
            "Task completed",
            format!("{} completed \"{}\"", staff.display_name(), task.title()),
        )
        .await;
        Ok(task)
    }

    async fn try_complete(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
    ) -> TaskLifecycleResult<(Task, Staff)> {
        let staff = self.require_staff(actor).await?;
        let mut task = self.load_task(task_id).await?;
        let touched = task.complete(actor.clone(), &*self.clock)?;
        let stored = self.persist(&task, touched).await?;
        Ok((stored, staff))
    }

    /// Flags a task for review and warns administrators.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for a blank reason,
    /// [`TaskLifecycleError::Conflict`] for completed tasks and
    /// [`TaskLifecycleError::NotFound`] when the task or actor is missing.
    pub async fn flag_task(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        reason: &str,
    ) -> TaskLifecycleResult<Task> {
        if reason.trim().is_empty() {
            return Err(TaskLifecycleError::validation(
                "reason",
                "flag reason must not be empty",
            ));
        }
        let outcome = self.try_flag(task_id, actor, reason).await;
        let (task, staff) = self
            .finish(TaskOperation::Flag, Some(actor), Some(task_id), outcome)
            .await?;
        self.notify_admins(
            Severity::Warning,
            "Task flagged",
            format!(
                "{} flagged \"{}\": {}",
                staff.display_name(),
                task.title(),
                task.flagged_reason()
            ),
        )
        .await;
        Ok(task)
    }

    async fn try_flag(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        reason: &str,
    ) -> TaskLifecycleResult<(Task, Staff)> {
        let staff = self.require_staff(actor).await?;
        let mut task = self.load_task(task_id).await?;
        let touched = task.flag(actor.clone(), reason, &*self.clock)?;
        let stored = self.persist(&task, touched).await?;
        Ok((stored, staff))
    }

    /// Resolves an open flag and returns the task to in progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Conflict`] unless the task is flagged
    /// and [`TaskLifecycleError::NotFound`] when the task or actor is
    /// missing.
    pub async fn resolve_flag(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        note: &str,
    ) -> TaskLifecycleResult<Task> {
        let outcome = self.try_resolve(task_id, actor, note, false).await;
        let (task, _) = self
            .finish(TaskOperation::ResolveFlag, Some(actor), Some(task_id), outcome)
            .await?;
        Ok(task)
    }

    /// Resolves an open flag and completes the task in one write, then
    /// notifies administrators.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Conflict`] unless the task is flagged
    /// and [`TaskLifecycleError::NotFound`] when the task or actor is
    /// missing.
    pub async fn resolve_and_complete(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        note: &str,
    ) -> TaskLifecycleResult<Task> {
        let outcome = self.try_resolve(task_id, actor, note, true).await;
        let (task, staff) = self
            .finish(
                TaskOperation::ResolveAndComplete,
                Some(actor),
                Some(task_id),
                outcome,
            )
            .await?;
        self.notify_admins(
            Severity::Info,
            "Task completed",
            format!(
                "{} resolved the flag on \"{}\" and completed it",
                staff.display_name(),
                task.title()
            ),
        )
        .await;
        Ok(task)
    }

    async fn try_resolve(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        note: &str,
        complete: bool,
    ) -> TaskLifecycleResult<(Task, Staff)> {
        let staff = self.require_staff(actor).await?;
        let mut task = self.load_task(task_id).await?;
        let touched = if complete {
            task.resolve_and_complete(actor.clone(), note, &*self.clock)?
        } else {
            task.resolve_flag(actor.clone(), note, &*self.clock)?
        };
        let stored = self.persist(&task, touched).await?;
        Ok((stored, staff))
    }

    /// Overwrites whitelisted attributes. Editing a completed task is
    /// allowed but logged.
    ///
    /// `actor` is used for audit attribution only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for an empty or malformed
    /// edit and [`TaskLifecycleError::NotFound`] when the task is missing.
    pub async fn edit_task(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        request: EditTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let edit = request.into_edit()?;
        let outcome = self.try_edit(task_id, actor, edit).await;
        self.finish(TaskOperation::Edit, Some(actor), Some(task_id), outcome)
            .await
    }

    async fn try_edit(
        &self,
        task_id: &TaskId,
        actor: &StaffId,
        edit: TaskEdit,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load_task(task_id).await?;
        if task.status() == TaskStatus::Completed {
            warn!(task_id = %task_id, actor = %actor, "editing a completed task");
        }
        let touched = task.apply_edit(edit)?;
        self.persist(&task, &touched).await
    }

    /// Deletes a task and tells its assignee, if any. Deleting a task that
    /// does not exist succeeds.
    ///
    /// `actor` is used for audit attribution only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::DependencyUnavailable`] when the
    /// repository fails.
    pub async fn delete_task(&self, task_id: &TaskId, actor: &StaffId) -> TaskLifecycleResult<()> {
        let outcome = self.try_delete(task_id).await;
        let removed = self
            .finish(TaskOperation::Delete, Some(actor), Some(task_id), outcome)
            .await?;
        if let Some(task) = removed {
            let notification = Notification::new(
                task.assignee().cloned().into_iter().collect(),
                "Task removed",
                format!("\"{}\" assigned to you was deleted", task.title()),
                Severity::Info,
            );
            self.effects.notify(&notification).await;
        }
        Ok(())
    }

    async fn try_delete(&self, task_id: &TaskId) -> TaskLifecycleResult<Option<Task>> {
        let existing = self
            .bounded(
                self.repository
                    .find(&self.settings.task_table, task_id.as_str()),
            )
            .await?;
        let previous = existing.as_ref().and_then(|record| {
            decode_task(record)
                .inspect_err(|err| {
                    warn!(task_id = %task_id, error = %err, "undecodable task record");
                })
                .ok()
        });
        self.bounded(
            self.repository
                .delete(&self.settings.task_table, task_id.as_str()),
        )
        .await?;
        Ok(previous)
    }

    /// Lists the actor's tasks plus unassigned tasks, grouped into
    /// dashboard buckets. Completed tasks are never listed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Validation`] for a cursor the
    /// repository did not issue and
    /// [`TaskLifecycleError::DependencyUnavailable`] when the repository
    /// fails.
    pub async fn list_tasks_for_actor(
        &self,
        actor: &StaffId,
        page_size: Option<usize>,
        cursor: Option<PageCursor>,
    ) -> TaskLifecycleResult<TaskBuckets> {
        let size = self.settings.page_size(page_size);
        let key = ListCacheKey::new(actor.clone(), size, cursor.clone());
        let now = self.clock.utc();
        if let Some(cached) = self.list_cache.get(&key, now) {
            debug!(actor = %actor, "task listing served from cache");
            return Ok(cached);
        }
        let generation = self.list_cache.generation();
        let assignee = field_name(TaskAttribute::Assignee);
        let query = RecordQuery::new()
            .with_filter(RecordFilter::All(vec![
                RecordFilter::not_equals(
                    field_name(TaskAttribute::Status),
                    TaskStatus::Completed.as_str(),
                ),
                RecordFilter::Any(vec![
                    RecordFilter::link_is(assignee, actor.as_str()),
                    RecordFilter::link_empty(assignee),
                ]),
            ]))
            .sorted_by(RecordSort::ascending(field_name(TaskAttribute::DueDate)))
            .with_page_size(size)
            .with_cursor(cursor);
        let page = self
            .bounded(self.repository.query(&self.settings.task_table, &query))
            .await?;
        let tasks = page.records.iter().filter_map(|record| {
            decode_task(record)
                .inspect_err(|err| {
                    warn!(record_id = %record.id, error = %err, "skipping undecodable task record");
                })
                .ok()
        });
        let buckets = TaskBuckets::from_tasks(
            tasks,
            now.date_naive(),
            page.next_cursor.map(|next| next.as_str().to_owned()),
        );
        debug!(actor = %actor, listed = buckets.len(), "task listing served from repository");
        self.list_cache.insert(key, buckets.clone(), now, generation);
        Ok(buckets)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = RecordRepositoryResult<T>>,
    ) -> RecordRepositoryResult<T> {
        let limit = self.settings.repository_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(RecordRepositoryError::Timeout(limit)))
    }

    async fn load_task(&self, task_id: &TaskId) -> TaskLifecycleResult<Task> {
        decode_record(&self.load_record(task_id).await?)
    }

    async fn load_record(&self, task_id: &TaskId) -> TaskLifecycleResult<Record> {
        self.bounded(
            self.repository
                .find(&self.settings.task_table, task_id.as_str()),
        )
        .await?
        .ok_or_else(|| TaskLifecycleError::NotFound(NotFoundTarget::Task(task_id.clone())))
    }

    async fn require_staff(&self, staff_id: &StaffId) -> TaskLifecycleResult<Staff> {
        let record = self
            .bounded(
                self.repository
                    .find(&self.settings.staff_table, staff_id.as_str()),
            )
            .await?
            .ok_or_else(|| TaskLifecycleError::NotFound(NotFoundTarget::Staff(staff_id.clone())))?;
        decode_staff(&record).map_err(|err| {
            TaskLifecycleError::from(RecordRepositoryError::persistence(err))
        })
    }

    /// Writes the touched attributes and returns the stored task.
    async fn persist(
        &self,
        task: &Task,
        touched: &[TaskAttribute],
    ) -> TaskLifecycleResult<Task> {
        let record = self
            .bounded(self.repository.update(
                &self.settings.task_table,
                task.id().as_str(),
                encode_attributes(task, touched),
            ))
            .await?;
        decode_record(&record)
    }

    /// Logs and audits the outcome of a write operation.
    async fn finish<T>(
        &self,
        operation: TaskOperation,
        actor: Option<&StaffId>,
        target: Option<&TaskId>,
        outcome: TaskLifecycleResult<T>,
    ) -> TaskLifecycleResult<T>
    where
        T: AuditSubject,
    {
        let now = self.clock.utc();
        match outcome {
            Ok(subject) => {
                self.list_cache.invalidate_all();
                let task_id = subject.task_id().or(target);
                info!(
                    operation = %operation,
                    task_id = ?task_id.map(TaskId::as_str),
                    actor = ?actor.map(StaffId::as_str),
                    "task operation succeeded"
                );
                let event = AuditEvent::success(
                    operation,
                    actor.cloned(),
                    format!("{operation} succeeded"),
                    now,
                );
                self.effects.audit(&attach_task(event, task_id)).await;
                Ok(subject)
            }
            Err(err) => {
                if err.is_validation() {
                    return Err(err);
                }
                if matches!(err, TaskLifecycleError::DependencyUnavailable { .. }) {
                    // The write may have landed before the failure surfaced.
                    self.list_cache.invalidate_all();
                }
                info!(
                    operation = %operation,
                    task_id = ?target.map(TaskId::as_str),
                    error = %err,
                    "task operation rejected"
                );
                let event = AuditEvent::failure(
                    operation,
                    actor.cloned(),
                    format!("{operation} failed: {err}"),
                    now,
                );
                self.effects.audit(&attach_task(event, target)).await;
                Err(err)
            }
        }
    }

    async fn notify_admins(&self, severity: Severity, title: &str, body: String) {
        let recipients = match self.admin_recipients().await {
            Ok(recipients) => recipients,
            Err(err) => {
                warn!(error = %err, "could not resolve administrator recipients");
                return;
            }
        };
        let notification = Notification::new(recipients, title, body, severity);
        self.effects.notify(&notification).await;
    }

    async fn admin_recipients(&self) -> TaskLifecycleResult<Vec<StaffId>> {
        let mut recipients = Vec::new();
        let mut cursor = None;
        loop {
            let query = RecordQuery::new()
                .with_filter(RecordFilter::equals(STAFF_IS_ADMIN, true))
                .with_page_size(self.settings.max_page_size.max(1))
                .with_cursor(cursor);
            let page = self
                .bounded(self.repository.query(&self.settings.staff_table, &query))
                .await?;
            recipients.extend(
                page.records
                    .iter()
                    .filter_map(|record| decode_staff(record).ok())
                    .filter(Staff::is_admin)
                    .map(|staff| staff.id().clone()),
            );
            cursor = page.next_cursor;
            if cursor.is_none() {
                return Ok(recipients);
            }
        }
    }
}

/// Value an operation reports on success, used to attribute its audit
/// event.
trait AuditSubject {
    fn task_id(&self) -> Option<&TaskId>;
}

impl AuditSubject for Task {
    fn task_id(&self) -> Option<&TaskId> {
        Some(self.id())
    }
}

impl AuditSubject for (Task, Staff) {
    fn task_id(&self) -> Option<&TaskId> {
        Some(self.0.id())
    }
}

impl AuditSubject for Option<Task> {
    fn task_id(&self) -> Option<&TaskId> {
        self.as_ref().map(Task::id)
    }
}

fn attach_task(mut event: AuditEvent, task_id: Option<&TaskId>) -> AuditEvent {
    event.task_id = task_id.cloned();
    event
}

fn decode_record(record: &Record) -> TaskLifecycleResult<Task> {
    decode_task(record)
        .map_err(|err| TaskLifecycleError::from(RecordRepositoryError::persistence(err)))
}
