//! Task aggregate root and its lifecycle transitions.
//!
//! Every transition mutates the aggregate in place and reports which
//! attributes it touched, so that the service writes only those fields back
//! to the record repository.

use super::{StaffId, TaskDomainError, TaskId, TaskStatus, Urgency};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Default classification tag for new tasks.
pub const DEFAULT_TASK_TYPE: &str = "Standard";

/// Persisted task attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAttribute {
    /// Task title.
    Title,
    /// Free-text description.
    Description,
    /// Urgency level.
    Urgency,
    /// Optional due date.
    DueDate,
    /// Stored status.
    Status,
    /// Current owner, if claimed.
    Assignee,
    /// Creator reference.
    CreatedBy,
    /// Claim timestamp.
    ClaimedAt,
    /// Completing actor.
    CompletedBy,
    /// Completion timestamp.
    CompletedAt,
    /// Reason of the open flag.
    FlaggedReason,
    /// Actor that raised the flag.
    FlaggedBy,
    /// Flag timestamp.
    FlaggedAt,
    /// Actor that resolved the flag.
    FlagResolvedBy,
    /// Flag resolution timestamp.
    FlagResolvedAt,
    /// Note left when resolving the flag.
    ResolutionNote,
    /// Classification tag.
    TaskType,
}

const CLAIM_ATTRIBUTES: &[TaskAttribute] = &[TaskAttribute::Assignee, TaskAttribute::ClaimedAt];

const COMPLETE_ATTRIBUTES: &[TaskAttribute] = &[
    TaskAttribute::Status,
    TaskAttribute::Assignee,
    TaskAttribute::ClaimedAt,
    TaskAttribute::CompletedBy,
    TaskAttribute::CompletedAt,
];

const COMPLETE_FLAGGED_ATTRIBUTES: &[TaskAttribute] = &[
    TaskAttribute::Status,
    TaskAttribute::Assignee,
    TaskAttribute::ClaimedAt,
    TaskAttribute::CompletedBy,
    TaskAttribute::CompletedAt,
    TaskAttribute::FlaggedReason,
];

const FLAG_ATTRIBUTES: &[TaskAttribute] = &[
    TaskAttribute::Status,
    TaskAttribute::FlaggedReason,
    TaskAttribute::FlaggedBy,
    TaskAttribute::FlaggedAt,
];

const RESOLVE_ATTRIBUTES: &[TaskAttribute] = &[
    TaskAttribute::Status,
    TaskAttribute::FlaggedReason,
    TaskAttribute::FlagResolvedBy,
    TaskAttribute::FlagResolvedAt,
    TaskAttribute::ResolutionNote,
];

const RESOLVE_AND_COMPLETE_ATTRIBUTES: &[TaskAttribute] = &[
    TaskAttribute::Status,
    TaskAttribute::FlaggedReason,
    TaskAttribute::FlagResolvedBy,
    TaskAttribute::FlagResolvedAt,
    TaskAttribute::ResolutionNote,
    TaskAttribute::Assignee,
    TaskAttribute::ClaimedAt,
    TaskAttribute::CompletedBy,
    TaskAttribute::CompletedAt,
];

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    urgency: Urgency,
    due_date: Option<NaiveDate>,
    status: TaskStatus,
    assignee: Option<StaffId>,
    created_by: Option<StaffId>,
    claimed_at: Option<DateTime<Utc>>,
    completed_by: Option<StaffId>,
    completed_at: Option<DateTime<Utc>>,
    flagged_reason: String,
    flagged_by: Option<StaffId>,
    flagged_at: Option<DateTime<Utc>>,
    flag_resolved_by: Option<StaffId>,
    flag_resolved_at: Option<DateTime<Utc>>,
    resolution_note: String,
    task_type: String,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Urgency.
    pub urgency: Urgency,
    /// Due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Stored status.
    pub status: TaskStatus,
    /// Assignee, if claimed.
    pub assignee: Option<StaffId>,
    /// Creator, if recorded.
    pub created_by: Option<StaffId>,
    /// Claim timestamp.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Completing actor.
    pub completed_by: Option<StaffId>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Reason of the open flag, empty when not flagged.
    pub flagged_reason: String,
    /// Actor that raised the latest flag.
    pub flagged_by: Option<StaffId>,
    /// Timestamp of the latest flag.
    pub flagged_at: Option<DateTime<Utc>>,
    /// Actor that resolved the latest flag.
    pub flag_resolved_by: Option<StaffId>,
    /// Timestamp of the latest flag resolution.
    pub flag_resolved_at: Option<DateTime<Utc>>,
    /// Note left with the latest flag resolution.
    pub resolution_note: String,
    /// Classification tag.
    pub task_type: String,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            urgency: data.urgency,
            due_date: data.due_date,
            status: data.status,
            assignee: data.assignee,
            created_by: data.created_by,
            claimed_at: data.claimed_at,
            completed_by: data.completed_by,
            completed_at: data.completed_at,
            flagged_reason: data.flagged_reason,
            flagged_by: data.flagged_by,
            flagged_at: data.flagged_at,
            flag_resolved_by: data.flag_resolved_by,
            flag_resolved_at: data.flag_resolved_at,
            resolution_note: data.resolution_note,
            task_type: data.task_type,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the urgency.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the stored status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assignee, if claimed.
    #[must_use]
    pub const fn assignee(&self) -> Option<&StaffId> {
        self.assignee.as_ref()
    }

    /// Returns the creator, if recorded.
    #[must_use]
    pub const fn created_by(&self) -> Option<&StaffId> {
        self.created_by.as_ref()
    }

    /// Returns the claim timestamp.
    #[must_use]
    pub const fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    /// Returns the completing actor.
    #[must_use]
    pub const fn completed_by(&self) -> Option<&StaffId> {
        self.completed_by.as_ref()
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the reason of the open flag, empty when not flagged.
    #[must_use]
    pub fn flagged_reason(&self) -> &str {
        &self.flagged_reason
    }

    /// Returns the actor that raised the latest flag.
    #[must_use]
    pub const fn flagged_by(&self) -> Option<&StaffId> {
        self.flagged_by.as_ref()
    }

    /// Returns the timestamp of the latest flag.
    #[must_use]
    pub const fn flagged_at(&self) -> Option<DateTime<Utc>> {
        self.flagged_at
    }

    /// Returns the actor that resolved the latest flag.
    #[must_use]
    pub const fn flag_resolved_by(&self) -> Option<&StaffId> {
        self.flag_resolved_by.as_ref()
    }

    /// Returns the timestamp of the latest flag resolution.
    #[must_use]
    pub const fn flag_resolved_at(&self) -> Option<DateTime<Utc>> {
        self.flag_resolved_at
    }

    /// Returns the note left with the latest flag resolution.
    #[must_use]
    pub fn resolution_note(&self) -> &str {
        &self.resolution_note
    }

    /// Returns the classification tag.
    #[must_use]
    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// Returns `true` for an open task nobody has claimed yet.
    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        self.assignee.is_none() && matches!(self.status, TaskStatus::InProgress)
    }

    /// Claims the task for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyClaimed`] when an assignee is set and
    /// [`TaskDomainError::NotClaimable`] when the status is not in progress.
    pub fn claim(
        &mut self,
        actor: StaffId,
        clock: &impl Clock,
    ) -> Result<&'static [TaskAttribute], TaskDomainError> {
        if self.assignee.is_some() {
            return Err(TaskDomainError::AlreadyClaimed(self.id.clone()));
        }
        if self.status != TaskStatus::InProgress {
            return Err(TaskDomainError::NotClaimable {
                task_id: self.id.clone(),
                status: self.status,
            });
        }
        self.assignee = Some(actor);
        self.claimed_at = Some(clock.utc());
        Ok(CLAIM_ATTRIBUTES)
    }

    /// Releases the task back to the global pool. Accepted in any state.
    pub fn unclaim(&mut self) -> &'static [TaskAttribute] {
        self.assignee = None;
        self.claimed_at = None;
        CLAIM_ATTRIBUTES
    }

    /// Completes the task, clearing its assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyCompleted`] for completed tasks.
    pub fn complete(
        &mut self,
        actor: StaffId,
        clock: &impl Clock,
    ) -> Result<&'static [TaskAttribute], TaskDomainError> {
        self.ensure_not_completed()?;
        let had_open_flag = !self.flagged_reason.is_empty();
        self.mark_completed(actor, clock.utc());
        if had_open_flag {
            self.flagged_reason.clear();
            return Ok(COMPLETE_FLAGGED_ATTRIBUTES);
        }
        Ok(COMPLETE_ATTRIBUTES)
    }

    /// Flags the task for review.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyFlagReason`] for a blank reason and
    /// [`TaskDomainError::AlreadyCompleted`] for completed tasks.
    pub fn flag(
        &mut self,
        actor: StaffId,
        reason: &str,
        clock: &impl Clock,
    ) -> Result<&'static [TaskAttribute], TaskDomainError> {
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyFlagReason);
        }
        self.ensure_not_completed()?;
        self.status = TaskStatus::Flagged;
        trimmed.clone_into(&mut self.flagged_reason);
        self.flagged_by = Some(actor);
        self.flagged_at = Some(clock.utc());
        Ok(FLAG_ATTRIBUTES)
    }

    /// Resolves an open flag and returns the task to in progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotFlagged`] unless the task is flagged.
    pub fn resolve_flag(
        &mut self,
        actor: StaffId,
        note: &str,
        clock: &impl Clock,
    ) -> Result<&'static [TaskAttribute], TaskDomainError> {
        self.ensure_flagged()?;
        self.status = TaskStatus::InProgress;
        self.mark_resolved(actor, note, clock.utc());
        Ok(RESOLVE_ATTRIBUTES)
    }

    /// Resolves an open flag and completes the task in one step.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotFlagged`] unless the task is flagged.
    pub fn resolve_and_complete(
        &mut self,
        actor: StaffId,
        note: &str,
        clock: &impl Clock,
    ) -> Result<&'static [TaskAttribute], TaskDomainError> {
        self.ensure_flagged()?;
        let timestamp = clock.utc();
        self.mark_resolved(actor.clone(), note, timestamp);
        self.mark_completed(actor, timestamp);
        Ok(RESOLVE_AND_COMPLETE_ATTRIBUTES)
    }

    /// Applies a whitelisted edit. Fields left unset are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the edit blanks the title.
    pub fn apply_edit(&mut self, edit: TaskEdit) -> Result<Vec<TaskAttribute>, TaskDomainError> {
        let mut touched = Vec::new();
        if let Some(title) = edit.title {
            self.title = validated_title(&title)?;
            touched.push(TaskAttribute::Title);
        }
        if let Some(description) = edit.description {
            self.description = description;
            touched.push(TaskAttribute::Description);
        }
        if let Some(urgency) = edit.urgency {
            self.urgency = urgency;
            touched.push(TaskAttribute::Urgency);
        }
        if let Some(due_date) = edit.due_date {
            self.due_date = due_date;
            touched.push(TaskAttribute::DueDate);
        }
        if let Some(task_type) = edit.task_type {
            self.task_type = task_type;
            touched.push(TaskAttribute::TaskType);
        }
        Ok(touched)
    }

    /// Derives the normalized status key used for dashboard bucketing.
    ///
    /// Overdue is computed here against `today`; it is never written.
    #[must_use]
    pub fn display_status(&self, today: NaiveDate) -> &'static str {
        match self.status {
            TaskStatus::InProgress => match self.due_date {
                Some(due) if due < today => TaskStatus::Overdue.normalized(),
                Some(due) if due == today => "today",
                _ => TaskStatus::InProgress.normalized(),
            },
            status => status.normalized(),
        }
    }

    fn ensure_not_completed(&self) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::AlreadyCompleted(self.id.clone()));
        }
        Ok(())
    }

    fn ensure_flagged(&self) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::Flagged {
            return Err(TaskDomainError::NotFlagged {
                task_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn mark_completed(&mut self, actor: StaffId, timestamp: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.assignee = None;
        self.claimed_at = None;
        self.completed_by = Some(actor);
        self.completed_at = Some(timestamp);
    }

    fn mark_resolved(&mut self, actor: StaffId, note: &str, timestamp: DateTime<Utc>) {
        self.flagged_reason.clear();
        self.flag_resolved_by = Some(actor);
        self.flag_resolved_at = Some(timestamp);
        note.trim().clone_into(&mut self.resolution_note);
    }
}

/// A task that has not been persisted yet. The repository assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
    urgency: Urgency,
    due_date: Option<NaiveDate>,
    assignee: Option<StaffId>,
    created_by: Option<StaffId>,
    claimed_at: Option<DateTime<Utc>>,
    task_type: String,
}

impl NewTask {
    /// Creates an unassigned task draft.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title.
    pub fn new(title: &str) -> Result<Self, TaskDomainError> {
        Ok(Self {
            title: validated_title(title)?,
            description: String::new(),
            urgency: Urgency::default(),
            due_date: None,
            assignee: None,
            created_by: None,
            claimed_at: None,
            task_type: DEFAULT_TASK_TYPE.to_owned(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the urgency.
    #[must_use]
    pub const fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the creator.
    #[must_use]
    pub fn with_created_by(mut self, created_by: StaffId) -> Self {
        self.created_by = Some(created_by);
        self
    }

    /// Sets the classification tag. Blank values keep the default.
    #[must_use]
    pub fn with_task_type(mut self, task_type: &str) -> Self {
        let trimmed = task_type.trim();
        if !trimmed.is_empty() {
            trimmed.clone_into(&mut self.task_type);
        }
        self
    }

    /// Assigns the task at creation, stamping the claim time.
    #[must_use]
    pub fn assigned_to(mut self, assignee: StaffId, clock: &impl Clock) -> Self {
        self.assignee = Some(assignee);
        self.claimed_at = Some(clock.utc());
        self
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the urgency.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the initial assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<&StaffId> {
        self.assignee.as_ref()
    }

    /// Returns the creator, if recorded.
    #[must_use]
    pub const fn created_by(&self) -> Option<&StaffId> {
        self.created_by.as_ref()
    }

    /// Returns the claim timestamp for pre-assigned tasks.
    #[must_use]
    pub const fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    /// Returns the classification tag.
    #[must_use]
    pub fn task_type(&self) -> &str {
        &self.task_type
    }
}

/// Whitelisted task edit. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement urgency.
    pub urgency: Option<Urgency>,
    /// Replacement due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
    /// Replacement classification tag.
    pub task_type: Option<String>,
}

impl TaskEdit {
    /// Returns `true` when the edit would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.urgency.is_none()
            && self.due_date.is_none()
            && self.task_type.is_none()
    }
}

fn validated_title(title: &str) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
