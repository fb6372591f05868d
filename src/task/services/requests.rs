//! Request payloads accepted by the task lifecycle service.
//!
//! Requests carry raw caller input. Validation happens once, when the
//! service converts a request into domain values, and always before any
//! repository call.

use super::error::{TaskLifecycleError, TaskLifecycleResult};
use crate::task::domain::{NewTask, StaffId, TaskEdit, Urgency};
use chrono::NaiveDate;
use mockable::Clock;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Request payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    urgency: Option<String>,
    due_date: Option<String>,
    assignee: Option<String>,
    created_by: Option<String>,
    task_type: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the urgency label, for example `"Very High"`.
    #[must_use]
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    /// Sets the due date as `YYYY-MM-DD`.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Assigns the task to a staff member at creation.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Records the creating staff member.
    #[must_use]
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Sets the classification tag.
    #[must_use]
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    /// Validates the request and builds the task draft. A blank assignee
    /// leaves the task in the global pool.
    pub(crate) fn into_new_task(self, clock: &impl Clock) -> TaskLifecycleResult<NewTask> {
        let mut draft = NewTask::new(&self.title)?
            .with_urgency(parse_urgency(self.urgency.as_deref())?)
            .with_task_type(self.task_type.as_deref().unwrap_or_default());
        if let Some(description) = self.description {
            draft = draft.with_description(description.trim());
        }
        if let Some(due_date) = parse_due_date(self.due_date.as_deref())? {
            draft = draft.with_due_date(due_date);
        }
        if let Some(created_by) = optional_staff(self.created_by)? {
            draft = draft.with_created_by(created_by);
        }
        if let Some(assignee) = optional_staff(self.assignee)? {
            draft = draft.assigned_to(assignee, clock);
        }
        Ok(draft)
    }
}

/// Request payload for editing whitelisted task attributes.
///
/// Only title, description, urgency, due date and task type can be edited;
/// lifecycle attributes change through their dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTaskRequest {
    title: Option<String>,
    description: Option<String>,
    urgency: Option<String>,
    due_date: Option<Option<String>>,
    task_type: Option<String>,
}

impl EditTaskRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the urgency label.
    #[must_use]
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }

    /// Replaces the due date, given as `YYYY-MM-DD`.
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(Some(due_date.into()));
        self
    }

    /// Removes the due date.
    #[must_use]
    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    /// Replaces the classification tag.
    #[must_use]
    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub(crate) fn into_edit(self) -> TaskLifecycleResult<TaskEdit> {
        let urgency = self
            .urgency
            .as_deref()
            .map(|label| parse_urgency(Some(label)))
            .transpose()?;
        let due_date = self
            .due_date
            .map(|date| date.as_deref().map(parse_required_date).transpose())
            .transpose()?;
        let task_type = match self.task_type {
            Some(tag) if tag.trim().is_empty() => {
                return Err(TaskLifecycleError::validation(
                    "task_type",
                    "task type must not be empty",
                ));
            }
            Some(tag) => Some(tag.trim().to_owned()),
            None => None,
        };
        if self
            .title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
        {
            return Err(TaskLifecycleError::validation(
                "title",
                "task title must not be empty",
            ));
        }
        let edit = TaskEdit {
            title: self.title,
            description: self.description.map(|text| text.trim().to_owned()),
            urgency,
            due_date,
            task_type,
        };
        if edit.is_empty() {
            return Err(TaskLifecycleError::validation(
                "fields",
                "no editable field supplied",
            ));
        }
        Ok(edit)
    }
}

/// Parses a caller-supplied urgency. Missing or blank input means the
/// default urgency; anything else must be a known label.
fn parse_urgency(label: Option<&str>) -> TaskLifecycleResult<Urgency> {
    label
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map_or_else(|| Ok(Urgency::default()), |text| {
            Urgency::try_from(text)
                .map_err(|err| TaskLifecycleError::validation("urgency", err.to_string()))
        })
}

fn parse_due_date(text: Option<&str>) -> TaskLifecycleResult<Option<NaiveDate>> {
    text.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_required_date)
        .transpose()
}

fn parse_required_date(text: &str) -> TaskLifecycleResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DUE_DATE_FORMAT).map_err(|err| {
        TaskLifecycleError::validation("due_date", format!("expected YYYY-MM-DD: {err}"))
    })
}

fn optional_staff(id: Option<String>) -> TaskLifecycleResult<Option<StaffId>> {
    Ok(id
        .filter(|value| !value.trim().is_empty())
        .map(StaffId::new)
        .transpose()?)
}
