//! Conversion between repository records and task/staff values.
//!
//! Decoding is tolerant: malformed optional values are dropped with a
//! warning instead of failing the read, and unknown status labels decode as
//! in progress. Encoding only emits the attributes a transition touched.

use super::{
    fields::{STAFF_IS_ADMIN, STAFF_NAME, field_name},
    link::{first_link, link_value},
};
use crate::task::{
    domain::{
        DEFAULT_TASK_TYPE, NewTask, PersistedTaskData, Staff, StaffId, Task, TaskAttribute,
        TaskDomainError, TaskId, TaskStatus, Urgency,
    },
    ports::{Record, RecordFields},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors returned while decoding records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldMappingError {
    /// The record id is not a valid identifier.
    #[error("record has an invalid id: {0}")]
    InvalidId(#[from] TaskDomainError),
}

/// Decodes a task record.
///
/// # Errors
///
/// Returns [`FieldMappingError::InvalidId`] when the record id is blank.
pub fn decode_task(record: &Record) -> Result<Task, FieldMappingError> {
    let reader = FieldReader {
        record_id: &record.id,
        fields: &record.fields,
    };
    let task_type = reader.text(TaskAttribute::TaskType);
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(record.id.as_str())?,
        title: reader.text(TaskAttribute::Title),
        description: reader.text(TaskAttribute::Description),
        urgency: reader.urgency(),
        due_date: reader.date(TaskAttribute::DueDate),
        status: reader.status(),
        assignee: reader.link(TaskAttribute::Assignee),
        created_by: reader.link(TaskAttribute::CreatedBy),
        claimed_at: reader.timestamp(TaskAttribute::ClaimedAt),
        completed_by: reader.link(TaskAttribute::CompletedBy),
        completed_at: reader.timestamp(TaskAttribute::CompletedAt),
        flagged_reason: reader.text(TaskAttribute::FlaggedReason),
        flagged_by: reader.link(TaskAttribute::FlaggedBy),
        flagged_at: reader.timestamp(TaskAttribute::FlaggedAt),
        flag_resolved_by: reader.link(TaskAttribute::FlagResolvedBy),
        flag_resolved_at: reader.timestamp(TaskAttribute::FlagResolvedAt),
        resolution_note: reader.text(TaskAttribute::ResolutionNote),
        task_type: if task_type.is_empty() {
            DEFAULT_TASK_TYPE.to_owned()
        } else {
            task_type
        },
    }))
}

/// Decodes a staff record.
///
/// # Errors
///
/// Returns [`FieldMappingError::InvalidId`] when the record id is blank.
pub fn decode_staff(record: &Record) -> Result<Staff, FieldMappingError> {
    let id = StaffId::new(record.id.as_str())?;
    let name = record
        .fields
        .get(STAFF_NAME)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let is_admin = record.fields.get(STAFF_IS_ADMIN).is_some_and(truthy);
    Ok(Staff::new(id, name, is_admin))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_i64().is_some_and(|n| n != 0),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1" | "checked"
        ),
        _ => false,
    }
}

/// Encodes the given attributes of a task for a partial update.
#[must_use]
pub fn encode_attributes(task: &Task, attributes: &[TaskAttribute]) -> RecordFields {
    attributes
        .iter()
        .map(|attribute| (field_name(*attribute).to_owned(), attribute_value(task, *attribute)))
        .collect()
}

/// Encodes a new task for creation. Status is always in progress.
#[must_use]
pub fn encode_new_task(task: &NewTask) -> RecordFields {
    let mut fields = RecordFields::new();
    let mut put = |attribute: TaskAttribute, value: Value| {
        fields.insert(field_name(attribute).to_owned(), value);
    };
    put(TaskAttribute::Title, Value::from(task.title()));
    put(TaskAttribute::Description, Value::from(task.description()));
    put(TaskAttribute::Urgency, urgency_value(task.urgency()));
    put(TaskAttribute::DueDate, date_value(task.due_date()));
    put(
        TaskAttribute::Status,
        Value::from(TaskStatus::InProgress.as_str()),
    );
    put(
        TaskAttribute::Assignee,
        link_value(task.assignee().map(StaffId::as_str)),
    );
    put(
        TaskAttribute::CreatedBy,
        link_value(task.created_by().map(StaffId::as_str)),
    );
    put(TaskAttribute::ClaimedAt, timestamp_value(task.claimed_at()));
    put(TaskAttribute::TaskType, Value::from(task.task_type()));
    fields
}

fn attribute_value(task: &Task, attribute: TaskAttribute) -> Value {
    let staff = |id: Option<&StaffId>| link_value(id.map(StaffId::as_str));
    match attribute {
        TaskAttribute::Title => Value::from(task.title()),
        TaskAttribute::Description => Value::from(task.description()),
        TaskAttribute::Urgency => urgency_value(task.urgency()),
        TaskAttribute::DueDate => date_value(task.due_date()),
        TaskAttribute::Status => Value::from(task.status().as_str()),
        TaskAttribute::Assignee => staff(task.assignee()),
        TaskAttribute::CreatedBy => staff(task.created_by()),
        TaskAttribute::ClaimedAt => timestamp_value(task.claimed_at()),
        TaskAttribute::CompletedBy => staff(task.completed_by()),
        TaskAttribute::CompletedAt => timestamp_value(task.completed_at()),
        TaskAttribute::FlaggedReason => Value::from(task.flagged_reason()),
        TaskAttribute::FlaggedBy => staff(task.flagged_by()),
        TaskAttribute::FlaggedAt => timestamp_value(task.flagged_at()),
        TaskAttribute::FlagResolvedBy => staff(task.flag_resolved_by()),
        TaskAttribute::FlagResolvedAt => timestamp_value(task.flag_resolved_at()),
        TaskAttribute::ResolutionNote => Value::from(task.resolution_note()),
        TaskAttribute::TaskType => Value::from(task.task_type()),
    }
}

fn urgency_value(urgency: Urgency) -> Value {
    urgency.as_str().map_or(Value::Null, Value::from)
}

fn date_value(date: Option<NaiveDate>) -> Value {
    date.map_or(Value::Null, |d| Value::from(d.format(DATE_FORMAT).to_string()))
}

fn timestamp_value(timestamp: Option<DateTime<Utc>>) -> Value {
    timestamp.map_or(Value::Null, |t| {
        Value::from(t.to_rfc3339_opts(SecondsFormat::Millis, true))
    })
}

/// Typed accessors over one record's fields.
struct FieldReader<'a> {
    record_id: &'a str,
    fields: &'a RecordFields,
}

impl FieldReader<'_> {
    fn raw(&self, attribute: TaskAttribute) -> Option<&Value> {
        self.fields.get(field_name(attribute))
    }

    fn raw_text(&self, attribute: TaskAttribute) -> Option<&str> {
        self.raw(attribute)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    fn text(&self, attribute: TaskAttribute) -> String {
        self.raw_text(attribute).unwrap_or_default().to_owned()
    }

    fn link(&self, attribute: TaskAttribute) -> Option<StaffId> {
        first_link(self.raw(attribute)).and_then(|id| StaffId::new(id).ok())
    }

    fn urgency(&self) -> Urgency {
        self.raw_text(TaskAttribute::Urgency)
            .map_or(Urgency::Unknown, Urgency::from_storage)
    }

    fn status(&self) -> TaskStatus {
        let Some(label) = self.raw_text(TaskAttribute::Status) else {
            return TaskStatus::InProgress;
        };
        TaskStatus::try_from(label).unwrap_or_else(|err| {
            warn!(
                record_id = self.record_id,
                %err,
                "unrecognized task status; reading as in progress"
            );
            TaskStatus::InProgress
        })
    }

    fn date(&self, attribute: TaskAttribute) -> Option<NaiveDate> {
        let text = self.raw_text(attribute)?;
        let parsed = NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|t| t.with_timezone(&Utc).date_naive())
            });
        if parsed.is_none() {
            warn!(
                record_id = self.record_id,
                field = field_name(attribute),
                value = text,
                "ignoring malformed date"
            );
        }
        parsed
    }

    fn timestamp(&self, attribute: TaskAttribute) -> Option<DateTime<Utc>> {
        let text = self.raw_text(attribute)?;
        let parsed = DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc));
        if parsed.is_none() {
            warn!(
                record_id = self.record_id,
                field = field_name(attribute),
                value = text,
                "ignoring malformed timestamp"
            );
        }
        parsed
    }
}
