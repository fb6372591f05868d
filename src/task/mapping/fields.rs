//! External field identifiers for task and staff records.

use crate::task::domain::TaskAttribute;

/// Storage shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Plain text.
    Text,
    /// Reference to another record; written as a list of ids.
    Link,
    /// RFC 3339 timestamp.
    Timestamp,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Task status label.
    Status,
    /// Urgency label.
    Urgency,
}

/// One row of the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Internal attribute.
    pub attribute: TaskAttribute,
    /// External field identifier.
    pub name: &'static str,
    /// Storage shape.
    pub kind: FieldKind,
}

const fn field(attribute: TaskAttribute, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        attribute,
        name,
        kind,
    }
}

const TITLE: FieldSpec = field(TaskAttribute::Title, "Task", FieldKind::Text);
const DESCRIPTION: FieldSpec = field(TaskAttribute::Description, "Description", FieldKind::Text);
const URGENCY: FieldSpec = field(TaskAttribute::Urgency, "Urgency", FieldKind::Urgency);
const DUE_DATE: FieldSpec = field(TaskAttribute::DueDate, "Due Date", FieldKind::Date);
const STATUS: FieldSpec = field(TaskAttribute::Status, "Status", FieldKind::Status);
const ASSIGNEE: FieldSpec = field(TaskAttribute::Assignee, "Assigned To", FieldKind::Link);
const CREATED_BY: FieldSpec = field(TaskAttribute::CreatedBy, "Created By", FieldKind::Link);
const CLAIMED_AT: FieldSpec = field(TaskAttribute::ClaimedAt, "Claimed At", FieldKind::Timestamp);
const COMPLETED_BY: FieldSpec = field(TaskAttribute::CompletedBy, "Completed By", FieldKind::Link);
const COMPLETED_AT: FieldSpec =
    field(TaskAttribute::CompletedAt, "Completed At", FieldKind::Timestamp);
const FLAGGED_REASON: FieldSpec =
    field(TaskAttribute::FlaggedReason, "Flagged Reason", FieldKind::Text);
const FLAGGED_BY: FieldSpec = field(TaskAttribute::FlaggedBy, "Flagged By", FieldKind::Link);
const FLAGGED_AT: FieldSpec = field(TaskAttribute::FlaggedAt, "Flagged At", FieldKind::Timestamp);
const FLAG_RESOLVED_BY: FieldSpec =
    field(TaskAttribute::FlagResolvedBy, "Flag Resolved By", FieldKind::Link);
const FLAG_RESOLVED_AT: FieldSpec =
    field(TaskAttribute::FlagResolvedAt, "Flag Resolved At", FieldKind::Timestamp);
const RESOLUTION_NOTE: FieldSpec =
    field(TaskAttribute::ResolutionNote, "Resolution Note", FieldKind::Text);
const TASK_TYPE: FieldSpec = field(TaskAttribute::TaskType, "Task Type", FieldKind::Text);

/// Every task attribute with its external field identifier.
pub const TASK_FIELDS: [FieldSpec; 17] = [
    TITLE,
    DESCRIPTION,
    URGENCY,
    DUE_DATE,
    STATUS,
    ASSIGNEE,
    CREATED_BY,
    CLAIMED_AT,
    COMPLETED_BY,
    COMPLETED_AT,
    FLAGGED_REASON,
    FLAGGED_BY,
    FLAGGED_AT,
    FLAG_RESOLVED_BY,
    FLAG_RESOLVED_AT,
    RESOLUTION_NOTE,
    TASK_TYPE,
];

/// Returns the mapping row for an attribute.
#[must_use]
pub const fn spec(attribute: TaskAttribute) -> FieldSpec {
    match attribute {
        TaskAttribute::Title => TITLE,
        TaskAttribute::Description => DESCRIPTION,
        TaskAttribute::Urgency => URGENCY,
        TaskAttribute::DueDate => DUE_DATE,
        TaskAttribute::Status => STATUS,
        TaskAttribute::Assignee => ASSIGNEE,
        TaskAttribute::CreatedBy => CREATED_BY,
        TaskAttribute::ClaimedAt => CLAIMED_AT,
        TaskAttribute::CompletedBy => COMPLETED_BY,
        TaskAttribute::CompletedAt => COMPLETED_AT,
        TaskAttribute::FlaggedReason => FLAGGED_REASON,
        TaskAttribute::FlaggedBy => FLAGGED_BY,
        TaskAttribute::FlaggedAt => FLAGGED_AT,
        TaskAttribute::FlagResolvedBy => FLAG_RESOLVED_BY,
        TaskAttribute::FlagResolvedAt => FLAG_RESOLVED_AT,
        TaskAttribute::ResolutionNote => RESOLUTION_NOTE,
        TaskAttribute::TaskType => TASK_TYPE,
    }
}

/// Returns the external field identifier for an attribute.
#[must_use]
pub const fn field_name(attribute: TaskAttribute) -> &'static str {
    spec(attribute).name
}

/// Staff display name field.
pub const STAFF_NAME: &str = "Name";

/// Staff administrator flag field.
pub const STAFF_IS_ADMIN: &str = "Is Admin";
