//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod audit;
pub mod link;
pub mod notification;
pub mod query;
pub mod repository;

pub use audit::{AuditError, AuditEvent, AuditRecorder, AuditResult, AuditStatus};
pub use notification::{
    Notification, NotificationDispatcher, NotificationError, NotificationResult, Severity,
};
pub use query::{PageCursor, RecordFilter, RecordPage, RecordQuery, RecordSort, SortDirection};
pub use repository::{
    Record, RecordFields, RecordRepository, RecordRepositoryError, RecordRepositoryResult,
};
