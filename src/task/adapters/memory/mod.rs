//! In-memory adapters for task lifecycle ports.

mod audit;
mod notification;
mod repository;

pub use audit::InMemoryAuditRecorder;
pub use notification::InMemoryNotificationOutbox;
pub use repository::InMemoryRecordRepository;
