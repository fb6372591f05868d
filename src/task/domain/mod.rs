//! Domain model for task lifecycle management.
//!
//! The task domain models the lifecycle state machine, claim ownership and
//! read-side dashboard bucketing while keeping all infrastructure concerns
//! outside of the domain boundary.

mod bucket;
mod error;
mod ids;
mod operation;
mod staff;
mod status;
mod task;
mod urgency;

pub use bucket::{StatusBucket, TaskBuckets, bucket_for_status, sort_bucket};
pub use error::{ParseTaskStatusError, ParseUrgencyError, TaskDomainError};
pub use ids::{StaffId, TaskId};
pub use operation::TaskOperation;
pub use staff::Staff;
pub use status::TaskStatus;
pub use task::{DEFAULT_TASK_TYPE, NewTask, PersistedTaskData, Task, TaskAttribute, TaskEdit};
pub use urgency::Urgency;
