//! Read-side grouping of tasks for dashboards.
//!
//! Bucketing consumes the normalized status key produced by
//! [`Task::display_status`]. Unrecognized keys fall back to
//! [`StatusBucket::Upcoming`]; that permissive default is relied on by
//! dashboards and must not be tightened silently.

use super::{Task, TaskStatus, status::normalize_key};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Dashboard grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    /// Due today, in progress, or anything unrecognized.
    Upcoming,
    /// Past its due date.
    Overdue,
    /// Blocked pending review.
    Flagged,
}

/// Maps a status key to its bucket.
///
/// # Examples
///
/// ```rust
/// use hireflow::task::domain::{StatusBucket, bucket_for_status};
///
/// assert_eq!(bucket_for_status(" Flagged "), StatusBucket::Flagged);
/// assert_eq!(bucket_for_status("awaiting-docs"), StatusBucket::Upcoming);
/// ```
#[must_use]
pub fn bucket_for_status(status: &str) -> StatusBucket {
    match normalize_key(status).as_str() {
        "overdue" => StatusBucket::Overdue,
        "flagged" => StatusBucket::Flagged,
        _ => StatusBucket::Upcoming,
    }
}

/// Sorts a bucket by urgency rank, then due date with undated tasks last.
///
/// The sort is stable, so tasks that compare equal keep repository order.
pub fn sort_bucket(tasks: &mut [Task]) {
    tasks.sort_by(compare_for_dashboard);
}

fn compare_for_dashboard(left: &Task, right: &Task) -> Ordering {
    left.urgency()
        .rank()
        .cmp(&right.urgency().rank())
        .then_with(|| compare_due_dates(left.due_date(), right.due_date()))
}

fn compare_due_dates(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Tasks grouped for a dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBuckets {
    /// Tasks due today, in progress, or with unrecognized status.
    pub upcoming: Vec<Task>,
    /// Tasks past their due date.
    pub overdue: Vec<Task>,
    /// Flagged tasks.
    pub flagged: Vec<Task>,
    /// Cursor for the next repository page, if any.
    pub next_cursor: Option<String>,
}

impl TaskBuckets {
    /// Groups and sorts tasks. Completed tasks are not listed in any bucket.
    #[must_use]
    pub fn from_tasks(
        tasks: impl IntoIterator<Item = Task>,
        today: NaiveDate,
        next_cursor: Option<String>,
    ) -> Self {
        let mut buckets = Self {
            next_cursor,
            ..Self::default()
        };
        for task in tasks {
            if task.status() == TaskStatus::Completed {
                continue;
            }
            match bucket_for_status(task.display_status(today)) {
                StatusBucket::Upcoming => buckets.upcoming.push(task),
                StatusBucket::Overdue => buckets.overdue.push(task),
                StatusBucket::Flagged => buckets.flagged.push(task),
            }
        }
        sort_bucket(&mut buckets.upcoming);
        sort_bucket(&mut buckets.overdue);
        sort_bucket(&mut buckets.flagged);
        buckets
    }

    /// Returns the bucket a task id was placed in, if any.
    #[must_use]
    pub fn bucket_of(&self, task: &Task) -> Option<StatusBucket> {
        let contains = |bucket: &[Task]| bucket.iter().any(|t| t.id() == task.id());
        if contains(&self.upcoming) {
            return Some(StatusBucket::Upcoming);
        }
        if contains(&self.overdue) {
            return Some(StatusBucket::Overdue);
        }
        if contains(&self.flagged) {
            return Some(StatusBucket::Flagged);
        }
        None
    }

    /// Total number of listed tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.overdue.len() + self.flagged.len()
    }

    /// Returns `true` when no task is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
