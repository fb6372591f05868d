//! Query, filter and pagination types shared by record repository adapters.
//!
//! Filters are evaluated against raw record fields. Link comparisons use the
//! tolerant read rule: a link value may be a bare id or a list, and only its
//! first element is considered.

use super::{RecordFields, link::first_link};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Predicate over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    /// Field holds exactly `value`.
    Equals {
        /// External field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field is absent or holds anything other than `value`.
    NotEquals {
        /// External field name.
        field: String,
        /// Rejected value.
        value: Value,
    },
    /// Field is absent or null.
    Absent {
        /// External field name.
        field: String,
    },
    /// Link field's first element is `id`.
    LinkIs {
        /// External field name.
        field: String,
        /// Expected linked id.
        id: String,
    },
    /// Link field is absent, null, blank or an empty list.
    LinkEmpty {
        /// External field name.
        field: String,
    },
    /// Every inner filter matches.
    All(Vec<RecordFilter>),
    /// At least one inner filter matches.
    Any(Vec<RecordFilter>),
}

impl RecordFilter {
    /// Builds an [`RecordFilter::Equals`] filter.
    #[must_use]
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    /// Builds a [`RecordFilter::NotEquals`] filter.
    #[must_use]
    pub fn not_equals(field: &str, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    /// Builds a [`RecordFilter::Absent`] filter.
    #[must_use]
    pub fn absent(field: &str) -> Self {
        Self::Absent {
            field: field.to_owned(),
        }
    }

    /// Builds a [`RecordFilter::LinkIs`] filter.
    #[must_use]
    pub fn link_is(field: &str, id: &str) -> Self {
        Self::LinkIs {
            field: field.to_owned(),
            id: id.to_owned(),
        }
    }

    /// Builds a [`RecordFilter::LinkEmpty`] filter.
    #[must_use]
    pub fn link_empty(field: &str) -> Self {
        Self::LinkEmpty {
            field: field.to_owned(),
        }
    }

    /// Evaluates the filter against record fields.
    #[must_use]
    pub fn matches(&self, fields: &RecordFields) -> bool {
        match self {
            Self::Equals { field, value } => fields.get(field) == Some(value),
            Self::NotEquals { field, value } => fields.get(field) != Some(value),
            Self::Absent { field } => fields.get(field).is_none_or(Value::is_null),
            Self::LinkIs { field, id } => {
                first_link(fields.get(field)).as_deref() == Some(id.as_str())
            }
            Self::LinkEmpty { field } => first_link(fields.get(field)).is_none(),
            Self::All(filters) => filters.iter().all(|filter| filter.matches(fields)),
            Self::Any(filters) => filters.iter().any(|filter| filter.matches(fields)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first; missing values last.
    #[default]
    Ascending,
    /// Largest first; missing values last.
    Descending,
}

/// Sort key over a record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSort {
    /// External field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl RecordSort {
    /// Ascending sort on `field`.
    #[must_use]
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.to_owned(),
            direction: SortDirection::Ascending,
        }
    }

    /// Compares two records by this key. Missing or null values sort last in
    /// either direction.
    #[must_use]
    pub fn compare(&self, left: &RecordFields, right: &RecordFields) -> Ordering {
        let lhs = sort_text(left.get(&self.field));
        let rhs = sort_text(right.get(&self.field));
        match (lhs, rhs) {
            (Some(l), Some(r)) => match self.direction {
                SortDirection::Ascending => l.cmp(&r),
                SortDirection::Descending => r.cmp(&l),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Text form of a field for ordering, matching `fields ->> 'name'` in SQL.
fn sort_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Opaque continuation token returned with a page of records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    /// Wraps a cursor received from a client.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates a cursor pointing at a row offset.
    #[must_use]
    pub fn from_offset(offset: usize) -> Self {
        Self(offset.to_string())
    }

    /// Decodes the row offset, or `None` if the cursor is malformed.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.0.parse().ok()
    }

    /// Returns the cursor text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query over one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Optional filter.
    pub filter: Option<RecordFilter>,
    /// Sort keys applied in order; creation order breaks ties.
    pub sort: Vec<RecordSort>,
    /// Maximum number of records to return.
    pub page_size: Option<usize>,
    /// Continuation token from a previous page.
    pub cursor: Option<PageCursor>,
}

impl RecordQuery {
    /// Creates an unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    #[must_use]
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Appends a sort key.
    #[must_use]
    pub fn sorted_by(mut self, sort: RecordSort) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the continuation cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<PageCursor>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// A page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    /// Records on this page.
    pub records: Vec<super::Record>,
    /// Cursor for the following page, if more records exist.
    pub next_cursor: Option<PageCursor>,
}
