//! Record repository port: the external store of typed records addressed by
//! table name and record id.
//!
//! The store guarantees per-record atomic field updates and nothing more: no
//! multi-record transactions and, by default, no compare-and-swap.
//! [`RecordRepository::update_if`] is the extension point for adapters that
//! can apply a write conditionally in one atomic step.

use super::{RecordFilter, RecordPage, RecordQuery};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Field map of a stored record, keyed by external field name.
pub type RecordFields = Map<String, Value>;

/// Result type for record repository operations.
pub type RecordRepositoryResult<T> = Result<T, RecordRepositoryError>;

/// A stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Opaque identifier assigned by the repository.
    pub id: String,
    /// Field values.
    pub fields: RecordFields,
}

impl Record {
    /// Creates a record value.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: RecordFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Record persistence contract.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Finds a record by id. Returns `None` when it does not exist.
    async fn find(&self, table: &str, id: &str) -> RecordRepositoryResult<Option<Record>>;

    /// Returns one page of records matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::InvalidCursor`] for a cursor this
    /// repository did not issue.
    async fn query(&self, table: &str, query: &RecordQuery) -> RecordRepositoryResult<RecordPage>;

    /// Overwrites the given fields of a record and returns the stored result.
    /// Fields not present in `fields` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::NotFound`] when the record does not
    /// exist.
    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record>;

    /// Creates a record and returns it with its assigned id.
    async fn create(&self, table: &str, fields: RecordFields) -> RecordRepositoryResult<Record>;

    /// Deletes a record. Deleting an absent record succeeds.
    async fn delete(&self, table: &str, id: &str) -> RecordRepositoryResult<()>;

    /// Overwrites fields only if the stored record still matches
    /// `precondition`.
    ///
    /// The default implementation re-reads the record, checks the
    /// precondition and then calls [`RecordRepository::update`]. That is not
    /// atomic: a concurrent writer can still slip in between the check and
    /// the write. Adapters that can express a guarded write natively should
    /// override this method.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::PreconditionFailed`] when the stored
    /// record no longer matches and [`RecordRepositoryError::NotFound`] when
    /// it does not exist.
    async fn update_if(
        &self,
        table: &str,
        id: &str,
        precondition: &RecordFilter,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        let current = self
            .find(table, id)
            .await?
            .ok_or_else(|| RecordRepositoryError::not_found(table, id))?;
        if !precondition.matches(&current.fields) {
            return Err(RecordRepositoryError::PreconditionFailed {
                table: table.to_owned(),
                id: id.to_owned(),
            });
        }
        self.update(table, id, fields).await
    }
}

/// Errors returned by record repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RecordRepositoryError {
    /// The record does not exist.
    #[error("record {id} not found in {table}")]
    NotFound {
        /// Table name.
        table: String,
        /// Record id.
        id: String,
    },

    /// A conditional write found the record changed.
    #[error("record {id} in {table} no longer matches the expected state")]
    PreconditionFailed {
        /// Table name.
        table: String,
        /// Record id.
        id: String,
    },

    /// The pagination cursor was not issued by this repository.
    #[error("invalid page cursor: {0}")]
    InvalidCursor(String),

    /// The call did not complete in time.
    #[error("repository call timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RecordRepositoryError {
    /// Builds a [`RecordRepositoryError::NotFound`] error.
    #[must_use]
    pub fn not_found(table: &str, id: &str) -> Self {
        Self::NotFound {
            table: table.to_owned(),
            id: id.to_owned(),
        }
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
