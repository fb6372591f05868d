//! Claim race guard.
//!
//! The record store only promises per-record atomic writes, so two staff
//! claiming the same task can both pass a read-then-check, and a claim can
//! land on a task completed or flagged after it was read. The guard picks
//! how the claim write is issued.

use crate::task::{
    domain::TaskAttribute,
    mapping::fields::field_name,
    ports::{Record, RecordFields, RecordFilter, RecordRepository, RecordRepositoryResult},
};
use serde::{Deserialize, Serialize};

/// Strategy used to write a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimGuard {
    /// Check the assignee on the value read, then write unconditionally.
    /// Leaves a window between the read and the write.
    ReadVerifyWrite,
    /// Write only if the stored assignee is still empty and the stored
    /// status is the one that was read, in one repository call.
    #[default]
    ConditionalWrite,
}

impl ClaimGuard {
    /// Issues the claim write for the task read as `observed`.
    ///
    /// # Errors
    ///
    /// Propagates repository errors. Under [`ClaimGuard::ConditionalWrite`] a
    /// concurrent claim, completion or flag surfaces as
    /// [`RecordRepositoryError::PreconditionFailed`](crate::task::ports::RecordRepositoryError::PreconditionFailed).
    pub async fn write<R>(
        self,
        repository: &R,
        table: &str,
        observed: &Record,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record>
    where
        R: RecordRepository + ?Sized,
    {
        match self {
            Self::ReadVerifyWrite => repository.update(table, &observed.id, fields).await,
            Self::ConditionalWrite => {
                repository
                    .update_if(table, &observed.id, &claim_precondition(observed), fields)
                    .await
            }
        }
    }
}

/// Precondition of a conditional claim: the task is still unassigned and its
/// stored status is exactly what `observed` held.
#[must_use]
pub fn claim_precondition(observed: &Record) -> RecordFilter {
    let status = field_name(TaskAttribute::Status);
    let status_unchanged = observed
        .fields
        .get(status)
        .filter(|value| !value.is_null())
        .map_or_else(
            || RecordFilter::absent(status),
            |value| RecordFilter::equals(status, value.clone()),
        );
    RecordFilter::All(vec![
        RecordFilter::link_empty(field_name(TaskAttribute::Assignee)),
        status_unchanged,
    ])
}
