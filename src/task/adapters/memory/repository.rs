//! In-memory record repository for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::ports::{
    PageCursor, Record, RecordFields, RecordFilter, RecordPage, RecordQuery, RecordRepository,
    RecordRepositoryError, RecordRepositoryResult,
};

/// Thread-safe in-memory record repository.
///
/// Records keep their insertion order, which breaks ties between equal sort
/// keys. Cursors are row offsets into the filtered, sorted result.
/// [`RecordRepository::update_if`] is atomic: the precondition is checked
/// and the write applied under one write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordRepository {
    state: Arc<RwLock<InMemoryRecordState>>,
}

#[derive(Debug, Default)]
struct InMemoryRecordState {
    tables: HashMap<String, HashMap<String, StoredRecord>>,
    next_sequence: u64,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    sequence: u64,
    fields: RecordFields,
}

impl InMemoryRecordState {
    fn insert(&mut self, table: &str, id: String, fields: RecordFields) -> Record {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.tables.entry(table.to_owned()).or_default().insert(
            id.clone(),
            StoredRecord {
                sequence,
                fields: fields.clone(),
            },
        );
        Record::new(id, fields)
    }

    fn get_mut(&mut self, table: &str, id: &str) -> RecordRepositoryResult<&mut StoredRecord> {
        self.tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
            .ok_or_else(|| RecordRepositoryError::not_found(table, id))
    }
}

impl InMemoryRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record under a caller-chosen id, replacing any record with
    /// the same id. Used to seed staff directories and fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn seed(&self, table: &str, record: Record) -> RecordRepositoryResult<()> {
        let mut state = self.write()?;
        state.insert(table, record.id, record.fields);
        Ok(())
    }

    /// Number of records stored in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn count(&self, table: &str) -> RecordRepositoryResult<usize> {
        let state = self.read()?;
        Ok(state.tables.get(table).map_or(0, HashMap::len))
    }

    fn read(&self) -> RecordRepositoryResult<RwLockReadGuard<'_, InMemoryRecordState>> {
        self.state.read().map_err(|err| {
            RecordRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> RecordRepositoryResult<RwLockWriteGuard<'_, InMemoryRecordState>> {
        self.state.write().map_err(|err| {
            RecordRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn merge(stored: &mut StoredRecord, fields: RecordFields) {
    for (name, value) in fields {
        stored.fields.insert(name, value);
    }
}

fn page_of(
    mut rows: Vec<(String, StoredRecord)>,
    query: &RecordQuery,
) -> RecordRepositoryResult<RecordPage> {
    let offset = match query.cursor.as_ref() {
        Some(cursor) => cursor
            .offset()
            .ok_or_else(|| RecordRepositoryError::InvalidCursor(cursor.to_string()))?,
        None => 0,
    };
    rows.sort_by(|(_, left), (_, right)| {
        query
            .sort
            .iter()
            .map(|key| key.compare(&left.fields, &right.fields))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| left.sequence.cmp(&right.sequence))
    });
    let total = rows.len();
    let limit = query.page_size.unwrap_or(total);
    let records: Vec<Record> = rows
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(id, stored)| Record::new(id, stored.fields))
        .collect();
    let consumed = offset.saturating_add(records.len());
    let next_cursor = (consumed < total).then(|| PageCursor::from_offset(consumed));
    Ok(RecordPage {
        records,
        next_cursor,
    })
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn find(&self, table: &str, id: &str) -> RecordRepositoryResult<Option<Record>> {
        let state = self.read()?;
        Ok(state
            .tables
            .get(table)
            .and_then(|rows| rows.get(id))
            .map(|stored| Record::new(id, stored.fields.clone())))
    }

    async fn query(&self, table: &str, query: &RecordQuery) -> RecordRepositoryResult<RecordPage> {
        let rows: Vec<(String, StoredRecord)> = {
            let state = self.read()?;
            state
                .tables
                .get(table)
                .map(|stored_rows| {
                    stored_rows
                        .iter()
                        .filter(|(_, stored)| {
                            query
                                .filter
                                .as_ref()
                                .is_none_or(|filter| filter.matches(&stored.fields))
                        })
                        .map(|(id, stored)| (id.clone(), stored.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };
        page_of(rows, query)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        let mut state = self.write()?;
        let stored = state.get_mut(table, id)?;
        merge(stored, fields);
        Ok(Record::new(id, stored.fields.clone()))
    }

    async fn create(&self, table: &str, fields: RecordFields) -> RecordRepositoryResult<Record> {
        let mut state = self.write()?;
        let id = format!("rec{}", uuid::Uuid::new_v4().simple());
        Ok(state.insert(table, id, fields))
    }

    async fn delete(&self, table: &str, id: &str) -> RecordRepositoryResult<()> {
        let mut state = self.write()?;
        if let Some(rows) = state.tables.get_mut(table) {
            rows.remove(id);
        }
        Ok(())
    }

    async fn update_if(
        &self,
        table: &str,
        id: &str,
        precondition: &RecordFilter,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        let mut state = self.write()?;
        let stored = state.get_mut(table, id)?;
        if !precondition.matches(&stored.fields) {
            return Err(RecordRepositoryError::PreconditionFailed {
                table: table.to_owned(),
                id: id.to_owned(),
            });
        }
        merge(stored, fields);
        Ok(Record::new(id, stored.fields.clone()))
    }
}
