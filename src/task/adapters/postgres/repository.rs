//! `PostgreSQL` repository implementation for record storage.

use super::{
    models::{NewRecordRow, RecordRow},
    schema::records,
    sql::{SqlBind, SqlStatement, select_page, update_fields},
};
use crate::task::ports::{
    PageCursor, Record, RecordFields, RecordFilter, RecordPage, RecordQuery, RecordRepository,
    RecordRepositoryError, RecordRepositoryResult,
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{BigInt, Jsonb, Text};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by record adapters.
pub type RecordPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`RecordRepositoryError::Persistence`] when the pool cannot
/// establish its connections.
pub fn build_pool(database_url: &str, max_size: u32) -> RecordRepositoryResult<RecordPgPool> {
    Pool::builder()
        .max_size(max_size)
        .build(ConnectionManager::new(database_url))
        .map_err(RecordRepositoryError::persistence)
}

/// `PostgreSQL`-backed record repository.
#[derive(Debug, Clone)]
pub struct PostgresRecordRepository {
    pool: RecordPgPool,
}

impl PostgresRecordRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RecordPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RecordRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RecordRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RecordRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RecordRepositoryError::persistence)?
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn find(&self, table: &str, id: &str) -> RecordRepositoryResult<Option<Record>> {
        let Ok(record_id) = uuid::Uuid::parse_str(id) else {
            return Ok(None);
        };
        let table_name = table.to_owned();
        self.run_blocking(move |connection| {
            let row = find_row(connection, &table_name, record_id)?;
            Ok(row.map(row_to_record))
        })
        .await
    }

    async fn query(&self, table: &str, query: &RecordQuery) -> RecordRepositoryResult<RecordPage> {
        let offset = match query.cursor.as_ref() {
            Some(cursor) => cursor
                .offset()
                .ok_or_else(|| RecordRepositoryError::InvalidCursor(cursor.to_string()))?,
            None => 0,
        };
        let page_size = query.page_size;
        let fetch = page_size
            .map(|size| to_i64(size.saturating_add(1)))
            .transpose()?;
        let statement = select_page(table, query, to_i64(offset)?, fetch);
        self.run_blocking(move |connection| {
            let mut rows = bound(statement)
                .load::<RecordRow>(connection)
                .map_err(RecordRepositoryError::persistence)?;
            let has_more = page_size.is_some_and(|size| rows.len() > size);
            if let Some(size) = page_size {
                rows.truncate(size);
            }
            let next_cursor =
                has_more.then(|| PageCursor::from_offset(offset.saturating_add(rows.len())));
            Ok(RecordPage {
                records: rows.into_iter().map(row_to_record).collect(),
                next_cursor,
            })
        })
        .await
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        let record_id = parse_id(table, id)?;
        let statement = update_fields(table, record_id, fields, None);
        let table_name = table.to_owned();
        self.run_blocking(move |connection| {
            bound(statement)
                .get_result::<RecordRow>(connection)
                .optional()
                .map_err(RecordRepositoryError::persistence)?
                .map(row_to_record)
                .ok_or_else(|| RecordRepositoryError::not_found(&table_name, &record_id.to_string()))
        })
        .await
    }

    async fn create(&self, table: &str, fields: RecordFields) -> RecordRepositoryResult<Record> {
        let new_row = NewRecordRow {
            id: uuid::Uuid::new_v4(),
            table_name: table.to_owned(),
            fields: Value::Object(fields),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(records::table)
                .values(&new_row)
                .returning(RecordRow::as_returning())
                .get_result::<RecordRow>(connection)
                .map(row_to_record)
                .map_err(RecordRepositoryError::persistence)
        })
        .await
    }

    async fn delete(&self, table: &str, id: &str) -> RecordRepositoryResult<()> {
        let Ok(record_id) = uuid::Uuid::parse_str(id) else {
            return Ok(());
        };
        let table_name = table.to_owned();
        self.run_blocking(move |connection| {
            diesel::delete(
                records::table
                    .filter(records::table_name.eq(&table_name))
                    .filter(records::id.eq(record_id)),
            )
            .execute(connection)
            .map_err(RecordRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_if(
        &self,
        table: &str,
        id: &str,
        precondition: &RecordFilter,
        fields: RecordFields,
    ) -> RecordRepositoryResult<Record> {
        let record_id = parse_id(table, id)?;
        let statement = update_fields(table, record_id, fields, Some(precondition));
        let table_name = table.to_owned();
        self.run_blocking(move |connection| {
            let updated = bound(statement)
                .get_result::<RecordRow>(connection)
                .optional()
                .map_err(RecordRepositoryError::persistence)?;
            if let Some(row) = updated {
                return Ok(row_to_record(row));
            }
            // Nothing matched: tell a missing record from a failed guard.
            let id_text = record_id.to_string();
            if find_row(connection, &table_name, record_id)?.is_some() {
                return Err(RecordRepositoryError::PreconditionFailed {
                    table: table_name,
                    id: id_text,
                });
            }
            Err(RecordRepositoryError::not_found(&table_name, &id_text))
        })
        .await
    }
}

fn find_row(
    connection: &mut PgConnection,
    table_name: &str,
    record_id: uuid::Uuid,
) -> RecordRepositoryResult<Option<RecordRow>> {
    records::table
        .filter(records::table_name.eq(table_name))
        .filter(records::id.eq(record_id))
        .select(RecordRow::as_select())
        .first::<RecordRow>(connection)
        .optional()
        .map_err(RecordRepositoryError::persistence)
}

fn bound(statement: SqlStatement) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let SqlStatement { sql, binds } = statement;
    binds
        .into_iter()
        .fold(diesel::sql_query(sql).into_boxed::<Pg>(), |query, bind| {
            match bind {
                SqlBind::Text(value) => query.bind::<Text, _>(value),
                SqlBind::Jsonb(value) => query.bind::<Jsonb, _>(value),
                SqlBind::Uuid(value) => query.bind::<diesel::sql_types::Uuid, _>(value),
                SqlBind::BigInt(value) => query.bind::<BigInt, _>(value),
            }
        })
}

fn row_to_record(row: RecordRow) -> Record {
    let fields = match row.fields {
        Value::Object(map) => map,
        _ => RecordFields::new(),
    };
    Record::new(row.id.to_string(), fields)
}

fn parse_id(table: &str, id: &str) -> RecordRepositoryResult<uuid::Uuid> {
    uuid::Uuid::parse_str(id).map_err(|_| RecordRepositoryError::not_found(table, id))
}

fn to_i64(value: usize) -> RecordRepositoryResult<i64> {
    i64::try_from(value).map_err(RecordRepositoryError::persistence)
}
