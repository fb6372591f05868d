//! Diesel row models for record persistence.

use super::schema::records;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecordRow {
    /// Record identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub id: uuid::Uuid,
    /// Logical table name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub table_name: String,
    /// Field map.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub fields: Value,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

/// Insert model for records. Timestamps use column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = records)]
pub struct NewRecordRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Logical table name.
    pub table_name: String,
    /// Field map.
    pub fields: Value,
}
