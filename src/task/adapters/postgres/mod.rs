//! `PostgreSQL` adapter for record persistence.
//!
//! Every logical table lives in one `records` table as a `jsonb` field map.
//! Filters compile to parameterised SQL over that map, see [`sql`].

mod models;
mod repository;
mod schema;
pub mod sql;

pub use repository::{PostgresRecordRepository, RecordPgPool, build_pool};
