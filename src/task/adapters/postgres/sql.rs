//! Compilation of record queries and guarded updates to parameterised SQL.
//!
//! All values travel as bind parameters; field names are bound too, since
//! they come from callers. Semantics follow [`RecordFilter::matches`]:
//! a link matches on its first element, absent fields compare unequal, and
//! sort keys order missing values last using byte-wise text comparison.

use crate::task::ports::{RecordFields, RecordFilter, RecordQuery, SortDirection};
use serde_json::Value;

const COLUMNS: &str = "id, table_name, fields, created_at, updated_at";

/// Bind parameter of a compiled statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlBind {
    /// `text` parameter.
    Text(String),
    /// `jsonb` parameter.
    Jsonb(Value),
    /// `uuid` parameter.
    Uuid(uuid::Uuid),
    /// `bigint` parameter.
    BigInt(i64),
}

/// SQL text with its bind parameters, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlStatement {
    /// SQL text using `$n` placeholders.
    pub sql: String,
    /// Parameters; `binds[n - 1]` fills `$n`.
    pub binds: Vec<SqlBind>,
}

impl SqlStatement {
    fn bind(&mut self, value: SqlBind) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    fn predicate(&mut self, filter: &RecordFilter) -> String {
        match filter {
            RecordFilter::Equals { field, value } => {
                let name = self.bind(SqlBind::Text(field.clone()));
                let expected = self.bind(SqlBind::Jsonb(value.clone()));
                format!("(fields -> {name}) = {expected}")
            }
            RecordFilter::NotEquals { field, value } => {
                let name = self.bind(SqlBind::Text(field.clone()));
                let rejected = self.bind(SqlBind::Jsonb(value.clone()));
                format!("(fields -> {name}) IS DISTINCT FROM {rejected}")
            }
            RecordFilter::Absent { field } => {
                let name = self.bind(SqlBind::Text(field.clone()));
                format!("COALESCE(jsonb_typeof(fields -> {name}), 'null') = 'null'")
            }
            RecordFilter::LinkIs { field, id } => {
                let name = self.bind(SqlBind::Text(field.clone()));
                let linked = self.bind(SqlBind::Text(id.clone()));
                format!("{} = {linked}", first_link(&name))
            }
            RecordFilter::LinkEmpty { field } => {
                let name = self.bind(SqlBind::Text(field.clone()));
                format!("COALESCE({}, '') = ''", first_link(&name))
            }
            RecordFilter::All(filters) => self.join(filters, " AND ", "TRUE"),
            RecordFilter::Any(filters) => self.join(filters, " OR ", "FALSE"),
        }
    }

    fn join(&mut self, filters: &[RecordFilter], separator: &str, identity: &str) -> String {
        if filters.is_empty() {
            return identity.to_owned();
        }
        let parts: Vec<String> = filters
            .iter()
            .map(|filter| self.predicate(filter))
            .collect();
        format!("({})", parts.join(separator))
    }
}

/// First element of a link field as trimmed text, whether stored as a list
/// or as a bare value.
fn first_link(name: &str) -> String {
    format!(
        "btrim(CASE jsonb_typeof(fields -> {name}) \
         WHEN 'array' THEN fields -> {name} ->> 0 \
         ELSE fields ->> {name} END)"
    )
}

/// Compiles a page query. `limit` is the number of rows to fetch.
#[must_use]
pub fn select_page(
    table: &str,
    query: &RecordQuery,
    offset: i64,
    limit: Option<i64>,
) -> SqlStatement {
    let mut statement = SqlStatement::default();
    let table_param = statement.bind(SqlBind::Text(table.to_owned()));
    let mut sql = format!("SELECT {COLUMNS} FROM records WHERE table_name = {table_param}");
    if let Some(filter) = query.filter.as_ref() {
        let predicate = statement.predicate(filter);
        sql.push_str(&format!(" AND {predicate}"));
    }
    sql.push_str(" ORDER BY ");
    for key in &query.sort {
        let name = statement.bind(SqlBind::Text(key.field.clone()));
        let direction = match key.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        sql.push_str(&format!(
            "(fields ->> {name}) COLLATE \"C\" {direction} NULLS LAST, "
        ));
    }
    sql.push_str("created_at, id");
    if let Some(rows) = limit {
        let limit_param = statement.bind(SqlBind::BigInt(rows));
        sql.push_str(&format!(" LIMIT {limit_param}"));
    }
    let offset_param = statement.bind(SqlBind::BigInt(offset));
    sql.push_str(&format!(" OFFSET {offset_param}"));
    statement.sql = sql;
    statement
}

/// Compiles a partial field update, optionally guarded by a precondition
/// evaluated against the stored fields in the same statement.
#[must_use]
pub fn update_fields(
    table: &str,
    id: uuid::Uuid,
    fields: RecordFields,
    precondition: Option<&RecordFilter>,
) -> SqlStatement {
    let mut statement = SqlStatement::default();
    let patch = statement.bind(SqlBind::Jsonb(Value::Object(fields)));
    let table_param = statement.bind(SqlBind::Text(table.to_owned()));
    let id_param = statement.bind(SqlBind::Uuid(id));
    let mut sql = format!(
        "UPDATE records SET fields = fields || {patch}, updated_at = now() \
         WHERE table_name = {table_param} AND id = {id_param}"
    );
    if let Some(filter) = precondition {
        let predicate = statement.predicate(filter);
        sql.push_str(&format!(" AND {predicate}"));
    }
    sql.push_str(&format!(" RETURNING {COLUMNS}"));
    statement.sql = sql;
    statement
}
