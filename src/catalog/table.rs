//! Single-table CRUD engine.
//!
//! Generic select/insert/update/delete for one table. Every function takes any
//! [`Executor`], so composite handlers call the same code with `&mut tx` that the
//! fallback path calls with `&Database`.

use crate::db::{Database, Executor};
use crate::error::{DbError, DbResult};
use crate::models::{FieldMap, Row};
use crate::sql::Statement;
use serde_json::Value as JsonValue;

/// Run a fixed read statement.
pub async fn query<E: Executor>(mut exec: E, statement: &Statement) -> DbResult<Vec<Row>> {
    exec.fetch_all(statement).await
}

/// Run a fixed write statement.
pub async fn execute<E: Executor>(mut exec: E, statement: &Statement) -> DbResult<u64> {
    exec.execute(statement).await
}

/// Rows of `table` matching every `filter` equality; all rows when `filter` is empty.
pub async fn select<E: Executor>(mut exec: E, table: &str, filter: &FieldMap) -> DbResult<Vec<Row>> {
    exec.fetch_all(&Statement::select(table, filter)?).await
}

/// Insert one row. Refused when `fields` is empty.
pub async fn insert<E: Executor>(mut exec: E, table: &str, fields: &FieldMap) -> DbResult<u64> {
    exec.execute(&Statement::insert(table, fields)?).await
}

/// Update the row whose `id` is `id`. The id in `fields`, if any, is ignored.
pub async fn update<E: Executor>(
    mut exec: E,
    table: &str,
    id: &str,
    fields: &FieldMap,
) -> DbResult<u64> {
    if id.is_empty() {
        return Err(DbError::invalid_input(format!(
            "update of '{table}' requires an identifier"
        )));
    }
    exec.execute(&Statement::update_by_id(table, id, fields)?)
        .await
}

/// Update rows matching every `key` equality.
pub async fn update_where<E: Executor>(
    mut exec: E,
    table: &str,
    fields: &FieldMap,
    key: &FieldMap,
) -> DbResult<u64> {
    exec.execute(&Statement::update(table, fields, key)?).await
}

/// Delete rows matching every `filter` equality. Refused when `filter` is empty.
pub async fn delete<E: Executor>(mut exec: E, table: &str, filter: &FieldMap) -> DbResult<u64> {
    exec.execute(&Statement::delete(table, filter)?).await
}

/// Uniform capability every entity handler offers the dispatcher.
///
/// The provided methods are the single-table behavior on [`EntityHandler::table`];
/// composite handlers override the operations that span several tables.
#[allow(async_fn_in_trait)]
pub trait EntityHandler {
    /// Table the single-table fallback operates on.
    fn table(&self) -> &str;

    async fn select(&self, db: &Database, filter: &FieldMap) -> DbResult<Vec<Row>> {
        select(db, self.table(), filter).await
    }

    async fn insert(&self, db: &Database, fields: &FieldMap) -> DbResult<u64> {
        insert(db, self.table(), fields).await
    }

    async fn update(&self, db: &Database, id: &str, fields: &FieldMap) -> DbResult<u64> {
        update(db, self.table(), id, fields).await
    }

    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        delete(db, self.table(), filter).await
    }
}

/// Plain single-table entity: the field map is used verbatim.
#[derive(Debug, Clone)]
pub struct TableHandler {
    table: String,
}

impl TableHandler {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl EntityHandler for TableHandler {
    fn table(&self) -> &str {
        &self.table
    }
}

/// Identifier value of a key field, as text.
pub(crate) fn id_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
