//! Copies (`exemplaire`), keyed by document id and copy number.

use crate::catalog::projection;
use crate::catalog::table::{self, EntityHandler};
use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::models::{FieldMap, Row};
use crate::sql::Statement;
use serde_json::Value as JsonValue;
use tracing::info;

const COPY_TABLE: &str = "exemplaire";
const CONDITION_COLUMN: &str = "idEtat";

const COPIES_OF_DOCUMENT: &str = "SELECT e.id, e.numero, e.dateAchat, e.photo, e.idEtat, et.libelle AS libelleEtat \
     FROM exemplaire e \
     JOIN etat et ON e.idEtat = et.id \
     WHERE e.id = :id \
     ORDER BY e.dateAchat DESC";

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyHandler;

impl CopyHandler {
    fn copy_key(id: JsonValue, numero: &JsonValue) -> FieldMap {
        let mut key = projection::key("id", id);
        key.insert("numero".to_string(), numero.clone());
        key
    }
}

impl EntityHandler for CopyHandler {
    fn table(&self) -> &str {
        COPY_TABLE
    }

    /// Copies of one document with their condition label, most recent purchase first.
    ///
    /// A filter without `id` is refused rather than listing every copy.
    async fn select(&self, db: &Database, filter: &FieldMap) -> DbResult<Vec<Row>> {
        let id = projection::require(filter, "id", "copy listing")?;
        let statement = Statement::new(COPIES_OF_DOCUMENT, projection::key("id", id.clone()));
        table::query(db, &statement).await
    }

    /// Change the condition state of the copy (`id`, `numero`). No other column is touched.
    async fn update(&self, db: &Database, id: &str, fields: &FieldMap) -> DbResult<u64> {
        if id.is_empty() {
            return Err(DbError::invalid_input("copy update requires an identifier"));
        }
        let numero = projection::require(fields, "numero", "copy update")?;
        let condition = projection::require(fields, CONDITION_COLUMN, "copy update")?;

        let key = Self::copy_key(JsonValue::String(id.to_string()), numero);
        let changes = projection::key(CONDITION_COLUMN, condition.clone());
        table::update_where(db, COPY_TABLE, &changes, &key).await
    }

    /// Delete exactly the copy (`id`, `numero`).
    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        let id = projection::require(filter, "id", "copy delete")?;
        let numero = projection::require(filter, "numero", "copy delete")?;
        let key = Self::copy_key(id.clone(), numero);

        let mut tx = db.begin().await?;
        let result = table::delete(&mut tx, COPY_TABLE, &key).await;
        let removed = tx.finish(result).await?;
        info!(id = %table::id_text(id), numero = %numero, removed, "Copy deleted");
        Ok(removed)
    }
}
