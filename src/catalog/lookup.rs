//! Read-only entities: label tables and the credential store.

use crate::auth::{self, PasswordVerifier};
use crate::catalog::entity::LookupTable;
use crate::catalog::table::{self, EntityHandler};
use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::models::{FieldMap, Row};
use crate::sql::Statement;
use std::sync::Arc;

fn read_only(operation: &str, table: &str) -> DbError {
    DbError::permission(operation, format!("'{table}' is read-only"))
}

/// `genre`, `public`, `rayon`, `suivi`, `etat`.
#[derive(Debug, Clone, Copy)]
pub struct LookupHandler {
    table: LookupTable,
}

impl LookupHandler {
    pub fn new(table: LookupTable) -> Self {
        Self { table }
    }
}

impl EntityHandler for LookupHandler {
    fn table(&self) -> &str {
        self.table.table()
    }

    /// Every row, ordered by label.
    async fn select(&self, db: &Database, _filter: &FieldMap) -> DbResult<Vec<Row>> {
        let sql = format!("SELECT * FROM {} ORDER BY libelle", self.table.table());
        table::query(db, &Statement::raw(sql)).await
    }

    async fn insert(&self, _db: &Database, _fields: &FieldMap) -> DbResult<u64> {
        Err(read_only("insert", self.table.table()))
    }

    async fn update(&self, _db: &Database, _id: &str, _fields: &FieldMap) -> DbResult<u64> {
        Err(read_only("update", self.table.table()))
    }

    async fn delete(&self, _db: &Database, _filter: &FieldMap) -> DbResult<u64> {
        Err(read_only("delete", self.table.table()))
    }
}

/// `utilisateur`: reading it is a login attempt.
#[derive(Clone)]
pub struct UserHandler {
    verifier: Arc<dyn PasswordVerifier>,
}

impl UserHandler {
    pub fn new(verifier: Arc<dyn PasswordVerifier>) -> Self {
        Self { verifier }
    }
}

impl std::fmt::Debug for UserHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserHandler").finish_non_exhaustive()
    }
}

impl EntityHandler for UserHandler {
    fn table(&self) -> &str {
        "utilisateur"
    }

    /// One row without the hash on a match, no rows otherwise.
    async fn select(&self, db: &Database, credentials: &FieldMap) -> DbResult<Vec<Row>> {
        let user = auth::authenticate(db, self.verifier.as_ref(), credentials).await?;
        Ok(user.into_iter().collect())
    }

    async fn insert(&self, _db: &Database, _fields: &FieldMap) -> DbResult<u64> {
        Err(read_only("insert", self.table()))
    }

    async fn update(&self, _db: &Database, _id: &str, _fields: &FieldMap) -> DbResult<u64> {
        Err(read_only("update", self.table()))
    }

    async fn delete(&self, _db: &Database, _filter: &FieldMap) -> DbResult<u64> {
        Err(read_only("delete", self.table()))
    }
}
