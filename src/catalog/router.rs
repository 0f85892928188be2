//! Dispatch of (operation, entity name) to an entity handler.
//!
//! Entity names resolve to a fixed set of handlers; any other name is served by
//! the single-table engine with the caller's field map used verbatim.

use crate::auth::{HashVerifier, PasswordVerifier};
use crate::catalog::copy::CopyHandler;
use crate::catalog::document::{self, DocumentHandler};
use crate::catalog::entity::Entity;
use crate::catalog::lookup::{LookupHandler, UserHandler};
use crate::catalog::order::{DocumentOrderHandler, OrderHandler, SubscriptionHandler};
use crate::catalog::table::{EntityHandler, TableHandler};
use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::models::{FieldMap, Row};
use std::sync::Arc;
use tracing::debug;

/// Every handler the dispatcher can route to.
#[derive(Debug, Clone)]
pub enum Handler {
    Document(DocumentHandler),
    Copy(CopyHandler),
    Order(OrderHandler),
    DocumentOrder(DocumentOrderHandler),
    Subscription(SubscriptionHandler),
    Lookup(LookupHandler),
    User(UserHandler),
    Table(TableHandler),
}

/// Expand one body for every [`Handler`] variant, binding the inner handler.
macro_rules! with_handler {
    ($handler:expr, $h:ident => $body:expr) => {
        match $handler {
            Handler::Document($h) => $body,
            Handler::Copy($h) => $body,
            Handler::Order($h) => $body,
            Handler::DocumentOrder($h) => $body,
            Handler::Subscription($h) => $body,
            Handler::Lookup($h) => $body,
            Handler::User($h) => $body,
            Handler::Table($h) => $body,
        }
    };
}

impl Handler {
    pub fn for_entity(entity: Entity, verifier: &Arc<dyn PasswordVerifier>) -> Self {
        match entity {
            Entity::Book => Self::Document(DocumentHandler::new(&document::BOOK)),
            Entity::Dvd => Self::Document(DocumentHandler::new(&document::DVD)),
            Entity::Periodical => Self::Document(DocumentHandler::new(&document::PERIODICAL)),
            Entity::Copy => Self::Copy(CopyHandler),
            Entity::Order => Self::Order(OrderHandler),
            Entity::DocumentOrder => Self::DocumentOrder(DocumentOrderHandler),
            Entity::Subscription => Self::Subscription(SubscriptionHandler),
            Entity::Lookup(table) => Self::Lookup(LookupHandler::new(table)),
            Entity::User => Self::User(UserHandler::new(Arc::clone(verifier))),
            Entity::Table(name) => Self::Table(TableHandler::new(name)),
        }
    }
}

impl EntityHandler for Handler {
    fn table(&self) -> &str {
        with_handler!(self, h => h.table())
    }

    async fn select(&self, db: &Database, filter: &FieldMap) -> DbResult<Vec<Row>> {
        with_handler!(self, h => h.select(db, filter).await)
    }

    async fn insert(&self, db: &Database, fields: &FieldMap) -> DbResult<u64> {
        with_handler!(self, h => h.insert(db, fields).await)
    }

    async fn update(&self, db: &Database, id: &str, fields: &FieldMap) -> DbResult<u64> {
        with_handler!(self, h => h.update(db, id, fields).await)
    }

    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        with_handler!(self, h => h.delete(db, filter).await)
    }
}

/// Public entry point: four operations addressed by entity name.
#[derive(Clone)]
pub struct Dispatcher {
    db: Database,
    verifier: Arc<dyn PasswordVerifier>,
}

impl Dispatcher {
    /// Dispatcher verifying credentials against Argon2 or bcrypt hashes.
    pub fn new(db: Database) -> Self {
        Self::with_verifier(db, Arc::new(HashVerifier))
    }

    pub fn with_verifier(db: Database, verifier: Arc<dyn PasswordVerifier>) -> Self {
        Self { db, verifier }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn handler(&self, entity: &str) -> Handler {
        Handler::for_entity(Entity::parse(entity), &self.verifier)
    }

    /// Rows of `entity`; a missing filter reads everything the entity allows.
    pub async fn select(&self, entity: &str, filter: Option<&FieldMap>) -> DbResult<Vec<Row>> {
        debug!(entity, "dispatch select");
        let empty = FieldMap::new();
        self.handler(entity)
            .select(&self.db, filter.unwrap_or(&empty))
            .await
    }

    pub async fn insert(&self, entity: &str, fields: Option<&FieldMap>) -> DbResult<u64> {
        debug!(entity, "dispatch insert");
        let fields = fields
            .filter(|f| !f.is_empty())
            .ok_or_else(|| DbError::invalid_input(format!("insert into '{entity}' requires fields")))?;
        self.handler(entity).insert(&self.db, fields).await
    }

    pub async fn update(
        &self,
        entity: &str,
        id: Option<&str>,
        fields: Option<&FieldMap>,
    ) -> DbResult<u64> {
        debug!(entity, "dispatch update");
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DbError::invalid_input(format!("update of '{entity}' requires an id")))?;
        let fields = fields
            .filter(|f| !f.is_empty())
            .ok_or_else(|| DbError::invalid_input(format!("update of '{entity}' requires fields")))?;
        self.handler(entity).update(&self.db, id, fields).await
    }

    /// Delete rows of `entity`. A missing or empty filter is always refused.
    pub async fn delete(&self, entity: &str, filter: Option<&FieldMap>) -> DbResult<u64> {
        debug!(entity, "dispatch delete");
        let filter = filter
            .filter(|f| !f.is_empty())
            .ok_or_else(|| DbError::invalid_input(format!("delete from '{entity}' requires a filter")))?;
        self.handler(entity).delete(&self.db, filter).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
