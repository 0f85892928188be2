//! Orders: a shared `commande` row plus a `commandedocument` or `abonnement` row.

use crate::catalog::projection::{
    self, DOCUMENT_ORDER_COLUMNS, ORDER_COLUMNS, SUBSCRIPTION_COLUMNS,
};
use crate::catalog::table::{self, EntityHandler};
use crate::db::Database;
use crate::error::DbResult;
use crate::models::{FieldMap, Row};
use crate::sql::Statement;
use serde_json::Value as JsonValue;
use tracing::info;

const ORDER_TABLE: &str = "commande";
const DOCUMENT_ORDER_TABLE: &str = "commandedocument";
const SUBSCRIPTION_TABLE: &str = "abonnement";

const TRACKING_COLUMN: &str = "idsuivi";

/// Tracking state of a freshly created document order.
pub const INITIAL_TRACKING_STATE: &str = "00001";

const ALL_ORDERS: &str = "SELECT id, dateCommande, montant FROM commande ORDER BY dateCommande DESC";

const ORDERS_OF_DOCUMENT: &str = "SELECT c.id, cd.idLivreDvd, c.dateCommande, c.montant, cd.nbExemplaire, cd.idsuivi, s.libelle AS libelleSuivi \
     FROM commande c \
     JOIN commandedocument cd ON c.id = cd.id \
     JOIN suivi s ON cd.idsuivi = s.id \
     WHERE cd.idLivreDvd = :id \
     ORDER BY c.dateCommande DESC";

const ALL_SUBSCRIPTIONS: &str = "SELECT c.id, c.dateCommande, c.montant, a.dateFinAbonnement, a.idRevue \
     FROM commande c \
     JOIN abonnement a ON c.id = a.id \
     ORDER BY c.dateCommande DESC";

const SUBSCRIPTIONS_OF_PERIODICAL: &str = "SELECT c.id, c.dateCommande, c.montant, a.dateFinAbonnement, a.idRevue \
     FROM commande c \
     JOIN abonnement a ON c.id = a.id \
     WHERE a.idRevue = :idRevue \
     ORDER BY c.dateCommande DESC";

/// Create the `commande` row then the subtype row in one transaction.
async fn create_with_parent(
    db: &Database,
    subtype_table: &str,
    order: &FieldMap,
    detail: &FieldMap,
) -> DbResult<u64> {
    let mut tx = db.begin().await?;
    let result: DbResult<u64> = async {
        table::insert(&mut tx, ORDER_TABLE, order).await?;
        table::insert(&mut tx, subtype_table, detail).await?;
        Ok(1)
    }
    .await;
    tx.finish(result).await
}

/// Delete the given subtype rows then the `commande` row, returning the
/// number of `commande` rows removed.
async fn delete_with_parent(db: &Database, subtype_tables: &[&str], id: &JsonValue) -> DbResult<u64> {
    let key = projection::key("id", id.clone());
    let mut tx = db.begin().await?;
    let result: DbResult<u64> = async {
        for subtype in subtype_tables {
            table::delete(&mut tx, subtype, &key).await?;
        }
        table::delete(&mut tx, ORDER_TABLE, &key).await
    }
    .await;
    tx.finish(result).await
}

/// `commande` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderHandler;

impl EntityHandler for OrderHandler {
    fn table(&self) -> &str {
        ORDER_TABLE
    }

    /// Every order (no subtype join), or the document orders of the document `id`.
    async fn select(&self, db: &Database, filter: &FieldMap) -> DbResult<Vec<Row>> {
        let statement = match projection::lookup(filter, "id").filter(|v| !v.is_null()) {
            None => Statement::raw(ALL_ORDERS),
            Some(id) => Statement::new(ORDERS_OF_DOCUMENT, projection::key("id", id.clone())),
        };
        table::query(db, &statement).await
    }

    /// Delete the order together with whichever subtype row it has.
    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        let id = projection::require(filter, "id", "order delete")?;
        let removed =
            delete_with_parent(db, &[DOCUMENT_ORDER_TABLE, SUBSCRIPTION_TABLE], id).await?;
        info!(id = %table::id_text(id), removed, "Order deleted");
        Ok(removed)
    }
}

/// `commande` + `commandedocument`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentOrderHandler;

impl EntityHandler for DocumentOrderHandler {
    fn table(&self) -> &str {
        DOCUMENT_ORDER_TABLE
    }

    /// A new order always starts at [`INITIAL_TRACKING_STATE`]; a caller-supplied state is ignored.
    async fn insert(&self, db: &Database, fields: &FieldMap) -> DbResult<u64> {
        let id = projection::require(fields, "id", "document order")?;
        let order = projection::project(fields, ORDER_COLUMNS);
        let mut detail = projection::project(fields, DOCUMENT_ORDER_COLUMNS);
        detail.insert(
            TRACKING_COLUMN.to_string(),
            JsonValue::String(INITIAL_TRACKING_STATE.to_string()),
        );

        let created = create_with_parent(db, DOCUMENT_ORDER_TABLE, &order, &detail).await?;
        info!(id = %table::id_text(id), "Document order created");
        Ok(created)
    }

    /// Only the tracking state of a document order can change.
    async fn update(&self, db: &Database, id: &str, fields: &FieldMap) -> DbResult<u64> {
        let tracking = projection::require(fields, TRACKING_COLUMN, "document order update")?;
        let changes = projection::key(TRACKING_COLUMN, tracking.clone());
        table::update(db, DOCUMENT_ORDER_TABLE, id, &changes).await
    }

    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        let id = projection::require(filter, "id", "document order delete")?;
        delete_with_parent(db, &[DOCUMENT_ORDER_TABLE], id).await
    }
}

/// `commande` + `abonnement`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionHandler;

impl EntityHandler for SubscriptionHandler {
    fn table(&self) -> &str {
        SUBSCRIPTION_TABLE
    }

    /// Every subscription, or those of the periodical `id`, most recent first.
    async fn select(&self, db: &Database, filter: &FieldMap) -> DbResult<Vec<Row>> {
        let statement = match projection::lookup(filter, "id").filter(|v| !v.is_null()) {
            None => Statement::raw(ALL_SUBSCRIPTIONS),
            Some(id) => Statement::new(
                SUBSCRIPTIONS_OF_PERIODICAL,
                projection::key("idRevue", id.clone()),
            ),
        };
        table::query(db, &statement).await
    }

    async fn insert(&self, db: &Database, fields: &FieldMap) -> DbResult<u64> {
        let id = projection::require(fields, "id", "subscription")?;
        let order = projection::project(fields, ORDER_COLUMNS);
        let detail = projection::project(fields, SUBSCRIPTION_COLUMNS);
        let created = create_with_parent(db, SUBSCRIPTION_TABLE, &order, &detail).await?;
        info!(id = %table::id_text(id), "Subscription created");
        Ok(created)
    }

    async fn delete(&self, db: &Database, filter: &FieldMap) -> DbResult<u64> {
        let id = projection::require(filter, "id", "subscription delete")?;
        delete_with_parent(db, &[SUBSCRIPTION_TABLE], id).await
    }
}
