//! Scoped transactions.
//!
//! A [`Transaction`] owns one pooled connection from `begin` until it is
//! committed or rolled back. Composite operations run every statement through
//! it and hand their outcome to [`Transaction::finish`], which commits on
//! success and rolls back on failure. A transaction dropped while still open is
//! rolled back by the driver when the connection returns to the pool.

use crate::error::{DbError, DbResult};
use crate::models::DatabaseType;
use sqlx::{MySql, Postgres, Sqlite};
use std::time::Duration;
use tracing::{debug, warn};

/// Database-specific transaction wrapper.
pub enum DbTransaction {
    MySql(sqlx::Transaction<'static, MySql>),
    Postgres(sqlx::Transaction<'static, Postgres>),
    SQLite(sqlx::Transaction<'static, Sqlite>),
}

impl DbTransaction {
    /// Get the database type for this transaction.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbTransaction::MySql(_) => DatabaseType::MySQL,
            DbTransaction::Postgres(_) => DatabaseType::PostgreSQL,
            DbTransaction::SQLite(_) => DatabaseType::SQLite,
        }
    }

    async fn commit(self) -> DbResult<()> {
        match self {
            DbTransaction::MySql(tx) => tx.commit().await.map_err(DbError::from),
            DbTransaction::Postgres(tx) => tx.commit().await.map_err(DbError::from),
            DbTransaction::SQLite(tx) => tx.commit().await.map_err(DbError::from),
        }
    }

    async fn rollback(self) -> DbResult<()> {
        match self {
            DbTransaction::MySql(tx) => tx.rollback().await.map_err(DbError::from),
            DbTransaction::Postgres(tx) => tx.rollback().await.map_err(DbError::from),
            DbTransaction::SQLite(tx) => tx.rollback().await.map_err(DbError::from),
        }
    }
}

/// An open transaction with the statement timeout of the database it came from.
pub struct Transaction {
    inner: Option<DbTransaction>,
    query_timeout: Duration,
}

impl Transaction {
    pub(crate) fn new(inner: DbTransaction, query_timeout: Duration) -> Self {
        debug!(db_type = inner.db_type().display_name(), "Transaction started");
        Self {
            inner: Some(inner),
            query_timeout,
        }
    }

    pub fn db_type(&self) -> Option<DatabaseType> {
        self.inner.as_ref().map(DbTransaction::db_type)
    }

    pub(crate) fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Access the live transaction, failing once it has been finished.
    pub(crate) fn active(&mut self) -> DbResult<&mut DbTransaction> {
        self.inner
            .as_mut()
            .ok_or_else(|| DbError::transaction("Transaction is no longer active"))
    }

    /// Commit the transaction.
    pub async fn commit(mut self) -> DbResult<()> {
        let tx = self
            .inner
            .take()
            .ok_or_else(|| DbError::transaction("Transaction is no longer active"))?;
        tx.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Roll the transaction back.
    pub async fn rollback(mut self) -> DbResult<()> {
        let tx = self
            .inner
            .take()
            .ok_or_else(|| DbError::transaction("Transaction is no longer active"))?;
        tx.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }

    /// Commit when `result` is `Ok`, roll back otherwise, and pass `result` through.
    ///
    /// A failed commit replaces the success value with the commit error. A failed
    /// rollback is logged and the original error is returned.
    pub async fn finish<T>(self, result: DbResult<T>) -> DbResult<T> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "Rolling back transaction");
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.inner.is_some() {
            warn!("Transaction dropped while open, it will be rolled back");
        }
    }
}
