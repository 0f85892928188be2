//! Statement execution.
//!
//! [`Executor`] is the seam every handler runs its statements through. It is
//! implemented for `&Database` (each statement on a pooled connection) and for
//! `&mut Transaction` (every statement on the transaction's connection), the
//! same way sqlx implements its own executor for pools and connections.
//!
//! # Architecture
//!
//! Backend code lives in parallel submodules (`mysql`, `postgres`, `sqlite`).
//! Each is generic over the sqlx executor so the pool and the transaction
//! share one implementation. Every statement runs under the configured timeout.

use crate::db::pool::DbPool;
use crate::db::transaction::{DbTransaction, Transaction};
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, DatabaseType, QueryParam, Row};
use crate::sql::{RenderedStatement, Statement};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Something statements can be run against.
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Run a statement and return its rows as ordered field maps.
    async fn fetch_all(&mut self, statement: &Statement) -> DbResult<Vec<Row>>;

    /// Run a statement and return the number of rows it affected.
    async fn execute(&mut self, statement: &Statement) -> DbResult<u64>;
}

/// Handle to the catalog database: a pool plus the per-statement timeout.
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
    query_timeout: Duration,
}

impl Database {
    pub fn new(pool: DbPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Open a pool for `config`.
    pub async fn connect(config: &ConnectionConfig, query_timeout: Duration) -> DbResult<Self> {
        let pool = DbPool::connect(config).await?;
        Ok(Self::new(pool, query_timeout))
    }

    pub fn db_type(&self) -> DatabaseType {
        self.pool.db_type()
    }

    /// Start a transaction on a dedicated connection.
    pub async fn begin(&self) -> DbResult<Transaction> {
        let begin = async {
            Ok::<_, sqlx::Error>(match &self.pool {
                DbPool::MySql(pool) => DbTransaction::MySql(pool.begin().await?),
                DbPool::Postgres(pool) => DbTransaction::Postgres(pool.begin().await?),
                DbPool::SQLite(pool) => DbTransaction::SQLite(pool.begin().await?),
            })
        };
        let tx = timed("transaction begin", self.query_timeout, begin).await?;
        Ok(Transaction::new(tx, self.query_timeout))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl Executor for &Database {
    async fn fetch_all(&mut self, statement: &Statement) -> DbResult<Vec<Row>> {
        let rendered = statement.render(self.pool.db_type())?;
        debug!(sql = %rendered.sql, params = rendered.params.len(), "Fetching rows");
        match &self.pool {
            DbPool::MySql(pool) => mysql::fetch_all(pool, &rendered, self.query_timeout).await,
            DbPool::Postgres(pool) => postgres::fetch_all(pool, &rendered, self.query_timeout).await,
            DbPool::SQLite(pool) => sqlite::fetch_all(pool, &rendered, self.query_timeout).await,
        }
    }

    async fn execute(&mut self, statement: &Statement) -> DbResult<u64> {
        let rendered = statement.render(self.pool.db_type())?;
        debug!(sql = %rendered.sql, params = rendered.params.len(), "Executing statement");
        match &self.pool {
            DbPool::MySql(pool) => mysql::execute(pool, &rendered, self.query_timeout).await,
            DbPool::Postgres(pool) => postgres::execute(pool, &rendered, self.query_timeout).await,
            DbPool::SQLite(pool) => sqlite::execute(pool, &rendered, self.query_timeout).await,
        }
    }
}

impl Executor for &mut Transaction {
    async fn fetch_all(&mut self, statement: &Statement) -> DbResult<Vec<Row>> {
        let query_timeout = self.query_timeout();
        let tx = self.active()?;
        let rendered = statement.render(tx.db_type())?;
        debug!(sql = %rendered.sql, params = rendered.params.len(), "Fetching rows in transaction");
        match tx {
            DbTransaction::MySql(tx) => mysql::fetch_all(&mut **tx, &rendered, query_timeout).await,
            DbTransaction::Postgres(tx) => postgres::fetch_all(&mut **tx, &rendered, query_timeout).await,
            DbTransaction::SQLite(tx) => sqlite::fetch_all(&mut **tx, &rendered, query_timeout).await,
        }
    }

    async fn execute(&mut self, statement: &Statement) -> DbResult<u64> {
        let query_timeout = self.query_timeout();
        let tx = self.active()?;
        let rendered = statement.render(tx.db_type())?;
        debug!(sql = %rendered.sql, params = rendered.params.len(), "Executing in transaction");
        match tx {
            DbTransaction::MySql(tx) => mysql::execute(&mut **tx, &rendered, query_timeout).await,
            DbTransaction::Postgres(tx) => postgres::execute(&mut **tx, &rendered, query_timeout).await,
            DbTransaction::SQLite(tx) => sqlite::execute(&mut **tx, &rendered, query_timeout).await,
        }
    }
}

// =============================================================================
// Common Helper Functions
// =============================================================================

fn timeout_error(operation: &str, timeout: Duration) -> DbError {
    DbError::timeout(operation, timeout.as_secs() as u32)
}

/// Await a driver call under the statement timeout.
async fn timed<T>(
    operation: &str,
    query_timeout: Duration,
    call: impl Future<Output = Result<T, sqlx::Error>>,
) -> DbResult<T> {
    match timeout(query_timeout, call).await {
        Ok(result) => result.map_err(DbError::from),
        Err(_) => Err(timeout_error(operation, query_timeout)),
    }
}

fn rows_to_json<R: RowToJson>(rows: &[R]) -> Vec<Row> {
    rows.iter().map(RowToJson::to_json_map).collect()
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module binds a rendered statement's parameters in order and runs it on
// any executor of its backend: a pool or a transaction's connection.

mod mysql {
    use super::*;
    use sqlx::MySql;
    use sqlx::mysql::MySqlArguments;
    use sqlx::query::Query;
    use sqlx::types::Json;

    fn prepare(statement: &RenderedStatement) -> Query<'_, MySql, MySqlArguments> {
        statement
            .params
            .iter()
            .fold(sqlx::query(&statement.sql), |query, param| match param {
                QueryParam::Null => query.bind(None::<String>),
                QueryParam::Bool(v) => query.bind(*v),
                QueryParam::Int(v) => query.bind(*v),
                QueryParam::Float(v) => query.bind(*v),
                QueryParam::String(v) => query.bind(v.as_str()),
                QueryParam::Json(v) => query.bind(Json(v)),
            })
    }

    pub async fn fetch_all<'c, E>(
        executor: E,
        statement: &RenderedStatement,
        query_timeout: Duration,
    ) -> DbResult<Vec<Row>>
    where
        E: sqlx::Executor<'c, Database = MySql>,
    {
        let rows = timed("query execution", query_timeout, prepare(statement).fetch_all(executor)).await?;
        Ok(rows_to_json(&rows))
    }

    pub async fn execute<'c, E>(
        executor: E,
        statement: &RenderedStatement,
        query_timeout: Duration,
    ) -> DbResult<u64>
    where
        E: sqlx::Executor<'c, Database = MySql>,
    {
        let done = timed("write operation", query_timeout, prepare(statement).execute(executor)).await?;
        Ok(done.rows_affected())
    }
}

mod postgres {
    use super::*;
    use sqlx::Postgres;
    use sqlx::postgres::PgArguments;
    use sqlx::query::Query;
    use sqlx::types::Json;

    fn prepare(statement: &RenderedStatement) -> Query<'_, Postgres, PgArguments> {
        statement
            .params
            .iter()
            .fold(sqlx::query(&statement.sql), |query, param| match param {
                QueryParam::Null => query.bind(None::<String>),
                QueryParam::Bool(v) => query.bind(*v),
                QueryParam::Int(v) => query.bind(*v),
                QueryParam::Float(v) => query.bind(*v),
                QueryParam::String(v) => query.bind(v.as_str()),
                QueryParam::Json(v) => query.bind(Json(v)),
            })
    }

    pub async fn fetch_all<'c, E>(
        executor: E,
        statement: &RenderedStatement,
        query_timeout: Duration,
    ) -> DbResult<Vec<Row>>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        let rows = timed("query execution", query_timeout, prepare(statement).fetch_all(executor)).await?;
        Ok(rows_to_json(&rows))
    }

    pub async fn execute<'c, E>(
        executor: E,
        statement: &RenderedStatement,
        query_timeout: Duration,
    ) -> DbResult<u64>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        let done = timed("write operation", query_timeout, prepare(statement).execute(executor)).await?;
        Ok(done.rows_affected())
    }
}

mod sqlite {
    use super::*;
    use sqlx::Sqlite;
    use sqlx::query::Query;
    use sqlx::sqlite::SqliteArguments;

    fn prepare(statement: &RenderedStatement) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        statement
            .params
            .iter()
            .fold(sqlx::query(&statement.sql), |query, param| match param {
                QueryParam::Null => query.bind(None::<String>),
                QueryParam::Bool(v) => query.bind(*v),
                QueryParam::Int(v) => query.bind(*v),
                QueryParam::Float(v) => query.bind(*v),
                QueryParam::String(v) => query.bind(v.as_str()),
                // No JSON column type: arrays and objects are stored as text
                QueryParam::Json(v) => query.bind(v.to_string()),
            })
    }

    pub async fn fetch_all<'c, E>(
        executor: E,
        statement: &RenderedStatement,
        query_timeout: Duration,
    ) -> DbResult<Vec<Row>>
    where
        E: sqlx::Executor<'c, Database = Sqlite>,
    {
        let rows = timed("query execution", query_timeout, prepare(statement).fetch_all(executor)).await?;
        Ok(rows_to_json(&rows))
    }

    pub async fn execute<'c, E>(
        executor: E,
        statement: &RenderedStatement,
        query_timeout: Duration,
    ) -> DbResult<u64>
    where
        E: sqlx::Executor<'c, Database = Sqlite>,
    {
        let done = timed("write operation", query_timeout, prepare(statement).execute(executor)).await?;
        Ok(done.rows_affected())
    }
}
