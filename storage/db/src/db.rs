use anyhow::{Error, Result};
use sqlx::{
    query::{Query, QueryAs},
    sqlite::{SqliteArguments, SqlitePoolOptions, SqliteQueryResult, SqliteRow},
    Pool, Sqlite,
};
use tokio::sync::Mutex;

use crate::{model::object::ObjectModel, query::object};

/// A change registered against the database but not yet flushed.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    Upsert { table: String, object: ObjectModel },
    Delete { table: String, id: String },
}

impl PendingChange {
    fn table(&self) -> &str {
        match self {
            Self::Upsert { table, .. } | Self::Delete { table, .. } => table,
        }
    }
}

pub struct DbStorage {
    pool: Pool<Sqlite>,
    tables: Vec<String>,
    pending: Mutex<Vec<PendingChange>>,
}

impl DbStorage {
    pub async fn new(path: &str, max_connections: &u32, tables: &[&str]) -> Result<Self> {
        hbnb_log::info(Some("⚡"), "[DbStorage] Initializing component");

        let url = format!("sqlite:{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(*max_connections)
            .connect(&url)
            .await?;

        let storage = Self {
            pool,
            tables: tables.iter().map(|table| (*table).to_owned()).collect(),
            pending: Mutex::new(Vec::new()),
        };
        storage.init().await?;

        Ok(storage)
    }

    pub async fn execute<'a>(
        &self,
        query: Query<'a, Sqlite, SqliteArguments<'a>>,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        query.execute(&self.pool).await
    }

    pub async fn fetch_all<'a, T: Send + Unpin + for<'r> sqlx::FromRow<'r, SqliteRow>>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
    ) -> Result<Vec<T>, sqlx::Error> {
        query.fetch_all(&self.pool).await
    }

    /// Queues `object` to be written to `table` on the next flush.
    pub async fn register(&self, table: &str, object: ObjectModel) -> Result<()> {
        self.check_table(table)?;
        self.pending.lock().await.push(PendingChange::Upsert {
            table: table.to_owned(),
            object,
        });
        Ok(())
    }

    /// Queues removal of row `id` from `table` on the next flush.
    pub async fn unregister(&self, table: &str, id: &str) -> Result<()> {
        self.check_table(table)?;
        self.pending.lock().await.push(PendingChange::Delete {
            table: table.to_owned(),
            id: id.to_owned(),
        });
        Ok(())
    }

    pub async fn pending(&self) -> Vec<PendingChange> {
        self.pending.lock().await.clone()
    }

    /// Applies pending changes in registration order.
    ///
    /// On failure the failed change and everything after it stay queued.
    pub async fn flush(&self) -> Result<()> {
        let mut pending = self.pending.lock().await;
        let total = pending.len();

        let mut changes = std::mem::take(&mut *pending).into_iter();
        while let Some(change) = changes.next() {
            let applied = match &change {
                PendingChange::Upsert { table, object } => self.upsert_object(table, object).await,
                PendingChange::Delete { table, id } => self.delete_object(table, id).await,
            };
            if let Err(err) = applied {
                hbnb_log::error(
                    None,
                    format!("[DbStorage] Flush failed on table {}: {err}", change.table()),
                );
                *pending = std::iter::once(change).chain(changes).collect();
                return Err(err);
            }
        }

        hbnb_log::debug(None, format!("[DbStorage] Flushed {total} changes"));
        Ok(())
    }

    pub async fn reload(&self) -> Result<()> {
        self.init().await
    }

    pub async fn close(&self) {
        hbnb_log::info(Some("👋"), "[DbStorage] Closing connection pool");
        self.pool.close().await;
    }

    pub(crate) fn check_table(&self, table: &str) -> Result<()> {
        match self.tables.iter().any(|known| known == table) {
            true => Ok(()),
            false => Err(Error::msg(format!("Unknown table '{table}'"))),
        }
    }

    async fn init(&self) -> Result<()> {
        for table in &self.tables {
            object::init(&self.pool, table).await?;
        }
        Ok(())
    }
}
