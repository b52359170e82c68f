use anyhow::Result;
use sqlx::{Executor, Pool, Sqlite};

use crate::{db::DbStorage, model::object::ObjectModel};

fn create_table(table: &str) -> String {
    format!("CREATE TABLE IF NOT EXISTS \"{table}\" (\"id\" text NOT NULL, \"created_at\" datetime NOT NULL, \"updated_at\" datetime NOT NULL, \"attributes\" text NOT NULL, PRIMARY KEY (\"id\"))")
}

fn upsert(table: &str) -> String {
    format!("INSERT INTO \"{table}\" (\"id\", \"created_at\", \"updated_at\", \"attributes\") VALUES (?, ?, ?, ?) ON CONFLICT (\"id\") DO UPDATE SET \"created_at\" = excluded.\"created_at\", \"updated_at\" = excluded.\"updated_at\", \"attributes\" = excluded.\"attributes\"")
}

fn select_all(table: &str) -> String {
    format!("SELECT \"id\", \"created_at\", \"updated_at\", \"attributes\" FROM \"{table}\" ORDER BY \"created_at\", \"id\"")
}

fn delete(table: &str) -> String {
    format!("DELETE FROM \"{table}\" WHERE \"id\" = ?")
}

pub async fn init(pool: &Pool<Sqlite>, table: &str) -> Result<()> {
    hbnb_log::info(Some("🔧"), format!("[DbStorage] Setting up {table} table"));

    pool.execute(create_table(table).as_str()).await?;

    pool.prepare(upsert(table).as_str()).await?;
    pool.prepare(select_all(table).as_str()).await?;
    pool.prepare(delete(table).as_str()).await?;

    Ok(())
}

impl DbStorage {
    pub(crate) async fn upsert_object(&self, table: &str, value: &ObjectModel) -> Result<()> {
        let sql = upsert(table);
        self.execute(
            sqlx::query(&sql)
                .bind(value.id())
                .bind(value.created_at())
                .bind(value.updated_at())
                .bind(value.attributes()),
        )
        .await?;
        Ok(())
    }

    pub async fn select_objects(&self, table: &str) -> Result<Vec<ObjectModel>> {
        self.check_table(table)?;
        let sql = select_all(table);
        Ok(self.fetch_all(sqlx::query_as(&sql)).await?)
    }

    pub(crate) async fn delete_object(&self, table: &str, id: &str) -> Result<()> {
        let sql = delete(table);
        self.execute(sqlx::query(&sql).bind(id)).await?;
        Ok(())
    }
}
