//! Key/value application metadata.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;

/// Key of the flag written once demo data is in place.
pub const SEEDED_KEY: &str = "seeded";

/// Repository for the `meta` table.
#[derive(Debug, Clone)]
pub struct MetaRepository {
    pool: SqlitePool,
}

impl MetaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MetaRepository { pool }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let mut conn = self.pool.acquire().await?;
        get_value(&mut conn, key).await
    }

    /// Inserts or replaces a value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        set_value(&mut conn, key, value).await
    }

    /// Whether demo data has been loaded.
    pub async fn is_seeded(&self) -> DbResult<bool> {
        Ok(self.get(SEEDED_KEY).await?.as_deref() == Some("true"))
    }
}

pub(crate) async fn get_value(conn: &mut SqliteConnection, key: &str) -> DbResult<Option<String>> {
    let value = sqlx::query_scalar("SELECT value FROM meta WHERE key = ?")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(value)
}

pub(crate) async fn set_value(conn: &mut SqliteConnection, key: &str, value: &str) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO meta (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_get_set() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let meta = db.meta();

        assert_eq!(meta.get("theme").await.unwrap(), None);
        assert!(!meta.is_seeded().await.unwrap());

        meta.set("theme", "dark").await.unwrap();
        meta.set("theme", "light").await.unwrap();
        assert_eq!(meta.get("theme").await.unwrap().as_deref(), Some("light"));

        meta.set(super::SEEDED_KEY, "true").await.unwrap();
        assert!(meta.is_seeded().await.unwrap());
    }
}
