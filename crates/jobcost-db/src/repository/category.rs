//! # Item Category Repository
//!
//! ## Delete Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  categories:delete(id)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  SELECT COUNT(*) FROM items WHERE category_id = id                     │
//! │       │                                                                 │
//! │       ├── n > 0 → ROLLBACK, DbError::InUse                             │
//! │       │           "Cannot delete category: n item(s) still ..."        │
//! │       │                                                                 │
//! │       └── n = 0 → DELETE category, COMMIT                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use jobcost_core::validation::validate_category;
use jobcost_core::{CategoryInput, ItemCategory};

/// Repository for item category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<ItemCategory>> {
        let categories = sqlx::query_as::<_, ItemCategory>(
            "SELECT id, name, created_at FROM item_categories ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get(&self, id: i64) -> DbResult<ItemCategory> {
        sqlx::query_as::<_, ItemCategory>(
            "SELECT id, name, created_at FROM item_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Creates a category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - A category with this name exists
    pub async fn create(&self, input: &CategoryInput) -> DbResult<ItemCategory> {
        validate_category(input)?;
        debug!(name = %input.name, "Creating category");

        sqlx::query_as::<_, ItemCategory>(
            r#"
            INSERT INTO item_categories (name, created_at)
            VALUES (?, ?)
            RETURNING id, name, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_name(e.into(), &input.name))
    }

    /// Renames a category.
    pub async fn update(&self, id: i64, input: &CategoryInput) -> DbResult<ItemCategory> {
        validate_category(input)?;
        debug!(id, "Updating category");

        let result = sqlx::query("UPDATE item_categories SET name = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_name(e.into(), &input.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get(id).await
    }

    /// Number of items in a category.
    pub async fn item_count(&self, id: i64) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE category_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a category that no item references.
    ///
    /// The count and the delete share one transaction, so an item added in
    /// between cannot be orphaned.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE category_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if count > 0 {
            info!(id, count, "Refusing to delete category with items");
            return Err(DbError::InUse {
                entity: "category".to_string(),
                dependent: "item".to_string(),
                count,
            });
        }

        let result = sqlx::query("DELETE FROM item_categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        tx.commit().await?;
        debug!(id, "Deleted category");
        Ok(())
    }
}

fn duplicate_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("category", name.trim()),
        other => other,
    }
}
