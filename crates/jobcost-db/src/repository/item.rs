//! # Item Repository
//!
//! Items always come back joined with their category name.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use jobcost_core::validation::validate_item;
use jobcost_core::{Item, ItemInput};

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.name, i.category_id, i.size, c.name AS category_name, i.created_at
    FROM items i
    JOIN item_categories c ON c.id = i.category_id
"#;

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists items with their category, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let sql = format!("{ITEM_SELECT} ORDER BY i.name COLLATE NOCASE, i.id");
        let items = sqlx::query_as::<_, Item>(&sql).fetch_all(&self.pool).await?;
        Ok(items)
    }

    /// Lists the items of one category.
    pub async fn list_by_category(&self, category_id: i64) -> DbResult<Vec<Item>> {
        let sql = format!("{ITEM_SELECT} WHERE i.category_id = ? ORDER BY i.name COLLATE NOCASE, i.id");
        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> DbResult<Item> {
        let sql = format!("{ITEM_SELECT} WHERE i.id = ?");
        sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Creates an item.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - The category does not exist
    pub async fn create(&self, input: &ItemInput) -> DbResult<Item> {
        validate_item(input)?;
        debug!(name = %input.name, category_id = input.category_id, "Creating item");

        let result = sqlx::query(
            "INSERT INTO items (name, category_id, size, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(input.size.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(&self, id: i64, input: &ItemInput) -> DbResult<Item> {
        validate_item(input)?;
        debug!(id, "Updating item");

        let result = sqlx::query("UPDATE items SET name = ?, category_id = ?, size = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(input.category_id)
            .bind(input.size.trim())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get(id).await
    }

    /// Deletes an item. Fails while jobs reference it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::fixture;
    use jobcost_core::CategoryInput;

    #[tokio::test]
    async fn test_items_carry_category_name() {
        let fx = fixture().await;
        let items = fx.db.items().list().await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Cut Sheet A3");
        assert_eq!(items[0].category_name, "Cut Sheets");
    }

    #[tokio::test]
    async fn test_list_by_category_and_move() {
        let fx = fixture().await;
        let bags = fx
            .db
            .categories()
            .create(&CategoryInput {
                name: "PP Bags".to_string(),
            })
            .await
            .unwrap();

        assert!(fx.db.items().list_by_category(bags.id).await.unwrap().is_empty());

        let moved = fx
            .db
            .items()
            .update(
                fx.item_id,
                &ItemInput {
                    name: "PP Carry Bag".to_string(),
                    category_id: bags.id,
                    size: "10x12".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.category_name, "PP Bags");
        assert_eq!(fx.db.items().list_by_category(bags.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_with_unknown_category() {
        let fx = fixture().await;
        let err = fx
            .db
            .items()
            .create(&ItemInput {
                name: "Bill Book".to_string(),
                category_id: 999,
                size: "A5".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
