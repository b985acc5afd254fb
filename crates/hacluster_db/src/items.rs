//! Item CRUD operations

use crate::error::{DbError, Result};
use crate::types::Item;
use crate::ItemDb;
use sqlx::Row;
use tracing::info;

impl ItemDb {
    /// Insert a new item and return it with its assigned id.
    pub async fn item_create(&self, name: &str, description: Option<&str>) -> Result<Item> {
        let now = Self::now_millis();

        let result = sqlx::query(
            r#"
            INSERT INTO items (name, description, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, name, "Item created");

        self.item_get(id)
            .await?
            .ok_or_else(|| DbError::not_found(format!("Item {} missing after creation", id)))
    }

    /// All items, oldest first.
    pub async fn item_list(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query("SELECT * FROM items ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| self.row_to_item(row)).collect()
    }

    pub async fn item_get(&self, id: i64) -> Result<Option<Item>> {
        let row = sqlx::query("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    /// Delete one item; `NotFound` if no row had that id.
    pub async fn item_delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("Item {}", id)));
        }
        info!(id, "Item deleted");
        Ok(())
    }

    /// Delete every item, returning how many were removed.
    pub async fn item_delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items")
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected();
        info!(removed, "Items cleared");
        Ok(removed)
    }

    fn row_to_item(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Item> {
        let created_at: i64 = row.try_get("created_at")?;

        Ok(Item {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: Self::millis_to_datetime(created_at),
        })
    }
}
