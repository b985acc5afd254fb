//! SQLite item store for the HA cluster tooling.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hacluster_db::{ItemDb, Result};
//!
//! let db = ItemDb::open("~/.hacluster/items.sqlite3").await?;
//! let item = db.item_create("orders", Some("nightly export")).await?;
//! let items = db.item_list().await?;
//! ```

mod error;
mod items;
mod schema;
mod types;

pub use error::{DbError, Result};
pub use types::Item;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Handle to the item database.
#[derive(Clone)]
pub struct ItemDb {
    pool: SqlitePool,
}

impl ItemDb {
    /// Open or create a database at the given path.
    ///
    /// Creates the schema if it doesn't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        info!(path = %path.display(), "Item database opened");
        Ok(db)
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }

    pub(crate) fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub(crate) fn millis_to_datetime(millis: i64) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(millis).unwrap_or_else(chrono::Utc::now)
    }
}
