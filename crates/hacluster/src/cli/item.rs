//! Item command - manage records in the local item store

use crate::cli::error::HelpfulError;
use crate::cli::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use hacluster_config::paths::default_item_store_path;
use hacluster_db::{Item, ItemDb};
use std::path::{Path, PathBuf};

/// Subcommands for item management
#[derive(Subcommand, Debug, Clone)]
pub enum ItemAction {
    /// Create an item
    Add {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List all items
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one item
    Get {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Delete one item
    Delete { id: i64 },
    /// Delete every item
    Clear,
}

#[derive(Debug)]
pub struct ItemArgs {
    pub db: Option<PathBuf>,
    pub action: ItemAction,
}

pub fn run(args: ItemArgs) -> anyhow::Result<()> {
    let db_path = args.db.unwrap_or_else(default_item_store_path);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async { run_async(args.action, &db_path).await })
}

async fn run_async(action: ItemAction, db_path: &Path) -> anyhow::Result<()> {
    let db = ItemDb::open(db_path).await.map_err(|e| {
        HelpfulError::new("Failed to open item store")
            .with_context(format!("Database: {}", db_path.display()))
            .with_suggestion(format!("Error: {}", e))
            .with_suggestion("TRY: Check file permissions")
    })?;

    let result = execute(&db, action).await;
    db.close().await;
    result
}

async fn execute(db: &ItemDb, action: ItemAction) -> anyhow::Result<()> {
    match action {
        ItemAction::Add {
            name,
            description,
            json,
        } => {
            let item = db
                .item_create(&name, description.as_deref())
                .await
                .context("Failed to create item")?;
            if json {
                return print_json(&item);
            }
            println!("Created item {} ({})", item.id, item.name);
        }
        ItemAction::List { json } => {
            let items = db.item_list().await.context("Failed to list items")?;
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("No items.");
                return Ok(());
            }
            print_items(&items);
        }
        ItemAction::Get { id, json } => {
            let item = db
                .item_get(id)
                .await?
                .ok_or_else(|| HelpfulError::item_not_found(id))?;
            if json {
                return print_json(&item);
            }
            print_items(std::slice::from_ref(&item));
        }
        ItemAction::Delete { id } => match db.item_delete(id).await {
            Ok(()) => println!("Deleted item {}", id),
            Err(err) if err.is_not_found() => return Err(HelpfulError::item_not_found(id).into()),
            Err(err) => return Err(err).context("Failed to delete item"),
        },
        ItemAction::Clear => {
            let removed = db.item_delete_all().await.context("Failed to clear items")?;
            println!("Deleted {} item(s)", removed);
        }
    }
    Ok(())
}

fn print_items(items: &[Item]) {
    let rows = items
        .iter()
        .map(|item| {
            vec![
                item.id.to_string(),
                item.name.clone(),
                or_dash(item.description.as_deref()),
                item.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "Name", "Description", "Created"], rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_delete_missing_is_helpful() {
        let tmp = TempDir::new().unwrap();
        let db = ItemDb::open(tmp.path().join("items.db")).await.unwrap();

        let err = execute(&db, ItemAction::Delete { id: 99 }).await.unwrap_err();
        assert!(err.downcast_ref::<HelpfulError>().is_some());
    }

    #[tokio::test]
    async fn test_add_then_clear() {
        let tmp = TempDir::new().unwrap();
        let db = ItemDb::open(tmp.path().join("items.db")).await.unwrap();

        execute(
            &db,
            ItemAction::Add {
                name: "orders".to_string(),
                description: None,
                json: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(db.item_list().await.unwrap().len(), 1);

        execute(&db, ItemAction::Clear).await.unwrap();
        assert!(db.item_list().await.unwrap().is_empty());
    }

    #[test]
    fn test_run_against_temp_store() {
        let tmp = TempDir::new().unwrap();
        run(ItemArgs {
            db: Some(tmp.path().join("items.db")),
            action: ItemAction::List { json: true },
        })
        .unwrap();
    }
}
