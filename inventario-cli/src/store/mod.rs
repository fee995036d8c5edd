//! Repository layer for database operations

pub mod books;
pub mod entries;
pub mod import;
pub mod listings;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Open (creating if missing) the store at `path` and run pending
/// migrations. Foreign keys are enforced on every connection.
pub async fn open(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    log::debug!("Opened store at {}", path.display());
    Ok(pool)
}

/// Totals removed by a backout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackoutStats {
    pub entries: u64,
    pub books: u64,
    pub listings: u64,
}

/// Delete everything: entries first, then books and listings, so foreign
/// key ordering holds. All-or-nothing; callers confirm before calling.
pub async fn backout(pool: &SqlitePool) -> Result<BackoutStats> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let entries = sqlx::query("DELETE FROM book_entries")
        .execute(&mut *tx)
        .await
        .context("Failed to delete book entries")?
        .rows_affected();

    let books = sqlx::query("DELETE FROM books")
        .execute(&mut *tx)
        .await
        .context("Failed to delete books")?
        .rows_affected();

    let listings = sqlx::query("DELETE FROM listings")
        .execute(&mut *tx)
        .await
        .context("Failed to delete listings")?
        .rows_affected();

    tx.commit().await.context("Failed to commit transaction")?;

    log::info!(
        "Backout complete: {} entries, {} books, {} listings removed",
        entries,
        books,
        listings
    );

    Ok(BackoutStats {
        entries,
        books,
        listings,
    })
}

#[cfg(test)]
pub async fn open_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    // A single connection, or every pool checkout would see its own
    // private in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("Failed to open in-memory database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}
