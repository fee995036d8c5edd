//! Books repository

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::services::provenance::models::BookRecord;

/// Get a book by its external identifier.
pub async fn get_book(pool: &SqlitePool, id: &str) -> Result<Option<BookRecord>> {
    let row = sqlx::query("SELECT id, identified, first_entry, last_entry FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get book")?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(BookRecord {
        id: row.try_get("id")?,
        identified: row.try_get::<i64, _>("identified")? != 0,
        first_entry: row.try_get("first_entry")?,
        last_entry: row.try_get("last_entry")?,
    }))
}

pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
        .context("Failed to count books")?;

    Ok(count)
}
