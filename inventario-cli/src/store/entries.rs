//! Book entries repository

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::services::provenance::models::EntryRecord;

fn entry_from_row(row: &SqliteRow) -> Result<EntryRecord> {
    Ok(EntryRecord {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        listing_id: row.try_get("listing_id")?,
        title: row.try_get("title")?,
        pos: row.try_get("pos")?,
        lang: row.try_get("lang")?,
        support: row.try_get("support")?,
        copy_error: row.try_get::<i64, _>("copy_error")? != 0,
        identified: row.try_get::<i64, _>("identified")? != 0,
    })
}

/// All entries of one listing, in source row order.
pub async fn entries_for_listing(pool: &SqlitePool, listing_id: i64) -> Result<Vec<EntryRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT be.id, be.book_id, be.listing_id, be.title, be.pos,
               be.lang, be.support, be.copy_error, b.identified
        FROM book_entries be
        JOIN books b ON b.id = be.book_id
        WHERE be.listing_id = ?
        ORDER BY be.pos
        "#,
    )
    .bind(listing_id)
    .fetch_all(pool)
    .await
    .context("Failed to get entries for listing")?;

    rows.iter().map(entry_from_row).collect()
}

/// Every entry across all listings, chronological order (listing id, then
/// row position). This is the input the classifier and graph builder
/// expect.
pub async fn all_entries(pool: &SqlitePool) -> Result<Vec<EntryRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT be.id, be.book_id, be.listing_id, be.title, be.pos,
               be.lang, be.support, be.copy_error, b.identified
        FROM book_entries be
        JOIN books b ON b.id = be.book_id
        ORDER BY be.listing_id, be.pos
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to get entries")?;

    rows.iter().map(entry_from_row).collect()
}

/// One book's full history, chronological order.
pub async fn entries_for_book(pool: &SqlitePool, book_id: &str) -> Result<Vec<EntryRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT be.id, be.book_id, be.listing_id, be.title, be.pos,
               be.lang, be.support, be.copy_error, b.identified
        FROM book_entries be
        JOIN books b ON b.id = be.book_id
        WHERE be.book_id = ?
        ORDER BY be.listing_id, be.pos
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await
    .context("Failed to get entries for book")?;

    rows.iter().map(entry_from_row).collect()
}

pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM book_entries")
        .fetch_one(pool)
        .await
        .context("Failed to count entries")?;

    Ok(count)
}
