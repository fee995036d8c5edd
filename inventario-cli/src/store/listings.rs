//! Listings repository

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::services::provenance::models::ListingRecord;

/// List all listings in chronological order, with their entry counts.
pub async fn list_listings(pool: &SqlitePool) -> Result<Vec<ListingRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT
            l.id,
            l.year,
            l.source_sheet,
            COUNT(be.id) as entry_count
        FROM listings l
        LEFT JOIN book_entries be ON be.listing_id = l.id
        GROUP BY l.id
        ORDER BY l.id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list listings")?;

    let mut listings = Vec::new();
    for row in rows {
        listings.push(ListingRecord {
            id: row.try_get("id")?,
            year: row.try_get("year")?,
            source_sheet: row.try_get("source_sheet")?,
            entry_count: row.try_get("entry_count")?,
        });
    }

    Ok(listings)
}

/// Check whether a listing id is already present.
pub async fn listing_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM listings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to check listing existence")?;

    Ok(row.is_some())
}

/// The chronologically latest listing known to the store, if any.
///
/// Listing ids are the chronological sequence, so this is simply the
/// maximum id; the classifier takes it as its boundary instead of a
/// hardcoded constant.
pub async fn latest_listing_id(pool: &SqlitePool) -> Result<Option<i64>> {
    let (id,): (Option<i64>,) = sqlx::query_as("SELECT MAX(id) FROM listings")
        .fetch_one(pool)
        .await
        .context("Failed to get latest listing")?;

    Ok(id)
}

/// Next free listing id (sequence numbers start at 1).
pub async fn next_listing_id(pool: &SqlitePool) -> Result<i64> {
    Ok(latest_listing_id(pool).await?.unwrap_or(0) + 1)
}
