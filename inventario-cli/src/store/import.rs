//! Atomic import of one parsed sheet as one listing.
//!
//! A listing is committed whole or not at all: the listing row, its
//! entries, any books created along the way and the refreshed
//! first/last-entry pointers all land in a single transaction.

use std::collections::BTreeSet;

use anyhow::{Context, Result, bail};
use sqlx::SqlitePool;

use crate::excel::reader::SheetRow;

/// Totals for one imported listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub listing_id: i64,
    pub entries: usize,
    pub new_books: usize,
    pub skipped_rows: usize,
}

/// Import a listing's parsed rows under the given sequence id.
///
/// Rows without an identifier cannot be matched across listings and are
/// skipped with a warning. Re-importing an existing listing id is an
/// error; nothing is written in that case.
pub async fn import_listing(
    pool: &SqlitePool,
    listing_id: i64,
    year: i64,
    source_sheet: &str,
    rows: &[SheetRow],
) -> Result<ImportStats> {
    if super::listings::listing_exists(pool, listing_id).await? {
        bail!(
            "Listing {} already imported; run backout before re-importing",
            listing_id
        );
    }

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("INSERT INTO listings (id, year, source_sheet) VALUES (?, ?, ?)")
        .bind(listing_id)
        .bind(year)
        .bind(source_sheet)
        .execute(&mut *tx)
        .await
        .context("Failed to insert listing")?;

    let mut stats = ImportStats {
        listing_id,
        ..Default::default()
    };
    let mut touched_books: BTreeSet<String> = BTreeSet::new();

    for row in rows {
        let Some(book_id) = row.id.as_deref() else {
            log::warn!(
                "Sheet \"{}\" line {}: row has no identifier, skipping",
                source_sheet,
                row.line
            );
            stats.skipped_rows += 1;
            continue;
        };

        // Get-or-create the book. A single untrustworthy appearance marks
        // the whole book as not identified.
        sqlx::query(
            r#"
            INSERT INTO books (id, identified) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET
                identified = MIN(books.identified, excluded.identified)
            "#,
        )
        .bind(book_id)
        .bind(row.identified as i64)
        .execute(&mut *tx)
        .await
        .context("Failed to upsert book")?;

        sqlx::query(
            r#"
            INSERT INTO book_entries
                (book_id, listing_id, title, pos, lang, support, copy_error)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(book_id)
        .bind(listing_id)
        .bind(&row.title)
        .bind(row.pos)
        .bind(&row.lang)
        .bind(&row.support)
        .bind(row.copy_error as i64)
        .execute(&mut *tx)
        .await
        .with_context(|| {
            format!(
                "Failed to insert entry for book {} (sheet \"{}\" line {})",
                book_id, source_sheet, row.line
            )
        })?;

        stats.entries += 1;
        touched_books.insert(book_id.to_string());
    }

    // Refresh first/last-entry pointers for every book this listing
    // touched, against the full history
    for book_id in &touched_books {
        let existed_before: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM book_entries WHERE book_id = ? AND listing_id != ?")
                .bind(book_id)
                .bind(listing_id)
                .fetch_one(&mut *tx)
                .await
                .context("Failed to check book history")?;
        if existed_before.0 == 0 {
            stats.new_books += 1;
        }

        sqlx::query(
            r#"
            UPDATE books SET
                first_entry = (
                    SELECT be.id FROM book_entries be
                    WHERE be.book_id = books.id
                    ORDER BY be.listing_id ASC, be.pos ASC
                    LIMIT 1
                ),
                last_entry = (
                    SELECT be.id FROM book_entries be
                    WHERE be.book_id = books.id
                    ORDER BY be.listing_id DESC, be.pos DESC
                    LIMIT 1
                )
            WHERE books.id = ?
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await
        .context("Failed to update first/last entry pointers")?;
    }

    tx.commit().await.context("Failed to commit transaction")?;

    log::info!(
        "Imported listing {} ({}): {} entries, {} new books, {} rows skipped",
        listing_id,
        source_sheet,
        stats.entries,
        stats.new_books,
        stats.skipped_rows
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provenance::{Lifecycle, classify_entries, diff_listings};
    use crate::store;

    fn make_row(pos: i64, id: Option<&str>, title: &str) -> SheetRow {
        SheetRow {
            pos,
            line: (pos + 2) as usize,
            id: id.map(|s| s.to_string()),
            title: title.to_string(),
            lang: None,
            support: None,
            copy_error: false,
            identified: true,
        }
    }

    #[tokio::test]
    async fn test_import_and_diff_two_listings() {
        let pool = store::open_in_memory().await.unwrap();

        let first = vec![make_row(0, Some("A"), "Alpha"), make_row(1, Some("B"), "Beta")];
        let second = vec![make_row(0, Some("B"), "Beta"), make_row(1, Some("C"), "Gamma")];

        let stats = import_listing(&pool, 1, 1787, "Inventario 1787", &first)
            .await
            .unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.new_books, 2);

        let stats = import_listing(&pool, 2, 1793, "Inventario 1793", &second)
            .await
            .unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.new_books, 1);

        let old = store::entries::entries_for_listing(&pool, 1).await.unwrap();
        let new = store::entries::entries_for_listing(&pool, 2).await.unwrap();
        let diff = diff_listings(&old, &new);

        assert_eq!(diff.added, ["C".to_string()].into_iter().collect());
        assert_eq!(diff.removed, ["A".to_string()].into_iter().collect());
        assert_eq!(diff.unchanged, ["B".to_string()].into_iter().collect());
    }

    #[tokio::test]
    async fn test_import_updates_first_last_pointers() {
        let pool = store::open_in_memory().await.unwrap();

        import_listing(&pool, 1, 1787, "s1", &[make_row(0, Some("A"), "Alpha")])
            .await
            .unwrap();
        import_listing(&pool, 2, 1793, "s2", &[make_row(0, Some("A"), "Alpha")])
            .await
            .unwrap();

        let book = store::books::get_book(&pool, "A").await.unwrap().unwrap();
        let entries = store::entries::all_entries(&pool).await.unwrap();

        assert_eq!(book.first_entry, Some(entries[0].id));
        assert_eq!(book.last_entry, Some(entries[1].id));
        assert!(book.first_entry != book.last_entry);
    }

    #[tokio::test]
    async fn test_reimporting_listing_id_is_rejected() {
        let pool = store::open_in_memory().await.unwrap();

        import_listing(&pool, 1, 1787, "s1", &[make_row(0, Some("A"), "Alpha")])
            .await
            .unwrap();
        let err = import_listing(&pool, 1, 1787, "s1", &[make_row(0, Some("B"), "Beta")])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("already imported"));
        // Nothing from the failed import leaked in
        assert_eq!(store::entries::count_entries(&pool).await.unwrap(), 1);
        assert_eq!(store::books::count_books(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rows_without_identifier_are_skipped() {
        let pool = store::open_in_memory().await.unwrap();

        let rows = vec![make_row(0, Some("A"), "Alpha"), make_row(1, None, "Sin ID")];
        let stats = import_listing(&pool, 1, 1787, "s1", &rows).await.unwrap();

        assert_eq!(stats.entries, 1);
        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(store::entries::count_entries(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unidentified_flag_sticks_to_book() {
        let pool = store::open_in_memory().await.unwrap();

        let mut flagged = make_row(0, Some("A"), "Alpha");
        flagged.identified = false;

        import_listing(&pool, 1, 1787, "s1", &[make_row(0, Some("A"), "Alpha")])
            .await
            .unwrap();
        import_listing(&pool, 2, 1793, "s2", &[flagged]).await.unwrap();

        let book = store::books::get_book(&pool, "A").await.unwrap().unwrap();
        assert!(!book.identified);
    }

    #[tokio::test]
    async fn test_classify_from_store_derives_latest_listing() {
        let pool = store::open_in_memory().await.unwrap();

        // X in 1 and 2, Y only in 1, three listings total
        import_listing(
            &pool,
            1,
            1787,
            "s1",
            &[make_row(0, Some("X"), "Equis"), make_row(1, Some("Y"), "Ygriega")],
        )
        .await
        .unwrap();
        import_listing(&pool, 2, 1793, "s2", &[make_row(0, Some("X"), "Equis")])
            .await
            .unwrap();
        import_listing(&pool, 3, 1801, "s3", &[make_row(0, Some("X"), "Equis")])
            .await
            .unwrap();

        let latest = store::listings::latest_listing_id(&pool).await.unwrap().unwrap();
        assert_eq!(latest, 3);

        let entries = store::entries::all_entries(&pool).await.unwrap();
        let categories = classify_entries(&entries, latest);

        let y_entry = entries.iter().find(|e| e.book_id == "Y").unwrap();
        // Y has a single entry: First even though it vanished
        assert_eq!(categories[&y_entry.id], Lifecycle::First);

        let x_last = entries
            .iter()
            .filter(|e| e.book_id == "X")
            .max_by_key(|e| e.listing_id)
            .unwrap();
        assert_eq!(categories[&x_last.id], Lifecycle::Plain);
    }

    #[tokio::test]
    async fn test_backout_empties_store() {
        let pool = store::open_in_memory().await.unwrap();

        import_listing(&pool, 1, 1787, "s1", &[make_row(0, Some("A"), "Alpha")])
            .await
            .unwrap();
        let stats = store::backout(&pool).await.unwrap();

        assert_eq!(stats.entries, 1);
        assert_eq!(stats.books, 1);
        assert_eq!(stats.listings, 1);
        assert_eq!(store::entries::count_entries(&pool).await.unwrap(), 0);
        assert_eq!(store::books::count_books(&pool).await.unwrap(), 0);
        assert!(store::listings::latest_listing_id(&pool).await.unwrap().is_none());
    }
}
