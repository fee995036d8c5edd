//! Backout command handler: confirmed whole-store deletion.

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;

use crate::cli::BackoutArgs;
use crate::config::Config;
use crate::store;

pub async fn handle(args: BackoutArgs) -> Result<()> {
    let config = Config::load()?;
    let db_path = config.database_path(args.db.as_deref())?;
    let pool = store::open(&db_path).await?;

    let listings = store::listings::list_listings(&pool).await?;
    let books = store::books::count_books(&pool).await?;
    let entries = store::entries::count_entries(&pool).await?;

    if listings.is_empty() && books == 0 && entries == 0 {
        println!("Store is already empty");
        return Ok(());
    }

    println!(
        "About to delete {} listings, {} books and {} entries from {}",
        listings.len(),
        books,
        entries,
        db_path.display()
    );
    for listing in &listings {
        println!(
            "  listing {} ({}): {} entries",
            listing.id,
            listing
                .source_sheet
                .as_deref()
                .unwrap_or("unknown sheet"),
            listing.entry_count
        );
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete everything?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    let stats = store::backout(&pool).await?;

    println!(
        "{} {} entries, {} books, {} listings",
        "Removed".bright_red(),
        stats.entries,
        stats.books,
        stats.listings
    );

    Ok(())
}
