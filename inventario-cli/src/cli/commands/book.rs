//! Book command handler: the full provenance of a single book.

use anyhow::{Result, bail};
use colored::*;

use crate::cli::BookArgs;
use crate::config::Config;
use crate::services::provenance::{Lifecycle, classify_book_entries};
use crate::store;

pub async fn handle(args: BookArgs) -> Result<()> {
    let config = Config::load()?;
    let db_path = config.database_path(args.db.as_deref())?;
    let pool = store::open(&db_path).await?;

    let Some(book) = store::books::get_book(&pool, &args.id).await? else {
        bail!("No book with identifier \"{}\" in the store", args.id);
    };

    let entries = store::entries::entries_for_book(&pool, &args.id).await?;
    let latest = store::listings::latest_listing_id(&pool).await?.unwrap_or(0);
    let categories = classify_book_entries(&entries, latest);

    println!(
        "Book {}{}: {} {}",
        book.id,
        if book.identified {
            String::new()
        } else {
            " (not identified)".to_string()
        },
        entries.len(),
        if entries.len() == 1 { "entry" } else { "entries" }
    );

    for entry in &entries {
        let category = categories
            .get(&entry.id)
            .copied()
            .unwrap_or(Lifecycle::Plain);

        let mut details = Vec::new();
        if let Some(lang) = &entry.lang {
            details.push(lang.clone());
        }
        if let Some(support) = &entry.support {
            details.push(support.clone());
        }
        let details = if details.is_empty() {
            String::new()
        } else {
            format!(" [{}]", details.join(", "))
        };

        let line = format!(
            "  listing {} (pos {}): {}{}{} - {}",
            entry.listing_id,
            entry.pos,
            entry.title,
            details,
            if entry.copy_error { " [copy error]" } else { "" },
            category
        );

        match category {
            Lifecycle::First => println!("{}", line.green()),
            Lifecycle::Lost => println!("{}", line.red()),
            Lifecycle::Repeated => println!("{}", line.yellow()),
            Lifecycle::Plain => println!("{}", line),
        }
    }

    if let (Some(first), Some(last)) = (book.first_entry, book.last_entry) {
        let first_listing = entries.iter().find(|e| e.id == first).map(|e| e.listing_id);
        let last_listing = entries.iter().find(|e| e.id == last).map(|e| e.listing_id);
        if let (Some(first_listing), Some(last_listing)) = (first_listing, last_listing) {
            println!(
                "First recorded in listing {}, last in listing {}",
                first_listing, last_listing
            );
        }
    }

    Ok(())
}
