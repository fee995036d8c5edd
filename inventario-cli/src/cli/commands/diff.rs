//! Diff command handler.
//!
//! Compares two imported listings by id, or two sheets of a workbook
//! directly with `--file` (no store involved).

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Result, bail};
use colored::*;

use crate::cli::DiffArgs;
use crate::config::Config;
use crate::excel::{SheetRow, Workbook};
use crate::services::provenance::{EntryRecord, diff_listings, entries_by_id};
use crate::store;

pub async fn handle(args: DiffArgs) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let (old, new, old_name, new_name) = if let Some(file) = &args.file {
        load_from_workbook(file, args.old, args.new)?
    } else {
        load_from_store(&args).await?
    };

    println!("{}: {} entries", old_name, old.len());
    println!("{}: {} entries", new_name, new.len());

    let diff = diff_listings(&old, &new);
    let old_by_id = entries_by_id(&old);
    let new_by_id = entries_by_id(&new);

    println!("\nAdded: {}", diff.added.len());
    for id in sorted_ids(&diff.added) {
        println!("{}", format!("{}\t{}", id, first_title(&new_by_id, id)).green());
    }

    println!("\nRemoved: {}", diff.removed.len());
    for id in sorted_ids(&diff.removed) {
        println!("{}", format!("{}\t{}", id, first_title(&old_by_id, id)).red());
    }

    println!("\nUnchanged: {}", diff.unchanged.len());
    for id in sorted_ids(&diff.unchanged) {
        println!(
            "{}\t{}\t|\t{}",
            id,
            first_title(&old_by_id, id),
            first_title(&new_by_id, id)
        );
    }

    if !diff.has_changes() {
        println!("\nNo books were added or removed");
    }

    Ok(())
}

type DiffInput = (Vec<EntryRecord>, Vec<EntryRecord>, String, String);

/// Diff two sheets of a workbook without importing them. Sheet indexes
/// default to 0 and old + 1, like the listing year columns read left to
/// right.
fn load_from_workbook(path: &Path, old: Option<i64>, new: Option<i64>) -> Result<DiffInput> {
    let mut workbook = Workbook::open(path)?;
    println!("Reading: {}", path.display());

    let old_index = match old {
        Some(i) if i >= 0 => i as usize,
        Some(i) => bail!("Sheet index {} is negative", i),
        None => 0,
    };
    let new_index = match new {
        Some(i) if i >= 0 => i as usize,
        Some(i) => bail!("Sheet index {} is negative", i),
        None => old_index + 1,
    };

    let old_name = workbook.sheet_name(old_index)?.to_string();
    let new_name = workbook.sheet_name(new_index)?.to_string();

    let old_rows = workbook.sheet_rows(old_index)?;
    let new_rows = workbook.sheet_rows(new_index)?;

    Ok((
        rows_to_entries(&old_rows, old_index as i64),
        rows_to_entries(&new_rows, new_index as i64),
        format!("Sheet {} (\"{}\")", old_index, old_name),
        format!("Sheet {} (\"{}\")", new_index, new_name),
    ))
}

async fn load_from_store(args: &DiffArgs) -> Result<DiffInput> {
    let (Some(old_id), Some(new_id)) = (args.old, args.new) else {
        bail!("Provide two listing ids, or --file <workbook> to diff sheets directly");
    };

    let config = Config::load()?;
    let db_path = config.database_path(args.db.as_deref())?;
    let pool = store::open(&db_path).await?;

    for id in [old_id, new_id] {
        if !store::listings::listing_exists(&pool, id).await? {
            let known: Vec<String> = store::listings::list_listings(&pool)
                .await?
                .iter()
                .map(|l| l.id.to_string())
                .collect();
            bail!(
                "Listing {} not found (imported listings: {})",
                id,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            );
        }
    }

    let old = store::entries::entries_for_listing(&pool, old_id).await?;
    let new = store::entries::entries_for_listing(&pool, new_id).await?;

    Ok((
        old,
        new,
        format!("Listing {}", old_id),
        format!("Listing {}", new_id),
    ))
}

/// Turn parsed sheet rows into entry records the differ understands.
/// Rows without an identifier cannot be matched and are left out.
fn rows_to_entries(rows: &[SheetRow], listing_id: i64) -> Vec<EntryRecord> {
    rows.iter()
        .filter_map(|row| {
            let book_id = row.id.clone()?;
            Some(EntryRecord {
                // Synthetic id; the differ only ever looks at book_id
                id: listing_id * 1_000_000 + row.pos,
                book_id,
                listing_id,
                title: row.title.clone(),
                pos: row.pos,
                lang: row.lang.clone(),
                support: row.support.clone(),
                copy_error: row.copy_error,
                identified: row.identified,
            })
        })
        .collect()
}

/// Title of the first source row bearing this identifier.
fn first_title<'a>(groups: &HashMap<&str, Vec<&'a EntryRecord>>, id: &str) -> &'a str {
    groups
        .get(id)
        .and_then(|entries| entries.first())
        .map(|e| e.title.as_str())
        .unwrap_or("")
}

/// Sort identifiers numerically when they all parse, lexicographically
/// otherwise, so "10" lands after "2" in the usual case.
fn sorted_ids(ids: &HashSet<String>) -> Vec<&String> {
    let mut sorted: Vec<&String> = ids.iter().collect();
    sorted.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    });
    sorted
}
