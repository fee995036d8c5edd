//! Lifecycle classification of a book's appearances across listings.
//!
//! Every entry gets exactly one category, with precedence
//! First > Lost > Repeated > Plain:
//! - `First`: the chronologically earliest entry of its book
//! - `Lost`: the chronologically latest entry of a book with more than one
//!   entry, when that entry's listing is not the latest known listing
//! - `Repeated`: the book appears more than once within the same listing
//! - `Plain`: continuing presence
//!
//! The latest known listing is passed in explicitly; callers derive it from
//! the maximum listing id present in the store.

use std::collections::HashMap;

use serde::Serialize;

use super::models::EntryRecord;

/// Category of one entry within its book's history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    First,
    Lost,
    Repeated,
    Plain,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::First => "first",
            Lifecycle::Lost => "lost",
            Lifecycle::Repeated => "repeated",
            Lifecycle::Plain => "plain",
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the entries of a single book.
///
/// `entries` may arrive in any order; chronology is (listing id, row
/// position) ascending. Returns a map from entry id to category.
pub fn classify_book_entries(
    entries: &[EntryRecord],
    latest_listing: i64,
) -> HashMap<i64, Lifecycle> {
    let refs: Vec<&EntryRecord> = entries.iter().collect();
    let mut categories = HashMap::new();
    classify_group(&refs, latest_listing, &mut categories);
    categories
}

/// Classify entries of any number of books in one pass.
///
/// Groups by book identifier and classifies each book independently.
pub fn classify_entries(entries: &[EntryRecord], latest_listing: i64) -> HashMap<i64, Lifecycle> {
    let mut by_book: HashMap<&str, Vec<&EntryRecord>> = HashMap::new();
    for entry in entries {
        by_book.entry(entry.book_id.as_str()).or_default().push(entry);
    }

    let mut categories = HashMap::new();
    for group in by_book.values() {
        classify_group(group, latest_listing, &mut categories);
    }
    categories
}

fn classify_group(
    group: &[&EntryRecord],
    latest_listing: i64,
    categories: &mut HashMap<i64, Lifecycle>,
) {
    if group.is_empty() {
        return;
    }

    let mut sorted: Vec<&EntryRecord> = group.to_vec();
    sorted.sort_by_key(|e| (e.listing_id, e.pos));

    let mut per_listing: HashMap<i64, usize> = HashMap::new();
    for entry in &sorted {
        *per_listing.entry(entry.listing_id).or_insert(0) += 1;
    }

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];

    for entry in &sorted {
        let category = if entry.id == first.id {
            Lifecycle::First
        } else if entry.id == last.id && sorted.len() > 1 && last.listing_id != latest_listing {
            // The book disappeared before the most recent listing.
            // Single-entry books are exempt: their one entry is First.
            Lifecycle::Lost
        } else if per_listing[&entry.listing_id] > 1 {
            Lifecycle::Repeated
        } else {
            Lifecycle::Plain
        };

        log::debug!(
            "Entry {} (book {}, listing {}, pos {}): {}",
            entry.id,
            entry.book_id,
            entry.listing_id,
            entry.pos,
            category
        );
        categories.insert(entry.id, category);
    }
}
