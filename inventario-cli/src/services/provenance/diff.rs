//! Identifier set diffing between two listings.
//!
//! The differ only ever looks at the external identifier of each entry.
//! Duplicate identifiers within one listing are legal (a data-quality
//! signal) and are grouped, never silently deduplicated.

use std::collections::{HashMap, HashSet};

use super::models::EntryRecord;

/// Result of diffing two listings' identifier sets.
///
/// The sets carry no iteration order; callers sort for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingDiff {
    /// Identifiers present in the new listing but not the old
    pub added: HashSet<String>,
    /// Identifiers present in the old listing but not the new
    pub removed: HashSet<String>,
    /// Identifiers present in both
    pub unchanged: HashSet<String>,
}

impl ListingDiff {
    /// Check if anything was added or removed
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Group a listing's entries by identifier, preserving source row order
/// within each group.
pub fn entries_by_id<'a>(entries: &'a [EntryRecord]) -> HashMap<&'a str, Vec<&'a EntryRecord>> {
    let mut groups: HashMap<&str, Vec<&EntryRecord>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.book_id.as_str()).or_default().push(entry);
    }
    groups
}

/// Compute added/removed/unchanged identifier sets between two listings.
///
/// Membership is decided on identifiers alone; entry content is never
/// inspected. Empty inputs yield empty sets.
pub fn diff_listings(old: &[EntryRecord], new: &[EntryRecord]) -> ListingDiff {
    let old_ids: HashSet<&str> = old.iter().map(|e| e.book_id.as_str()).collect();
    let new_ids: HashSet<&str> = new.iter().map(|e| e.book_id.as_str()).collect();

    ListingDiff {
        added: new_ids.difference(&old_ids).map(|id| id.to_string()).collect(),
        removed: old_ids.difference(&new_ids).map(|id| id.to_string()).collect(),
        unchanged: old_ids.intersection(&new_ids).map(|id| id.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(id: i64, book_id: &str, listing_id: i64, pos: i64) -> EntryRecord {
        EntryRecord {
            id,
            book_id: book_id.to_string(),
            listing_id,
            title: format!("Title {}", book_id),
            pos,
            lang: None,
            support: None,
            copy_error: false,
            identified: true,
        }
    }

    #[test]
    fn test_diff_added_removed_unchanged() {
        // Listing 1: [A, B]; Listing 2: [B, C]
        let old = vec![make_entry(1, "A", 1, 0), make_entry(2, "B", 1, 1)];
        let new = vec![make_entry(3, "B", 2, 0), make_entry(4, "C", 2, 1)];

        let diff = diff_listings(&old, &new);

        assert_eq!(diff.added, ["C".to_string()].into_iter().collect());
        assert_eq!(diff.removed, ["A".to_string()].into_iter().collect());
        assert_eq!(diff.unchanged, ["B".to_string()].into_iter().collect());
    }

    #[test]
    fn test_diff_against_self_is_all_unchanged() {
        let entries = vec![
            make_entry(1, "A", 1, 0),
            make_entry(2, "B", 1, 1),
            make_entry(3, "C", 1, 2),
        ];

        let diff = diff_listings(&entries, &entries);

        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.unchanged.len(), 3);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_diff_empty_inputs() {
        let entries = vec![make_entry(1, "A", 1, 0)];

        let diff = diff_listings(&[], &[]);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert!(diff.unchanged.is_empty());

        let diff = diff_listings(&[], &entries);
        assert_eq!(diff.added.len(), 1);
        assert!(diff.removed.is_empty());

        let diff = diff_listings(&entries, &[]);
        assert_eq!(diff.removed.len(), 1);
        assert!(diff.added.is_empty());
    }

    #[test]
    fn test_diff_set_properties() {
        let old = vec![
            make_entry(1, "A", 1, 0),
            make_entry(2, "B", 1, 1),
            make_entry(3, "D", 1, 2),
        ];
        let new = vec![
            make_entry(4, "B", 2, 0),
            make_entry(5, "C", 2, 1),
            make_entry(6, "D", 2, 2),
        ];

        let diff = diff_listings(&old, &new);

        // added and removed are disjoint
        assert!(diff.added.is_disjoint(&diff.removed));

        // added ∪ unchanged covers the new key set, removed ∪ unchanged the old
        let new_ids: HashSet<String> = new.iter().map(|e| e.book_id.clone()).collect();
        let old_ids: HashSet<String> = old.iter().map(|e| e.book_id.clone()).collect();
        assert_eq!(&diff.added | &diff.unchanged, new_ids);
        assert_eq!(&diff.removed | &diff.unchanged, old_ids);
    }

    #[test]
    fn test_duplicate_identifiers_are_grouped_not_deduplicated() {
        let entries = vec![
            make_entry(1, "A", 1, 0),
            make_entry(2, "A", 1, 1),
            make_entry(3, "B", 1, 2),
        ];

        let groups = entries_by_id(&entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["A"].len(), 2);
        // Source row order preserved within the group
        assert_eq!(groups["A"][0].pos, 0);
        assert_eq!(groups["A"][1].pos, 1);
        assert_eq!(groups["B"].len(), 1);
    }

    #[test]
    fn test_duplicates_count_once_for_membership() {
        let old = vec![make_entry(1, "A", 1, 0), make_entry(2, "A", 1, 1)];
        let new = vec![make_entry(3, "A", 2, 0)];

        let diff = diff_listings(&old, &new);

        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.unchanged, ["A".to_string()].into_iter().collect());
    }
}
