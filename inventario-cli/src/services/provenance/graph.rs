//! Provenance graph construction.
//!
//! Every entry becomes a node; for each book, every entry in a listing is
//! connected to every entry of the same book in the next listing where the
//! book appears (full bipartite connection when a book is repeated within
//! a listing). Entries of the same listing form a same-rank set so a
//! renderer can align them.

use std::collections::BTreeMap;

use serde::Serialize;

use super::lifecycle::{Lifecycle, classify_entries};
use super::models::EntryRecord;

/// Default wrap width (in characters) for node labels.
pub const DEFAULT_LABEL_WIDTH: usize = 16;

/// One node per entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    /// Entry id
    pub id: i64,
    /// Truncated, line-wrapped title
    pub label: String,
    /// Lifecycle category driving the node color
    pub category: Lifecycle,
    /// Owning book identifier
    pub book: String,
}

/// Directed edge between two appearances of the same book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: i64,
    pub to: i64,
}

/// Same-rank set: all entries of one listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListingRank {
    pub listing: i64,
    pub entries: Vec<i64>,
}

/// Fully materialized graph description, ready for a renderer.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProvenanceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub ranks: Vec<ListingRank>,
}

/// Build the provenance graph over all entries of all listings.
///
/// Iteration is deterministic (books by identifier, listings ascending,
/// entries by row position) so rendered output is stable across runs.
pub fn build_graph(
    entries: &[EntryRecord],
    latest_listing: i64,
    label_width: usize,
) -> ProvenanceGraph {
    let categories = classify_entries(entries, latest_listing);

    let mut ordered: Vec<&EntryRecord> = entries.iter().collect();
    ordered.sort_by_key(|e| (e.listing_id, e.pos));

    let nodes = ordered
        .iter()
        .map(|e| GraphNode {
            id: e.id,
            label: node_label(&e.title, label_width),
            category: categories.get(&e.id).copied().unwrap_or(Lifecycle::Plain),
            book: e.book_id.clone(),
        })
        .collect();

    let mut ranks: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for entry in &ordered {
        ranks.entry(entry.listing_id).or_default().push(entry.id);
    }

    // Group each book's entries by listing, listings ascending. Linking
    // always targets the previous listing in which the book appears, so
    // listings the book skipped never produce dangling edges.
    let mut by_book: BTreeMap<&str, BTreeMap<i64, Vec<&EntryRecord>>> = BTreeMap::new();
    for entry in &ordered {
        by_book
            .entry(entry.book_id.as_str())
            .or_default()
            .entry(entry.listing_id)
            .or_default()
            .push(entry);
    }

    let mut edges = Vec::new();
    for listings in by_book.values() {
        let mut previous: Option<&Vec<&EntryRecord>> = None;
        for group in listings.values() {
            if let Some(prev) = previous {
                for from in prev {
                    for to in group {
                        edges.push(GraphEdge {
                            from: from.id,
                            to: to.id,
                        });
                    }
                }
            }
            previous = Some(group);
        }
    }

    ProvenanceGraph {
        nodes,
        edges,
        ranks: ranks
            .into_iter()
            .map(|(listing, entries)| ListingRank { listing, entries })
            .collect(),
    }
}

/// Build a display label: whitespace collapsed, truncated to three wrapped
/// lines worth of characters, then greedily word-wrapped.
fn node_label(title: &str, width: usize) -> String {
    let width = width.max(1);
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");

    let max_chars = width * 3;
    let truncated = if collapsed.chars().count() > max_chars {
        let mut cut: String = collapsed.chars().take(max_chars - 1).collect();
        // Don't leave a dangling space before the ellipsis
        while cut.ends_with(' ') {
            cut.pop();
        }
        cut.push('…');
        cut
    } else {
        collapsed
    };

    wrap_words(&truncated, width)
}

fn wrap_words(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
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

    fn edge(from: i64, to: i64) -> GraphEdge {
        GraphEdge { from, to }
    }

    #[test]
    fn test_single_entry_book_has_one_node_no_edges() {
        let entries = vec![make_entry(1, "X", 1, 0)];

        let graph = build_graph(&entries, 3, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes[0].category, Lifecycle::First);
        assert_eq!(graph.nodes[0].book, "X");
    }

    #[test]
    fn test_chain_connects_consecutive_appearances() {
        let entries = vec![
            make_entry(1, "X", 1, 0),
            make_entry(2, "X", 2, 0),
            make_entry(3, "X", 3, 0),
        ];

        let graph = build_graph(&entries, 3, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.edges, vec![edge(1, 2), edge(2, 3)]);
    }

    #[test]
    fn test_skipped_listing_links_to_next_appearance() {
        // Book absent from listing 2: edge goes straight from 1 to 3
        let entries = vec![make_entry(1, "X", 1, 0), make_entry(2, "X", 3, 0)];

        let graph = build_graph(&entries, 3, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.edges, vec![edge(1, 2)]);
    }

    #[test]
    fn test_repeated_book_gets_full_bipartite_connection() {
        // 2 entries in listing 1, 2 entries in listing 2: 4 edges in,
        // |previous group| * |current group|
        let entries = vec![
            make_entry(1, "X", 1, 0),
            make_entry(2, "X", 1, 1),
            make_entry(3, "X", 2, 0),
            make_entry(4, "X", 2, 1),
        ];

        let graph = build_graph(&entries, 2, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.edges.len(), 4);
        for from in [1, 2] {
            for to in [3, 4] {
                assert!(graph.edges.contains(&edge(from, to)));
            }
        }
    }

    #[test]
    fn test_books_do_not_cross_connect() {
        let entries = vec![
            make_entry(1, "X", 1, 0),
            make_entry(2, "Y", 1, 1),
            make_entry(3, "X", 2, 0),
            make_entry(4, "Y", 2, 1),
        ];

        let graph = build_graph(&entries, 2, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.contains(&edge(1, 3)));
        assert!(graph.edges.contains(&edge(2, 4)));
    }

    #[test]
    fn test_ranks_group_entries_per_listing() {
        let entries = vec![
            make_entry(1, "X", 1, 0),
            make_entry(2, "Y", 1, 1),
            make_entry(3, "X", 2, 0),
        ];

        let graph = build_graph(&entries, 2, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.ranks.len(), 2);
        assert_eq!(graph.ranks[0].listing, 1);
        assert_eq!(graph.ranks[0].entries, vec![1, 2]);
        assert_eq!(graph.ranks[1].listing, 2);
        assert_eq!(graph.ranks[1].entries, vec![3]);
    }

    #[test]
    fn test_nodes_carry_lifecycle_categories() {
        let entries = vec![make_entry(1, "Y", 1, 0), make_entry(2, "Y", 2, 0)];

        let graph = build_graph(&entries, 3, DEFAULT_LABEL_WIDTH);

        assert_eq!(graph.nodes[0].category, Lifecycle::First);
        assert_eq!(graph.nodes[1].category, Lifecycle::Lost);
    }

    #[test]
    fn test_empty_input_yields_empty_graph() {
        let graph = build_graph(&[], 1, DEFAULT_LABEL_WIDTH);

        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.ranks.is_empty());
    }

    #[test]
    fn test_node_label_wraps_words() {
        assert_eq!(node_label("Arte de la lengua", 8), "Arte de\nla\nlengua");
        assert_eq!(node_label("Breviario", 16), "Breviario");
    }

    #[test]
    fn test_node_label_truncates_long_titles() {
        let title = "Historia general de las cosas de la Nueva España en doce libros";
        let label = node_label(title, 10);

        assert!(label.ends_with('…'));
        // Truncated to at most three lines worth of characters
        assert!(label.replace('\n', " ").chars().count() <= 30);
        assert!(label.lines().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_node_label_collapses_whitespace() {
        assert_eq!(node_label("  Libro   de  horas ", 20), "Libro de horas");
    }
}
