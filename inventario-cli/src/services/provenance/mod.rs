// Provenance service for listing diffs, lifecycle classification and the
// provenance graph
//
// This service provides pure business logic over pre-loaded entry
// collections, decoupled from the spreadsheet parser and the store.

pub mod diff;
pub mod graph;
pub mod lifecycle;
pub mod models;

// Re-export commonly used types
pub use diff::{ListingDiff, diff_listings, entries_by_id};
pub use graph::{GraphEdge, GraphNode, ListingRank, ProvenanceGraph, build_graph};
pub use lifecycle::{Lifecycle, classify_book_entries, classify_entries};
pub use models::EntryRecord;
