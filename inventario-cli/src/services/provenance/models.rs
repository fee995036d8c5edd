//! In-memory records consumed by the provenance service

/// One appearance of one book within one listing.
///
/// Loaded from the store (or built straight from parsed sheet rows when
/// diffing a workbook without importing it). `book_id` is the externally
/// assigned identifier that stays stable across listings; `pos` is the
/// zero-based row position within the source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRecord {
    pub id: i64,
    pub book_id: String,
    pub listing_id: i64,
    pub title: String,
    pub pos: i64,
    pub lang: Option<String>,
    pub support: Option<String>,
    pub copy_error: bool,
    pub identified: bool,
}

/// One ingestion batch. The id is the chronological sequence number;
/// `year` is display metadata parsed from the source sheet name.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: i64,
    pub year: i64,
    pub source_sheet: Option<String>,
    pub entry_count: i64,
}

/// A physical book, tracked across listings by its external identifier.
///
/// `first_entry`/`last_entry` are entry row ids, not owned references, so
/// the book/entry cycle stays traversable from either side.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub id: String,
    pub identified: bool,
    pub first_entry: Option<i64>,
    pub last_entry: Option<i64>,
}
