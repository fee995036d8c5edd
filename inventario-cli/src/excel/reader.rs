//! Row parsing for inventory sheets.
//!
//! The first row is the header; columns are keyed by header text. The
//! recognized headers come from the historical inventory spreadsheets:
//! - "ID": external book identifier
//! - "TEMA": title
//! - "IDIOMA": language
//! - "SOPORTE": physical support/format
//! - "ERROR DE COPIA": copy/transcription error flag
//! - "NO IDENTIFICADO": cataloguing metadata is not trustworthy

use std::collections::HashMap;

use anyhow::{Result, bail};
use calamine::Data;

pub const ID: &str = "ID";
pub const TITLE: &str = "TEMA";
pub const LANG: &str = "IDIOMA";
pub const SUPPORT: &str = "SOPORTE";
pub const COPY_ERROR: &str = "ERROR DE COPIA";
pub const UNIDENTIFIED: &str = "NO IDENTIFICADO";

/// One parsed data row of an inventory sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetRow {
    /// Zero-based position among parsed rows (ingestion order)
    pub pos: i64,
    /// 1-based line in the source sheet, for error reporting
    pub line: usize,
    /// External identifier; rows without one cannot be imported
    pub id: Option<String>,
    pub title: String,
    pub lang: Option<String>,
    pub support: Option<String>,
    pub copy_error: bool,
    pub identified: bool,
}

/// Normalize a cell to text: trimmed, integral floats rendered as
/// integers (xls numeric cells), blanks collapsed to None.
fn cell_to_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => return None,
    };

    if text.is_empty() { None } else { Some(text) }
}

/// Flag columns are marked with anything non-empty ("X", "si", "1"...);
/// an explicit negative still counts as unset.
fn cell_to_flag(cell: &Data) -> bool {
    match cell_to_text(cell) {
        None => false,
        Some(text) => !matches!(text.to_lowercase().as_str(), "no" | "0" | "false"),
    }
}

/// Parse the raw rows of one sheet (header row first) into typed entries.
///
/// A data row wider than the header is a fatal parse error for the whole
/// sheet, reported with sheet name and 1-based line number.
pub fn parse_rows(sheet_name: &str, rows: &[Vec<Data>]) -> Result<Vec<SheetRow>> {
    let Some(header_row) = rows.first() else {
        return Ok(Vec::new());
    };

    let headers: Vec<Option<String>> = header_row.iter().map(cell_to_text).collect();
    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.as_deref().map(|h| (h, i)))
        .collect();

    let cell = |row: &[Data], name: &str| -> Option<String> {
        columns.get(name).and_then(|&i| row.get(i)).and_then(cell_to_text)
    };
    let flag = |row: &[Data], name: &str| -> bool {
        columns
            .get(name)
            .and_then(|&i| row.get(i))
            .is_some_and(cell_to_flag)
    };

    let mut parsed = Vec::new();
    for (line, row) in rows.iter().enumerate().skip(1) {
        // calamine pads short rows with empty cells; anything non-empty
        // past the header means the row and header differ in size
        if row.len() > headers.len()
            && row[headers.len()..].iter().any(|c| cell_to_text(c).is_some())
        {
            bail!(
                "Error while parsing \"{}\" line {}: row is wider than the header",
                sheet_name,
                line + 1
            );
        }

        // Skip fully empty rows
        if row.iter().all(|c| cell_to_text(c).is_none()) {
            continue;
        }

        parsed.push(SheetRow {
            pos: parsed.len() as i64,
            line: line + 1,
            id: cell(row, ID),
            title: cell(row, TITLE).unwrap_or_default(),
            lang: cell(row, LANG),
            support: cell(row, SUPPORT),
            copy_error: flag(row, COPY_ERROR),
            identified: !flag(row, UNIDENTIFIED),
        });
    }

    Ok(parsed)
}
