//! Workbook access on top of calamine.
//!
//! One workbook holds one or more inventory sheets; each sheet becomes a
//! listing. Sheet names usually carry the inventory year ("Inventario
//! 1787"), which we pick up for display.

pub mod reader;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Sheets, open_workbook_auto};
use regex::Regex;

pub use reader::{SheetRow, parse_rows};

/// An open .xls/.xlsx workbook.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
    names: Vec<String>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;
        let names = sheets.sheet_names().to_vec();
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
            names,
        })
    }

    pub fn sheet_count(&self) -> usize {
        self.names.len()
    }

    /// Name of the sheet at a zero-based index, or an error naming the
    /// valid range.
    pub fn sheet_name(&self, index: usize) -> Result<&str> {
        match self.names.get(index) {
            Some(name) => Ok(name.as_str()),
            None => bail!(
                "Sheet index {} out of bounds (0, {}) in {}",
                index,
                self.names.len().saturating_sub(1),
                self.path.display()
            ),
        }
    }

    /// Parse the rows of one sheet into typed entries.
    pub fn sheet_rows(&mut self, index: usize) -> Result<Vec<SheetRow>> {
        let name = self.sheet_name(index)?.to_string();
        let range = self
            .sheets
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;

        let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
        parse_rows(&name, &rows)
    }
}

/// Extract the inventory year from a sheet name (first 4-digit run).
pub fn sheet_year(name: &str) -> Option<i64> {
    let re = Regex::new(r"(\d{4})").ok()?;
    let caps = re.captures(name)?;
    caps.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_year_from_name() {
        assert_eq!(sheet_year("Inventario 1787"), Some(1787));
        assert_eq!(sheet_year("1801 (copia)"), Some(1801));
        assert_eq!(sheet_year("Hoja1"), None);
        assert_eq!(sheet_year(""), None);
    }

    #[test]
    fn test_sheet_year_takes_first_run() {
        assert_eq!(sheet_year("Inventario 1787-1793"), Some(1787));
    }
}
