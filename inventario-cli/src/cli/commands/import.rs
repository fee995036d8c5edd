//! Import command handler

use anyhow::Result;
use colored::*;

use crate::cli::ImportArgs;
use crate::config::Config;
use crate::excel::{self, Workbook};
use crate::store;

pub async fn handle(args: ImportArgs) -> Result<()> {
    let config = Config::load()?;
    let db_path = config.database_path(args.db.as_deref())?;
    let pool = store::open(&db_path).await?;

    let mut workbook = Workbook::open(&args.file)?;
    println!("Reading: {}", args.file.display());

    let indexes: Vec<usize> = match args.sheet {
        Some(index) => {
            // Validate early so the error names the range
            workbook.sheet_name(index)?;
            vec![index]
        }
        None => (0..workbook.sheet_count()).collect(),
    };

    let mut next_id = store::listings::next_listing_id(&pool).await?;

    for index in indexes {
        let name = workbook.sheet_name(index)?.to_string();
        let rows = workbook.sheet_rows(index)?;
        let year = excel::sheet_year(&name).unwrap_or(next_id);

        let stats = store::import::import_listing(&pool, next_id, year, &name, &rows).await?;

        println!(
            "{} listing {} from sheet \"{}\": {} entries, {} new books{}",
            "Imported".bright_green(),
            stats.listing_id,
            name,
            stats.entries,
            stats.new_books,
            if stats.skipped_rows > 0 {
                format!(", {} rows without id skipped", stats.skipped_rows)
            } else {
                String::new()
            }
        );

        next_id += 1;
    }

    Ok(())
}
