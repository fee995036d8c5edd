//! List command handler: print parsed workbook rows without importing

use anyhow::Result;

use crate::cli::ListArgs;
use crate::excel::Workbook;

pub fn handle(args: ListArgs) -> Result<()> {
    let mut workbook = Workbook::open(&args.file)?;
    println!("Reading: {}", args.file.display());

    let indexes: Vec<usize> = match args.sheet {
        Some(index) => {
            workbook.sheet_name(index)?;
            vec![index]
        }
        None => (0..workbook.sheet_count()).collect(),
    };

    for index in indexes {
        let name = workbook.sheet_name(index)?.to_string();
        let rows = workbook.sheet_rows(index)?;

        println!("\nSheet {}: \"{}\", {} entries\n", index, name, rows.len());

        for row in rows {
            let mut flags = String::new();
            if row.copy_error {
                flags.push_str(" [copy error]");
            }
            if !row.identified {
                flags.push_str(" [not identified]");
            }

            println!(
                "{}\t{}\t{}{}",
                row.pos,
                row.id.as_deref().unwrap_or("-"),
                row.title,
                flags
            );
        }
    }

    Ok(())
}
