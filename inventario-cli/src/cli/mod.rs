//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "inventario",
    about = "Track books across yearly inventory listings",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import workbook sheets into the store as listings
    Import(ImportArgs),
    /// Print the parsed rows of a workbook without importing
    List(ListArgs),
    /// Show which books were added, removed or kept between two listings
    Diff(DiffArgs),
    /// Show the full history of one book across all listings
    Book(BookArgs),
    /// Render the provenance graph of every imported book
    Graph(GraphArgs),
    /// Delete every imported listing, book and entry
    Backout(BackoutArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Path to the .xls/.xlsx workbook
    pub file: PathBuf,

    /// Import only this zero-based sheet index
    #[arg(long)]
    pub sheet: Option<usize>,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Path to the .xls/.xlsx workbook
    pub file: PathBuf,

    /// Zero-based sheet index; all sheets when omitted
    pub sheet: Option<usize>,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Old listing id (or old sheet index with --file, default 0)
    pub old: Option<i64>,

    /// New listing id (or new sheet index with --file, default old + 1)
    pub new: Option<i64>,

    /// Diff two sheets of this workbook instead of imported listings
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args)]
pub struct BookArgs {
    /// External book identifier
    pub id: String,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "dot")]
    pub format: GraphFormat,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Graphviz DOT
    Dot,
    /// JSON graph description
    Json,
}

#[derive(Args)]
pub struct BackoutArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,

    /// Database path override
    #[arg(long)]
    pub db: Option<PathBuf>,
}
