use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod excel;
mod services;
mod store;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import(args) => cli::commands::import::handle(args).await,
        Commands::List(args) => cli::commands::list::handle(args),
        Commands::Diff(args) => cli::commands::diff::handle(args).await,
        Commands::Book(args) => cli::commands::book::handle(args).await,
        Commands::Graph(args) => cli::commands::graph::handle(args).await,
        Commands::Backout(args) => cli::commands::backout::handle(args).await,
    }
}
