//! Graph command handler: render the provenance graph as DOT or JSON.

use anyhow::{Context, Result, bail};
use colored::*;

use crate::cli::{GraphArgs, GraphFormat};
use crate::config::Config;
use crate::services::provenance::{Lifecycle, ProvenanceGraph, build_graph};
use crate::store;

pub async fn handle(args: GraphArgs) -> Result<()> {
    let config = Config::load()?;
    let db_path = config.database_path(args.db.as_deref())?;
    let pool = store::open(&db_path).await?;

    let Some(latest) = store::listings::latest_listing_id(&pool).await? else {
        bail!("Nothing imported yet; run import first");
    };

    let entries = store::entries::all_entries(&pool).await?;
    let graph = build_graph(&entries, latest, config.label_width());

    log::info!(
        "Built provenance graph: {} nodes, {} edges, {} listings",
        graph.nodes.len(),
        graph.edges.len(),
        graph.ranks.len()
    );

    let rendered = match args.format {
        GraphFormat::Dot => to_dot(&graph),
        GraphFormat::Json => {
            serde_json::to_string_pretty(&graph).context("Failed to serialize graph")?
        }
    };

    if let Some(output) = &args.output {
        std::fs::write(output, &rendered)
            .with_context(|| format!("Failed to write graph to: {}", output.display()))?;
        println!(
            "{} graph to {}",
            "Wrote".bright_green(),
            output.display()
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn dot_color(category: Lifecycle) -> &'static str {
    match category {
        Lifecycle::First => "palegreen",
        Lifecycle::Lost => "lightcoral",
        Lifecycle::Repeated => "orange",
        Lifecycle::Plain => "lightgrey",
    }
}

fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render the graph description as Graphviz DOT. Listings flow left to
/// right; each listing's entries share a rank.
pub fn to_dot(graph: &ProvenanceGraph) -> String {
    let mut dot = String::new();
    dot.push_str("digraph provenance {\n");
    dot.push_str("    rankdir=LR;\n");
    dot.push_str("    node [shape=box, style=filled];\n\n");

    for node in &graph.nodes {
        dot.push_str(&format!(
            "    \"{}\" [label=\"{}\", fillcolor={}, group=\"{}\"];\n",
            node.id,
            dot_escape(&node.label),
            dot_color(node.category),
            dot_escape(&node.book),
        ));
    }

    dot.push('\n');
    for rank in &graph.ranks {
        dot.push_str("    { rank=same;");
        for entry in &rank.entries {
            dot.push_str(&format!(" \"{}\";", entry));
        }
        dot.push_str(" }\n");
    }

    dot.push('\n');
    for edge in &graph.edges {
        dot.push_str(&format!("    \"{}\" -> \"{}\";\n", edge.from, edge.to));
    }

    dot.push_str("}\n");
    dot
}
