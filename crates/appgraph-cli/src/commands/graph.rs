//! Property graph CLI commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use appgraph_graph::{GraphTarget, MemoryGraph};

use crate::config::AppConfig;
use crate::output;

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Load the applications table into the graph
    Migrate {
        /// Delete every node and relationship first (irreversible)
        #[arg(long)]
        clear: bool,

        /// Load into an in-memory graph instead of Neo4j and report the result
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every node and relationship in the graph
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Show node and relationship counts
    Status,

    /// Execute a Cypher query
    Query {
        /// Cypher query string
        query: String,
    },
}

pub async fn execute(cmd: GraphCommands, config: &AppConfig) -> Result<()> {
    match cmd {
        GraphCommands::Migrate { clear, dry_run } => cmd_migrate(config, clear, dry_run).await,
        GraphCommands::Wipe { yes } => cmd_wipe(config, yes).await,
        GraphCommands::Status => cmd_status(config).await,
        GraphCommands::Query { query } => cmd_query(config, &query).await,
    }
}

/// Load SQLite rows into Neo4j, or into memory for a dry run.
async fn cmd_migrate(config: &AppConfig, clear: bool, dry_run: bool) -> Result<()> {
    let pool = super::open_db(config)?;

    if dry_run {
        println!("{}", "Dry run: loading into an in-memory graph...".bold());
        let graph = MemoryGraph::new();
        let report = appgraph_graph::migrate_from_sqlite(&pool, &graph, false).await?;
        output::print_load_report(&report);

        let stats = appgraph_graph::queries::graph_statistics(&graph).await?;
        output::print_graph_statistics(&stats);
        return Ok(());
    }

    println!("{} {}", "Migrating to".bold(), config.graph.uri.cyan());
    let client = super::connect_graph(config).await?;
    appgraph_graph::schema::initialize_schema(&client).await?;

    if clear {
        println!("{}", "Clearing existing graph (--clear)...".yellow());
    }
    let report = appgraph_graph::migrate_from_sqlite(&pool, &client, clear).await?;
    output::print_load_report(&report);

    let counts = client.counts().await?;
    println!("  Graph now holds {} nodes, {} relationships", counts.nodes, counts.relationships);

    Ok(())
}

/// Wipe the graph. Refuses without --yes.
async fn cmd_wipe(config: &AppConfig, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This deletes every node and relationship and cannot be undone. Re-run with --yes.".yellow()
        );
        println!(
            "{}",
            "Migrations are idempotent, so a wipe is only needed to start from an empty graph.".dimmed()
        );
        return Ok(());
    }

    let client = super::connect_graph(config).await?;
    appgraph_graph::wipe(&client).await?;
    println!("{}", "✓ Graph wiped".green().bold());
    Ok(())
}

/// Execute a raw Cypher query.
async fn cmd_query(config: &AppConfig, cypher: &str) -> Result<()> {
    let client = super::connect_graph(config).await?;
    let results = appgraph_graph::queries::raw_query(&client, cypher).await?;
    output::print_json_rows(&results);
    Ok(())
}

/// Show graph status (node and relationship counts).
async fn cmd_status(config: &AppConfig) -> Result<()> {
    let client = super::connect_graph(config).await?;
    let stats = appgraph_graph::queries::graph_statistics(&client).await?;

    println!("{} {}", "Graph Status".bold(), config.graph.uri.dimmed());
    output::print_graph_statistics(&stats);
    Ok(())
}
