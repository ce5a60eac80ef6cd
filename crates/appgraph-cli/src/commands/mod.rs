//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use appgraph_core::AppGraphError;
use appgraph_graph::GraphClient;

use crate::config::{AppConfig, CliOverrides};

pub mod catalog;
pub mod db;
pub mod graph;

/// Neo4j connections that take longer than this are treated as unreachable.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// AppGraph - applications inventory as a property graph
#[derive(Parser)]
#[command(name = "appgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to ./appgraph.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database holding the applications table
    #[arg(long, global = true, env = "SQLITE_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Neo4j bolt URI
    #[arg(long, global = true, env = "NEO4J_URI")]
    pub neo4j_uri: Option<String>,

    /// Neo4j user
    #[arg(long, global = true, env = "NEO4J_USER")]
    pub neo4j_user: Option<String>,

    /// Neo4j password
    #[arg(long, global = true, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub neo4j_password: Option<String>,

    /// Neo4j database name
    #[arg(long, global = true, env = "NEO4J_DATABASE")]
    pub neo4j_database: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Relational source (SQLite) commands
    #[command(subcommand)]
    Db(db::DbCommands),

    /// Property graph (Neo4j) commands
    #[command(subcommand)]
    Graph(graph::GraphCommands),

    /// Consumer query catalog
    #[command(subcommand)]
    Catalog(catalog::CatalogCommands),
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            sqlite_path: self.db.clone(),
            neo4j_uri: self.neo4j_uri.clone(),
            neo4j_user: self.neo4j_user.clone(),
            neo4j_password: self.neo4j_password.clone(),
            neo4j_database: self.neo4j_database.clone(),
        }
    }

    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref(), &self.overrides())?;
        debug!(sqlite = %config.sqlite_path.display(), neo4j = %config.graph.uri, "Configuration loaded");

        match self.command {
            Commands::Db(cmd) => db::execute(cmd, &config).await,
            Commands::Graph(cmd) => graph::execute(cmd, &config).await,
            Commands::Catalog(cmd) => catalog::execute(cmd, &config).await,
        }
    }
}

/// Open the SQLite source, creating the schema if needed.
pub(crate) fn open_db(config: &AppConfig) -> Result<appgraph_db::DbPool> {
    appgraph_db::init_pool(&config.sqlite_path)
        .with_context(|| format!("Failed to open {}", config.sqlite_path.display()))
}

/// Connect to Neo4j, failing fast when the server does not answer.
/// Failures are [`AppGraphError::GraphUnavailable`].
pub(crate) async fn connect_graph(config: &AppConfig) -> Result<GraphClient> {
    let client = tokio::time::timeout(CONNECT_TIMEOUT, GraphClient::open(&config.graph))
        .await
        .map_err(|_| {
            AppGraphError::GraphUnavailable(format!(
                "timed out after {}s connecting to {}",
                CONNECT_TIMEOUT.as_secs(),
                config.graph.uri
            ))
        })??;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_uri_scheme_is_graph_unavailable() {
        let mut config = AppConfig::default();
        config.graph.uri = "http://localhost:7687".to_string();

        let err = match connect_graph(&config).await {
            Ok(_) => panic!("connected over an unsupported scheme"),
            Err(err) => err,
        };
        assert!(matches!(
            err.downcast_ref::<AppGraphError>(),
            Some(AppGraphError::GraphUnavailable(_))
        ));
    }
}
