//! Runtime configuration.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags
//! 2. Environment variables (`NEO4J_*`, `SQLITE_DB_PATH`)
//! 3. `appgraph.toml`
//! 4. Compiled defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use appgraph_graph::GraphConfig;

pub const DEFAULT_CONFIG_FILE: &str = "appgraph.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sqlite_path: PathBuf,
    pub graph: GraphConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("applications.db"),
            graph: GraphConfig::default(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sqlite_path: Option<PathBuf>,
    pub neo4j_uri: Option<String>,
    pub neo4j_user: Option<String>,
    pub neo4j_password: Option<String>,
    pub neo4j_database: Option<String>,
}

impl AppConfig {
    /// Load configuration. A missing `config_file` is not an error unless it
    /// was named explicitly.
    pub fn load(config_file: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides, reading variables through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("SQLITE_DB_PATH") {
            self.sqlite_path = PathBuf::from(v);
        }
        if let Some(v) = var("NEO4J_URI") {
            self.graph.uri = v;
        }
        if let Some(v) = var("NEO4J_USER") {
            self.graph.user = v;
        }
        if let Some(v) = var("NEO4J_PASSWORD") {
            self.graph.password = v;
        }
        if let Some(v) = var("NEO4J_DATABASE") {
            self.graph.database = v;
        }
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(path) = &cli.sqlite_path {
            self.sqlite_path = path.clone();
        }
        if let Some(uri) = &cli.neo4j_uri {
            self.graph.uri = uri.clone();
        }
        if let Some(user) = &cli.neo4j_user {
            self.graph.user = user.clone();
        }
        if let Some(password) = &cli.neo4j_password {
            self.graph.password = password.clone();
        }
        if let Some(database) = &cli.neo4j_database {
            self.graph.database = database.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.sqlite_path, PathBuf::from("applications.db"));
        assert_eq!(config.graph.uri, "bolt://localhost:7687");
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            sqlite_path = "data/apps.db"

            [graph]
            uri = "bolt://graph:7687"
            "#,
        )
        .unwrap();
        assert_eq!(config.sqlite_path, PathBuf::from("data/apps.db"));
        assert_eq!(config.graph.uri, "bolt://graph:7687");
        assert_eq!(config.graph.user, "neo4j");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_toml("graph = 3").is_err());
    }

    #[test]
    fn test_env_then_cli_precedence() {
        let env: HashMap<&str, &str> = [("NEO4J_URI", "bolt://env:7687"), ("NEO4J_PASSWORD", "secret")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.graph.uri, "bolt://env:7687");
        assert_eq!(config.graph.password, "secret");

        config.apply_cli(&CliOverrides {
            neo4j_uri: Some("bolt://flag:7687".into()),
            ..Default::default()
        });
        assert_eq!(config.graph.uri, "bolt://flag:7687");
        assert_eq!(config.graph.password, "secret");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "sqlite_path = \"x.db\"\n").unwrap();

        let cli = CliOverrides {
            sqlite_path: Some(PathBuf::from("y.db")),
            ..Default::default()
        };
        let config = AppConfig::load(Some(&path), &cli).unwrap();
        assert_eq!(config.sqlite_path, PathBuf::from("y.db"));

        assert!(AppConfig::load(Some(&dir.path().join("missing.toml")), &cli).is_err());
    }
}
