//! Neo4j connection client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{BoltType, ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use appgraph_core::{AppGraphError, AppGraphResult};

use crate::model::{NodeKey, NodeRef, Properties, PropertyValue, RelType};
use crate::target::{GraphBreakdown, GraphCounts, GraphTarget};

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Client for the Neo4j graph store.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// neo4rs builds its pool lazily, so `Graph::connect` alone never touches
    /// the server. A `RETURN 1` ping forces the bolt handshake, which makes an
    /// unreachable server fail here instead of on the first write.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(4)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .with_context(|| format!("Neo4j at {} is not responding to queries", config.uri))?;

        Ok(Self { graph })
    }

    /// Like [`GraphClient::connect`], but reports failure as
    /// [`AppGraphError::GraphUnavailable`].
    pub async fn open(config: &GraphConfig) -> AppGraphResult<Self> {
        Self::connect(config)
            .await
            .map_err(|e| AppGraphError::GraphUnavailable(format!("{:#}", e)))
    }

    /// Execute a Cypher query that returns no results.
    pub async fn execute(&self, query: Query) -> Result<()> {
        self.graph.run(query).await.context("Neo4j query execution failed")?;
        Ok(())
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(query).await.context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.context("Failed to read Neo4j result row")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> Result<Option<T>> {
        let rows = self.query(query).await?;
        if let Some(row) = rows.into_iter().next() {
            let val: T = row
                .get(field)
                .map_err(|e| anyhow::anyhow!("Failed to get field '{}': {:?}", field, e))?;
            Ok(Some(val))
        } else {
            Ok(None)
        }
    }

    /// Get node and relationship counts for status display.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        let node_query = Query::new("MATCH (n) RETURN count(n) AS count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) AS count".to_string());

        let node_count: i64 = self.query_scalar(node_query, "count").await?.unwrap_or(0);
        let rel_count: i64 = self.query_scalar(rel_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: node_count as usize,
            relationships: rel_count as usize,
        })
    }

    /// Count nodes per label and relationships per type.
    pub async fn get_breakdown(&self) -> Result<GraphBreakdown> {
        let labels = Query::new(
            "MATCH (n) UNWIND labels(n) AS label
             RETURN label AS key, count(*) AS count ORDER BY key"
                .to_string(),
        );
        let rels = Query::new(
            "MATCH ()-[r]->() RETURN type(r) AS key, count(r) AS count ORDER BY key".to_string(),
        );

        Ok(GraphBreakdown {
            labels: key_counts(self.query(labels).await?),
            relationships: key_counts(self.query(rels).await?),
        })
    }
}

fn key_counts(rows: Vec<neo4rs::Row>) -> Vec<(String, usize)> {
    rows.into_iter()
        .filter_map(|row| {
            let key: String = row.get("key").ok()?;
            let count: i64 = row.get("count").unwrap_or(0);
            Some((key, count as usize))
        })
        .collect()
}

/// A Cypher statement with its parameters, before it is bound to a neo4rs `Query`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub cypher: String,
    pub params: Vec<(String, PropertyValue)>,
}

impl Statement {
    pub fn into_query(self) -> Query {
        let mut query = Query::new(self.cypher);
        for (name, value) in self.params {
            if let Some(bolt) = bolt_value(value) {
                query = query.param(&name, bolt);
            }
        }
        query
    }
}

fn bolt_value(value: PropertyValue) -> Option<BoltType> {
    match value {
        PropertyValue::Null => None,
        PropertyValue::Bool(b) => Some(b.into()),
        PropertyValue::Int(i) => Some(i.into()),
        PropertyValue::Float(f) => Some(f.into()),
        PropertyValue::Text(s) => Some(s.into()),
        PropertyValue::List(items) => Some(items.into()),
    }
}

fn key_value(key: &NodeKey) -> PropertyValue {
    match key {
        NodeKey::AppId(id) => PropertyValue::Int(*id),
        NodeKey::Name(name) => PropertyValue::Text(name.clone()),
    }
}

/// `MERGE` on `(label, key)`, then `SET` every writable property. Nulls are written
/// as literals since neo4rs params cannot carry them; `SET n.x = null`
/// removes `x`.
pub fn node_statement(node: &NodeRef, properties: &Properties) -> Statement {
    let key = node.key.property();
    let mut cypher = format!("MERGE (n:{} {{{}: $key}})", node.label, key);
    let mut params = vec![("key".to_string(), key_value(&node.key))];

    let mut assignments = Vec::new();
    for (i, (name, value)) in properties.iter().filter(|(name, _)| node.is_writable(name)).enumerate() {
        if value.is_null() {
            assignments.push(format!("n.{} = null", name));
        } else {
            let param = format!("p{}", i);
            assignments.push(format!("n.{} = ${}", name, param));
            params.push((param, value.clone()));
        }
    }
    if !assignments.is_empty() {
        cypher.push_str(" SET ");
        cypher.push_str(&assignments.join(", "));
    }

    Statement { cypher, params }
}

/// `MERGE` one edge between two existing nodes. Returns `count` 0 when either
/// endpoint is missing.
pub fn edge_statement(from: &NodeRef, rel: RelType, to: &NodeRef) -> Statement {
    let cypher = format!(
        "MATCH (a:{} {{{}: $from}}) MATCH (b:{} {{{}: $to}}) MERGE (a)-[r:{}]->(b) RETURN count(r) AS count",
        from.label,
        from.key.property(),
        to.label,
        to.key.property(),
        rel
    );
    Statement {
        cypher,
        params: vec![
            ("from".to_string(), key_value(&from.key)),
            ("to".to_string(), key_value(&to.key)),
        ],
    }
}

fn store_error(e: anyhow::Error) -> AppGraphError {
    AppGraphError::GraphStore(format!("{:#}", e))
}

#[async_trait]
impl GraphTarget for GraphClient {
    async fn upsert_node(&self, node: &NodeRef, properties: &Properties) -> AppGraphResult<()> {
        debug!(node = %node, "MERGE node");
        self.execute(node_statement(node, properties).into_query())
            .await
            .map_err(store_error)
    }

    async fn upsert_edge(&self, from: &NodeRef, rel: RelType, to: &NodeRef) -> AppGraphResult<()> {
        debug!(from = %from, rel = %rel, to = %to, "MERGE relationship");
        let merged: i64 = self
            .query_scalar(edge_statement(from, rel, to).into_query(), "count")
            .await
            .map_err(store_error)?
            .unwrap_or(0);

        if merged == 0 {
            return Err(AppGraphError::GraphStore(format!(
                "cannot create {} edge: {} or {} does not exist",
                rel, from, to
            )));
        }
        Ok(())
    }

    async fn wipe(&self) -> AppGraphResult<()> {
        self.execute(Query::new("MATCH (n) DETACH DELETE n".to_string()))
            .await
            .map_err(store_error)
    }

    async fn counts(&self) -> AppGraphResult<GraphCounts> {
        self.get_counts().await.map_err(store_error)
    }

    async fn breakdown(&self) -> AppGraphResult<GraphBreakdown> {
        self.get_breakdown().await.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeLabel;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.database, "neo4j");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GraphConfig = serde_json::from_str(r#"{"uri": "bolt://db:7687"}"#).unwrap();
        assert_eq!(config.uri, "bolt://db:7687");
        assert_eq!(config.user, "neo4j");
    }

    #[test]
    fn test_node_statement() {
        let node = NodeRef::new(NodeLabel::Application, NodeKey::AppId(7));
        let props: Properties = vec![
            ("name", "Ledger".into()),
            ("app_id", PropertyValue::Int(7)),
            ("notes", PropertyValue::Null),
            ("tags", vec!["a".to_string()].into()),
        ];
        let stmt = node_statement(&node, &props);

        assert_eq!(
            stmt.cypher,
            "MERGE (n:Application {app_id: $key}) SET n.name = $p0, n.notes = null, n.tags = $p2"
        );
        assert_eq!(stmt.params.len(), 3);
        assert_eq!(stmt.params[0], ("key".to_string(), PropertyValue::Int(7)));
    }

    #[test]
    fn test_name_keyed_application_never_sets_app_id() {
        let node = NodeRef::named(NodeLabel::Application, "X");
        let props: Properties = vec![
            ("app_id", PropertyValue::Null),
            ("name", "X".into()),
            ("platform", "Linux".into()),
        ];
        let stmt = node_statement(&node, &props);

        assert_eq!(stmt.cypher, "MERGE (n:Application {name: $key}) SET n.platform = $p0");
        assert!(!stmt.cypher.contains("app_id"));
    }

    #[test]
    fn test_node_statement_without_properties() {
        let stmt = node_statement(&NodeRef::named(NodeLabel::Vendor, "Acme"), &Vec::new());
        assert_eq!(stmt.cypher, "MERGE (n:Vendor {name: $key})");
    }

    #[test]
    fn test_edge_statement() {
        let from = NodeRef::new(NodeLabel::Application, NodeKey::AppId(1));
        let to = NodeRef::named(NodeLabel::ExternalApp, "Slack");
        let stmt = edge_statement(&from, RelType::DEPENDS_ON, &to);

        assert_eq!(
            stmt.cypher,
            "MATCH (a:Application {app_id: $from}) MATCH (b:ExternalApp {name: $to}) \
             MERGE (a)-[r:DEPENDS_ON]->(b) RETURN count(r) AS count"
        );
        assert_eq!(stmt.params[1].1, PropertyValue::Text("Slack".into()));
    }
}
