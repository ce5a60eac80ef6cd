//! The graph store contract the loader writes through.

use async_trait::async_trait;

use appgraph_core::AppGraphResult;

use crate::model::{NodeLabel, NodeRef, Properties, RelType};

/// Node and relationship counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}

/// Counts broken down by label and relationship type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphBreakdown {
    pub labels: Vec<(String, usize)>,
    pub relationships: Vec<(String, usize)>,
}

impl GraphBreakdown {
    pub fn label_count(&self, label: NodeLabel) -> usize {
        lookup(&self.labels, label.as_str())
    }

    pub fn relationship_count(&self, rel: RelType) -> usize {
        lookup(&self.relationships, rel.as_str())
    }
}

fn lookup(pairs: &[(String, usize)], key: &str) -> usize {
    pairs.iter().find(|(k, _)| k == key).map(|(_, n)| *n).unwrap_or(0)
}

/// A property graph that supports keyed upserts.
///
/// Every write is match-or-create, so replaying the same sequence of calls
/// converges to the same graph.
#[async_trait]
pub trait GraphTarget: Send + Sync {
    /// Match-or-create the node keyed by `(label, key)`, then apply
    /// `properties`. Null values remove the property.
    async fn upsert_node(&self, node: &NodeRef, properties: &Properties) -> AppGraphResult<()>;

    /// Match-or-create the single `(from)-[rel]->(to)` edge. Both endpoints
    /// must already exist.
    async fn upsert_edge(&self, from: &NodeRef, rel: RelType, to: &NodeRef) -> AppGraphResult<()>;

    /// Delete every node and relationship. Destructive and irreversible.
    async fn wipe(&self) -> AppGraphResult<()>;

    async fn counts(&self) -> AppGraphResult<GraphCounts>;

    async fn breakdown(&self) -> AppGraphResult<GraphBreakdown>;
}
