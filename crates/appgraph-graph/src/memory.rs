//! In-process property graph.
//!
//! Same upsert semantics as the Neo4j client, without a server. Used for
//! dry runs and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use appgraph_core::{AppGraphError, AppGraphResult};

use crate::model::{NodeKey, NodeLabel, NodeRef, Properties, PropertyValue, RelType};
use crate::target::{GraphBreakdown, GraphCounts, GraphTarget};

type PropertyMap = BTreeMap<String, PropertyValue>;

/// A directed, typed edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub from: NodeRef,
    pub rel: RelType,
    pub to: NodeRef,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: BTreeMap<NodeRef, PropertyMap>,
    edges: BTreeSet<Edge>,
}

impl Inner {
    /// The stored node a `MERGE` on `node` matches: the exact key, or for a
    /// name-keyed Application any Application whose `name` equals it. Other
    /// labels are only ever keyed by name.
    fn matching(&self, node: &NodeRef) -> Option<NodeRef> {
        if self.nodes.contains_key(node) {
            return Some(node.clone());
        }
        let NodeKey::Name(name) = &node.key else {
            return None;
        };
        if node.label != NodeLabel::Application {
            return None;
        }
        self.nodes
            .iter()
            .find(|(stored, props)| {
                stored.label == node.label
                    && matches!(props.get("name"), Some(PropertyValue::Text(n)) if n == name)
            })
            .map(|(stored, _)| stored.clone())
    }
}

/// An in-memory graph keyed by `(label, key)`.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    inner: Mutex<Inner>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppGraphResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AppGraphError::GraphStore("memory graph lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        match self.inner.lock() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    pub fn node_count(&self) -> usize {
        self.read(|g| g.nodes.len())
    }

    pub fn edge_count(&self) -> usize {
        self.read(|g| g.edges.len())
    }

    pub fn node_count_by_label(&self, label: NodeLabel) -> usize {
        self.read(|g| g.nodes.keys().filter(|n| n.label == label).count())
    }

    pub fn contains_node(&self, node: &NodeRef) -> bool {
        self.read(|g| g.nodes.contains_key(node))
    }

    /// Nodes of one label, in key order.
    pub fn nodes(&self, label: NodeLabel) -> Vec<NodeRef> {
        self.read(|g| g.nodes.keys().filter(|n| n.label == label).cloned().collect())
    }

    /// All edges, in `(from, rel, to)` order.
    pub fn edges(&self) -> Vec<Edge> {
        self.read(|g| g.edges.iter().cloned().collect())
    }

    /// Edges of one type leaving `from`.
    pub fn edges_from(&self, from: &NodeRef, rel: RelType) -> Vec<NodeRef> {
        self.read(|g| {
            g.edges
                .iter()
                .filter(|e| &e.from == from && e.rel == rel)
                .map(|e| e.to.clone())
                .collect()
        })
    }

    pub fn edge_count_by_type(&self, rel: RelType) -> usize {
        self.read(|g| g.edges.iter().filter(|e| e.rel == rel).count())
    }

    pub fn has_edge(&self, from: &NodeRef, rel: RelType, to: &NodeRef) -> bool {
        let edge = Edge {
            from: from.clone(),
            rel,
            to: to.clone(),
        };
        self.read(|g| g.edges.contains(&edge))
    }

    pub fn node_properties(&self, node: &NodeRef) -> Option<BTreeMap<String, PropertyValue>> {
        self.read(|g| g.nodes.get(node).cloned())
    }

    pub fn property(&self, node: &NodeRef, name: &str) -> Option<PropertyValue> {
        self.read(|g| g.nodes.get(node).and_then(|p| p.get(name).cloned()))
    }
}

fn key_property(key: &NodeKey) -> (String, PropertyValue) {
    let value = match key {
        NodeKey::AppId(id) => PropertyValue::Int(*id),
        NodeKey::Name(name) => PropertyValue::Text(name.clone()),
    };
    (key.property().to_string(), value)
}

#[async_trait]
impl GraphTarget for MemoryGraph {
    async fn upsert_node(&self, node: &NodeRef, properties: &Properties) -> AppGraphResult<()> {
        let mut g = self.lock()?;
        let stored = g.matching(node).unwrap_or_else(|| node.clone());
        let props = g.nodes.entry(stored).or_insert_with(|| {
            let (k, v) = key_property(&node.key);
            BTreeMap::from([(k, v)])
        });

        for (name, value) in properties {
            if !node.is_writable(name) {
                continue;
            }
            if value.is_null() {
                props.remove(*name);
            } else {
                props.insert((*name).to_string(), value.clone());
            }
        }
        Ok(())
    }

    async fn upsert_edge(&self, from: &NodeRef, rel: RelType, to: &NodeRef) -> AppGraphResult<()> {
        let mut g = self.lock()?;
        let missing = |endpoint: &NodeRef| {
            AppGraphError::GraphStore(format!(
                "cannot create {} edge: node {} does not exist",
                rel, endpoint
            ))
        };
        let from = g.matching(from).ok_or_else(|| missing(from))?;
        let to = g.matching(to).ok_or_else(|| missing(to))?;
        g.edges.insert(Edge { from, rel, to });
        Ok(())
    }

    async fn wipe(&self) -> AppGraphResult<()> {
        let mut g = self.lock()?;
        g.nodes.clear();
        g.edges.clear();
        Ok(())
    }

    async fn counts(&self) -> AppGraphResult<GraphCounts> {
        let g = self.lock()?;
        Ok(GraphCounts {
            nodes: g.nodes.len(),
            relationships: g.edges.len(),
        })
    }

    async fn breakdown(&self) -> AppGraphResult<GraphBreakdown> {
        let g = self.lock()?;
        let mut labels: BTreeMap<&str, usize> = BTreeMap::new();
        for node in g.nodes.keys() {
            *labels.entry(node.label.as_str()).or_default() += 1;
        }
        let mut rels: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in &g.edges {
            *rels.entry(edge.rel.as_str()).or_default() += 1;
        }
        Ok(GraphBreakdown {
            labels: labels.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            relationships: rels.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor(name: &str) -> NodeRef {
        NodeRef::named(NodeLabel::Vendor, name)
    }

    #[tokio::test]
    async fn test_upsert_node_is_match_or_create() {
        let graph = MemoryGraph::new();
        let acme = vendor("Acme");

        graph
            .upsert_node(&acme, &vec![("contact_email", "a@acme.test".into())])
            .await
            .unwrap();
        graph.upsert_node(&acme, &Vec::new()).await.unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(
            graph.property(&acme, "contact_email"),
            Some(PropertyValue::Text("a@acme.test".into()))
        );
        assert_eq!(graph.property(&acme, "name"), Some(PropertyValue::Text("Acme".into())));
    }

    #[tokio::test]
    async fn test_null_property_removes_attribute() {
        let graph = MemoryGraph::new();
        let app = NodeRef::new(NodeLabel::Application, NodeKey::AppId(1));

        graph.upsert_node(&app, &vec![("notes", "x".into())]).await.unwrap();
        graph.upsert_node(&app, &vec![("notes", PropertyValue::Null)]).await.unwrap();

        assert_eq!(graph.property(&app, "notes"), None);
        assert_eq!(graph.property(&app, "app_id"), Some(PropertyValue::Int(1)));
    }

    #[tokio::test]
    async fn test_name_key_matches_application_with_id() {
        let graph = MemoryGraph::new();
        let by_id = NodeRef::new(NodeLabel::Application, NodeKey::AppId(5));
        let by_name = NodeRef::named(NodeLabel::Application, "X");

        graph.upsert_node(&by_id, &vec![("name", "X".into())]).await.unwrap();
        graph
            .upsert_node(
                &by_name,
                &vec![("app_id", PropertyValue::Null), ("platform", "Linux".into())],
            )
            .await
            .unwrap();
        graph.upsert_node(&vendor("Acme"), &Vec::new()).await.unwrap();
        graph.upsert_edge(&by_name, RelType::SUPPLIED_BY, &vendor("Acme")).await.unwrap();

        assert_eq!(graph.node_count_by_label(NodeLabel::Application), 1);
        assert_eq!(graph.property(&by_id, "app_id"), Some(PropertyValue::Int(5)));
        assert_eq!(graph.property(&by_id, "platform"), Some(PropertyValue::Text("Linux".into())));
        assert!(graph.has_edge(&by_id, RelType::SUPPLIED_BY, &vendor("Acme")));
    }

    #[tokio::test]
    async fn test_edge_requires_endpoints_and_dedupes() {
        let graph = MemoryGraph::new();
        let app = NodeRef::new(NodeLabel::Application, NodeKey::AppId(1));
        let acme = vendor("Acme");

        graph.upsert_node(&app, &Vec::new()).await.unwrap();
        assert!(graph.upsert_edge(&app, RelType::SUPPLIED_BY, &acme).await.is_err());

        graph.upsert_node(&acme, &Vec::new()).await.unwrap();
        graph.upsert_edge(&app, RelType::SUPPLIED_BY, &acme).await.unwrap();
        graph.upsert_edge(&app, RelType::SUPPLIED_BY, &acme).await.unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(&app, RelType::SUPPLIED_BY, &acme));
    }

    #[tokio::test]
    async fn test_breakdown_and_wipe() {
        let graph = MemoryGraph::new();
        graph.upsert_node(&vendor("A"), &Vec::new()).await.unwrap();
        graph.upsert_node(&vendor("B"), &Vec::new()).await.unwrap();
        graph
            .upsert_node(&NodeRef::named(NodeLabel::Person, "A"), &Vec::new())
            .await
            .unwrap();

        let breakdown = graph.breakdown().await.unwrap();
        assert_eq!(breakdown.label_count(NodeLabel::Vendor), 2);
        assert_eq!(breakdown.label_count(NodeLabel::Person), 1);
        assert_eq!(breakdown.label_count(NodeLabel::Category), 0);

        graph.wipe().await.unwrap();
        assert_eq!(graph.counts().await.unwrap(), GraphCounts::default());
    }
}
