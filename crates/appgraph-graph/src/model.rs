//! Graph vocabulary: node labels, relationship types, node identity, properties.

use std::fmt;

use appgraph_core::AppKey;
use serde::Serialize;

/// Node labels produced by the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeLabel {
    Application,
    Vendor,
    Person,
    Department,
    Category,
    Subcategory,
    ExternalApp,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 7] = [
        NodeLabel::Application,
        NodeLabel::Vendor,
        NodeLabel::Person,
        NodeLabel::Department,
        NodeLabel::Category,
        NodeLabel::Subcategory,
        NodeLabel::ExternalApp,
    ];

    /// The Neo4j node label.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Application => "Application",
            NodeLabel::Vendor => "Vendor",
            NodeLabel::Person => "Person",
            NodeLabel::Department => "Department",
            NodeLabel::Category => "Category",
            NodeLabel::Subcategory => "Subcategory",
            NodeLabel::ExternalApp => "ExternalApp",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types produced by the migration. All point away from the
/// Application, except `BELONGS_TO` between Subcategory and Category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[allow(non_camel_case_types)]
pub enum RelType {
    SUPPLIED_BY,
    OWNED_BY,
    BELONGS_TO,
    HAS_OWNER,
    HAS_TECHNICAL_LEAD,
    HAS_BUSINESS_OWNER,
    DEPENDS_ON,
    INTEGRATES_WITH,
}

impl RelType {
    pub const ALL: [RelType; 8] = [
        RelType::SUPPLIED_BY,
        RelType::OWNED_BY,
        RelType::BELONGS_TO,
        RelType::HAS_OWNER,
        RelType::HAS_TECHNICAL_LEAD,
        RelType::HAS_BUSINESS_OWNER,
        RelType::DEPENDS_ON,
        RelType::INTEGRATES_WITH,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::SUPPLIED_BY => "SUPPLIED_BY",
            RelType::OWNED_BY => "OWNED_BY",
            RelType::BELONGS_TO => "BELONGS_TO",
            RelType::HAS_OWNER => "HAS_OWNER",
            RelType::HAS_TECHNICAL_LEAD => "HAS_TECHNICAL_LEAD",
            RelType::HAS_BUSINESS_OWNER => "HAS_BUSINESS_OWNER",
            RelType::DEPENDS_ON => "DEPENDS_ON",
            RelType::INTEGRATES_WITH => "INTEGRATES_WITH",
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value a node is merged on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeKey {
    /// `app_id` of an Application.
    AppId(i64),
    /// Natural name of any node.
    Name(String),
}

impl NodeKey {
    /// Property the key is stored under.
    pub fn property(&self) -> &'static str {
        match self {
            NodeKey::AppId(_) => "app_id",
            NodeKey::Name(_) => "name",
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::AppId(id) => write!(f, "app_id={}", id),
            NodeKey::Name(name) => write!(f, "name={}", name),
        }
    }
}

/// Identity of a node: upserts are keyed by the (label, key) pair, so a
/// Department and a Category with the same name stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: NodeKey,
}

impl NodeRef {
    pub fn new(label: NodeLabel, key: NodeKey) -> Self {
        Self { label, key }
    }

    pub fn named(label: NodeLabel, name: impl Into<String>) -> Self {
        Self::new(label, NodeKey::Name(name.into()))
    }

    pub fn application(key: &AppKey) -> Self {
        let key = match key {
            AppKey::Id(id) => NodeKey::AppId(*id),
            AppKey::Name(name) => NodeKey::Name(name.clone()),
        };
        Self::new(NodeLabel::Application, key)
    }

    /// Whether an upsert may write `property`. The merge key and `app_id`
    /// are fixed when the node is created.
    pub fn is_writable(&self, property: &str) -> bool {
        property != self.key.property() && property != NodeKey::AppId(0).property()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.label, self.key)
    }
}

/// A property value as stored on a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        PropertyValue::List(v)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Ordered property list for one upsert. Null values clear the property.
pub type Properties = Vec<(&'static str, PropertyValue)>;
