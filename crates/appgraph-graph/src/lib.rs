//! # AppGraph Graph
//!
//! Property-graph side of AppGraph.
//!
//! Loads application rows into Neo4j (or an in-memory graph) as
//! Application, Vendor, Person, Department, Category, Subcategory and
//! ExternalApp nodes, and runs consumer queries against the result.

pub mod client;
pub mod load;
pub mod memory;
pub mod model;
pub mod queries;
pub mod schema;
pub mod target;

pub use client::{GraphClient, GraphConfig};
pub use load::{migrate_from_sqlite, transform_and_load, wipe, LoadReport, SkippedRow};
pub use memory::MemoryGraph;
pub use model::{NodeKey, NodeLabel, NodeRef, Properties, PropertyValue, RelType};
pub use target::{GraphBreakdown, GraphCounts, GraphTarget};
