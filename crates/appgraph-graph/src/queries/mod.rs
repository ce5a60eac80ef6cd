//! Graph queries: the consumer catalog, statistics and raw Cypher.

pub mod catalog;
pub mod run;

pub use catalog::{catalog, find, in_section, sections, CatalogQuery};
pub use run::{graph_statistics, raw_query, return_columns, run_catalog_query, run_catalog_sql, GraphStatistics};
