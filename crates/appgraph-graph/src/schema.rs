//! Neo4j schema initialization (constraints and indexes).

use anyhow::Result;
use neo4rs::Query;
use tracing::info;

use crate::GraphClient;

/// Cypher statements for schema initialization.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // Uniqueness constraints, one per merge key
    "CREATE CONSTRAINT application_id IF NOT EXISTS FOR (a:Application) REQUIRE a.app_id IS UNIQUE",
    "CREATE CONSTRAINT vendor_name IF NOT EXISTS FOR (v:Vendor) REQUIRE v.name IS UNIQUE",
    "CREATE CONSTRAINT person_name IF NOT EXISTS FOR (p:Person) REQUIRE p.name IS UNIQUE",
    "CREATE CONSTRAINT department_name IF NOT EXISTS FOR (d:Department) REQUIRE d.name IS UNIQUE",
    "CREATE CONSTRAINT category_name IF NOT EXISTS FOR (c:Category) REQUIRE c.name IS UNIQUE",
    "CREATE CONSTRAINT subcategory_name IF NOT EXISTS FOR (s:Subcategory) REQUIRE s.name IS UNIQUE",
    "CREATE CONSTRAINT external_app_name IF NOT EXISTS FOR (e:ExternalApp) REQUIRE e.name IS UNIQUE",
    // Dependency tokens are matched against application names
    "CREATE INDEX application_name IF NOT EXISTS FOR (a:Application) ON (a.name)",
];

/// Initialize Neo4j schema with constraints and indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        client.execute(Query::new(statement.to_string())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeLabel;

    #[test]
    fn test_every_label_is_constrained() {
        for label in NodeLabel::ALL {
            let pattern = format!(":{})", label);
            assert!(
                SCHEMA_STATEMENTS
                    .iter()
                    .any(|s| s.contains("CONSTRAINT") && s.contains(&pattern)),
                "no constraint for {}",
                label
            );
        }
    }

    #[test]
    fn test_statements_are_idempotent() {
        assert!(SCHEMA_STATEMENTS.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
