//! Consumer queries against the application graph.
//!
//! Each entry pairs a Cypher query with the equivalent SQL against the flat
//! `applications` table where SQL can express it. Relational list columns are
//! split with a recursive CTE; in the graph the same data is plain edges.

use serde::Serialize;

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    pub id: &'static str,
    pub section: &'static str,
    pub title: &'static str,
    pub cypher: &'static str,
    pub sql: Option<&'static str>,
}

/// Recursive CTE `split(app, token, rest)` over a comma-separated column.
/// Tokens are trimmed; empty tokens remain and are filtered by the caller.
macro_rules! split_cte {
    ($column:literal) => {
        concat!(
            "WITH RECURSIVE split(app, token, rest) AS (
                SELECT app_name, '', ",
            $column,
            " || ',' FROM applications
                WHERE ",
            $column,
            " IS NOT NULL AND TRIM(",
            $column,
            ") <> ''
                UNION ALL
                SELECT app, TRIM(substr(rest, 1, instr(rest, ',') - 1)), substr(rest, instr(rest, ',') + 1)
                FROM split WHERE rest <> ''
            ) "
        )
    };
}

const CATALOG: &[CatalogQuery] = &[
    // Statistics
    CatalogQuery {
        id: "nodes-by-label",
        section: "statistics",
        title: "Node counts by label",
        cypher: "MATCH (n) RETURN labels(n)[0] AS label, count(n) AS count ORDER BY count DESC",
        sql: Some(
            "SELECT COUNT(*) AS applications,
                    COUNT(DISTINCT vendor_name) AS vendors,
                    COUNT(DISTINCT department) AS departments,
                    COUNT(DISTINCT category) AS categories,
                    COUNT(DISTINCT subcategory) AS subcategories
             FROM applications",
        ),
    },
    CatalogQuery {
        id: "relationships-by-type",
        section: "statistics",
        title: "Relationship counts by type",
        cypher: "MATCH ()-[r]->() RETURN type(r) AS relationship_type, count(r) AS count ORDER BY count DESC",
        sql: None,
    },
    // Vendors
    CatalogQuery {
        id: "vendors-by-apps",
        section: "vendor",
        title: "Top 10 vendors by application count",
        cypher: "MATCH (v:Vendor)<-[:SUPPLIED_BY]-(a:Application)
                 RETURN v.name AS vendor, count(a) AS app_count, sum(a.annual_cost) AS total_cost
                 ORDER BY app_count DESC LIMIT 10",
        sql: Some(
            "SELECT vendor_name AS vendor, COUNT(*) AS app_count, SUM(annual_cost) AS total_cost
             FROM applications WHERE vendor_name IS NOT NULL AND vendor_name <> ''
             GROUP BY vendor_name ORDER BY app_count DESC LIMIT 10",
        ),
    },
    CatalogQuery {
        id: "vendors-by-cost",
        section: "vendor",
        title: "Top 10 vendors by total cost",
        cypher: "MATCH (v:Vendor)<-[:SUPPLIED_BY]-(a:Application)
                 WHERE a.annual_cost IS NOT NULL
                 RETURN v.name AS vendor, sum(a.annual_cost) AS total_cost
                 ORDER BY total_cost DESC LIMIT 10",
        sql: Some(
            "SELECT vendor_name AS vendor, SUM(annual_cost) AS total_cost
             FROM applications WHERE vendor_name IS NOT NULL AND annual_cost IS NOT NULL
             GROUP BY vendor_name ORDER BY total_cost DESC LIMIT 10",
        ),
    },
    CatalogQuery {
        id: "vendors-critical",
        section: "vendor",
        title: "Vendors supplying critical applications",
        cypher: "MATCH (v:Vendor)<-[:SUPPLIED_BY]-(a:Application)
                 WHERE a.criticality = 'critical'
                 RETURN v.name AS vendor, count(a) AS critical_apps
                 ORDER BY critical_apps DESC",
        sql: Some(
            "SELECT vendor_name AS vendor, COUNT(*) AS critical_apps
             FROM applications WHERE criticality = 'critical' AND vendor_name IS NOT NULL
             GROUP BY vendor_name ORDER BY critical_apps DESC",
        ),
    },
    // Dependencies
    CatalogQuery {
        id: "common-dependencies",
        section: "dependency",
        title: "Most common dependencies",
        cypher: "MATCH (t)<-[:DEPENDS_ON]-(a:Application)
                 RETURN t.name AS dependency, labels(t)[0] AS kind, count(a) AS dependent_apps
                 ORDER BY dependent_apps DESC LIMIT 10",
        sql: Some(concat!(
            split_cte!("depends_on_apps"),
            "SELECT token AS dependency, COUNT(DISTINCT app) AS dependent_apps
             FROM split WHERE token <> ''
             GROUP BY token ORDER BY dependent_apps DESC LIMIT 10"
        )),
    },
    CatalogQuery {
        id: "most-dependencies",
        section: "dependency",
        title: "Applications with the most dependencies",
        cypher: "MATCH (a:Application)-[:DEPENDS_ON]->(t)
                 RETURN a.name AS app, count(t) AS dependency_count
                 ORDER BY dependency_count DESC LIMIT 10",
        sql: Some(concat!(
            split_cte!("depends_on_apps"),
            "SELECT app, COUNT(DISTINCT token) AS dependency_count
             FROM split WHERE token <> ''
             GROUP BY app ORDER BY dependency_count DESC LIMIT 10"
        )),
    },
    CatalogQuery {
        id: "shared-dependencies",
        section: "dependency",
        title: "Shared dependencies (potential single points of failure)",
        cypher: "MATCH (a:Application)-[:DEPENDS_ON]->(t)<-[:DEPENDS_ON]-(other:Application)
                 WHERE a <> other
                 RETURN t.name AS shared_dependency, collect(DISTINCT a.name) AS dependent_apps,
                        count(DISTINCT a) AS app_count
                 ORDER BY app_count DESC LIMIT 10",
        sql: None,
    },
    CatalogQuery {
        id: "circular-dependencies",
        section: "dependency",
        title: "Circular dependencies between applications",
        cypher: "MATCH p = (a:Application)-[:DEPENDS_ON*2..4]->(a)
                 RETURN a.name AS app, length(p) AS cycle_length, [n IN nodes(p) | n.name] AS cycle
                 ORDER BY cycle_length, app LIMIT 20",
        sql: Some(concat!(
            split_cte!("depends_on_apps"),
            "SELECT a.app AS app1, b.app AS app2
             FROM split a JOIN split b ON a.token = b.app AND b.token = a.app
             WHERE a.app < b.app"
        )),
    },
    // Integrations
    CatalogQuery {
        id: "integration-points",
        section: "integration",
        title: "Most common integration points",
        cypher: "MATCH (t)<-[:INTEGRATES_WITH]-(a:Application)
                 RETURN t.name AS integration, labels(t)[0] AS kind, count(a) AS integrating_apps
                 ORDER BY integrating_apps DESC LIMIT 10",
        sql: Some(concat!(
            split_cte!("integrates_with_apps"),
            "SELECT token AS integration, COUNT(DISTINCT app) AS integrating_apps
             FROM split WHERE token <> ''
             GROUP BY token ORDER BY integrating_apps DESC LIMIT 10"
        )),
    },
    CatalogQuery {
        id: "most-integrations",
        section: "integration",
        title: "Applications with the most integrations",
        cypher: "MATCH (a:Application)-[:INTEGRATES_WITH]->(t)
                 RETURN a.name AS app, count(t) AS integration_count
                 ORDER BY integration_count DESC LIMIT 10",
        sql: None,
    },
    CatalogQuery {
        id: "integration-hubs",
        section: "integration",
        title: "Integration hubs (nodes touched by three or more applications)",
        cypher: "MATCH (hub)-[:INTEGRATES_WITH]-(a:Application)
                 WITH hub, count(DISTINCT a) AS connected_apps
                 WHERE connected_apps >= 3
                 RETURN hub.name AS integration_hub, labels(hub)[0] AS kind, connected_apps
                 ORDER BY connected_apps DESC LIMIT 10",
        sql: None,
    },
    // Departments
    CatalogQuery {
        id: "departments-by-apps",
        section: "department",
        title: "Departments by application count",
        cypher: "MATCH (d:Department)<-[:OWNED_BY]-(a:Application)
                 RETURN d.name AS department, count(a) AS app_count, sum(a.annual_cost) AS total_cost
                 ORDER BY app_count DESC LIMIT 10",
        sql: Some(
            "SELECT department, COUNT(*) AS app_count, SUM(annual_cost) AS total_cost
             FROM applications WHERE department IS NOT NULL AND department <> ''
             GROUP BY department ORDER BY app_count DESC LIMIT 10",
        ),
    },
    CatalogQuery {
        id: "departments-critical",
        section: "department",
        title: "Departments owning critical applications",
        cypher: "MATCH (d:Department)<-[:OWNED_BY]-(a:Application)
                 WHERE a.criticality = 'critical'
                 RETURN d.name AS department, count(a) AS critical_apps
                 ORDER BY critical_apps DESC",
        sql: Some(
            "SELECT department, COUNT(*) AS critical_apps
             FROM applications WHERE criticality = 'critical' AND department IS NOT NULL
             GROUP BY department ORDER BY critical_apps DESC",
        ),
    },
    CatalogQuery {
        id: "department-categories",
        section: "department",
        title: "Application categories per department",
        cypher: "MATCH (d:Department)<-[:OWNED_BY]-(a:Application)-[:BELONGS_TO]->(c:Category)
                 RETURN d.name AS department, c.name AS category, count(a) AS app_count
                 ORDER BY department, app_count DESC",
        sql: Some(
            "SELECT department, category, COUNT(*) AS app_count
             FROM applications WHERE department IS NOT NULL AND category IS NOT NULL
             GROUP BY department, category ORDER BY department, app_count DESC",
        ),
    },
    // Categories
    CatalogQuery {
        id: "categories",
        section: "category",
        title: "Applications per category",
        cypher: "MATCH (c:Category)<-[:BELONGS_TO]-(a:Application)
                 WHERE c.type = 'main'
                 RETURN c.name AS category, count(a) AS app_count, avg(a.annual_cost) AS avg_cost
                 ORDER BY app_count DESC",
        sql: Some(
            "SELECT category, COUNT(*) AS app_count, AVG(annual_cost) AS avg_cost
             FROM applications WHERE category IS NOT NULL AND category <> ''
             GROUP BY category ORDER BY app_count DESC",
        ),
    },
    CatalogQuery {
        id: "category-tree",
        section: "category",
        title: "Subcategories under each category",
        cypher: "MATCH (s:Subcategory)-[:BELONGS_TO]->(c:Category)
                 RETURN c.name AS category, collect(s.name) AS subcategories
                 ORDER BY category",
        sql: Some(
            "SELECT category, GROUP_CONCAT(DISTINCT subcategory) AS subcategories
             FROM applications WHERE category IS NOT NULL AND subcategory IS NOT NULL
             GROUP BY category ORDER BY category",
        ),
    },
    CatalogQuery {
        id: "category-vendor-diversity",
        section: "category",
        title: "Vendor diversity by category",
        cypher: "MATCH (c:Category)<-[:BELONGS_TO]-(a:Application)-[:SUPPLIED_BY]->(v:Vendor)
                 RETURN c.name AS category, count(DISTINCT v) AS vendor_count
                 ORDER BY vendor_count DESC",
        sql: Some(
            "SELECT category, COUNT(DISTINCT vendor_name) AS vendor_count
             FROM applications WHERE category IS NOT NULL
             GROUP BY category ORDER BY vendor_count DESC",
        ),
    },
    // People
    CatalogQuery {
        id: "people-responsibilities",
        section: "person",
        title: "People with the most application responsibilities",
        cypher: "MATCH (a:Application)-[r:HAS_OWNER|HAS_TECHNICAL_LEAD|HAS_BUSINESS_OWNER]->(p:Person)
                 RETURN p.name AS person, type(r) AS role, count(a) AS app_count
                 ORDER BY app_count DESC LIMIT 15",
        sql: None,
    },
    CatalogQuery {
        id: "owners-critical",
        section: "person",
        title: "People owning critical applications",
        cypher: "MATCH (a:Application)-[:HAS_OWNER]->(p:Person)
                 WHERE a.criticality = 'critical'
                 RETURN p.name AS person, count(a) AS critical_apps
                 ORDER BY critical_apps DESC",
        sql: Some(
            "SELECT app_owner AS person, COUNT(*) AS critical_apps
             FROM applications WHERE criticality = 'critical' AND app_owner IS NOT NULL
             GROUP BY app_owner ORDER BY critical_apps DESC",
        ),
    },
    CatalogQuery {
        id: "owners-by-cost",
        section: "person",
        title: "Owners by cost responsibility",
        cypher: "MATCH (a:Application)-[:HAS_OWNER]->(p:Person)
                 RETURN p.name AS person, sum(a.annual_cost) AS total_cost_responsibility
                 ORDER BY total_cost_responsibility DESC LIMIT 10",
        sql: Some(
            "SELECT app_owner AS person, SUM(annual_cost) AS total_cost_responsibility
             FROM applications WHERE app_owner IS NOT NULL
             GROUP BY app_owner ORDER BY total_cost_responsibility DESC LIMIT 10",
        ),
    },
    // Advanced patterns
    CatalogQuery {
        id: "cross-linked",
        section: "advanced",
        title: "Applications linked through a shared external system",
        cypher: "MATCH (a:Application)-[:DEPENDS_ON]->(e:ExternalApp)<-[:INTEGRATES_WITH]-(other:Application)
                 WHERE a <> other
                 RETURN a.name AS app1, other.name AS app2, e.name AS common_external_app
                 LIMIT 10",
        sql: None,
    },
    CatalogQuery {
        id: "vendor-department",
        section: "advanced",
        title: "Vendor and department pairs",
        cypher: "MATCH (v:Vendor)<-[:SUPPLIED_BY]-(a:Application)-[:OWNED_BY]->(d:Department)
                 RETURN v.name AS vendor, d.name AS department, count(a) AS app_count
                 ORDER BY app_count DESC LIMIT 15",
        sql: Some(
            "SELECT vendor_name AS vendor, department, COUNT(*) AS app_count
             FROM applications WHERE vendor_name IS NOT NULL AND department IS NOT NULL
             GROUP BY vendor_name, department ORDER BY app_count DESC LIMIT 15",
        ),
    },
    CatalogQuery {
        id: "eol-impact",
        section: "advanced",
        title: "End-of-life applications and the applications depending on them",
        cypher: "MATCH (eol:Application)<-[:DEPENDS_ON]-(other:Application)
                 WHERE eol.end_of_life_date IS NOT NULL
                 RETURN eol.name AS eol_app, eol.end_of_life_date AS end_of_life_date,
                        collect(DISTINCT other.name) AS affected_apps
                 ORDER BY end_of_life_date",
        sql: Some(concat!(
            split_cte!("depends_on_apps"),
            "SELECT e.app_name AS eol_app, e.end_of_life_date, GROUP_CONCAT(DISTINCT s.app) AS affected_apps
             FROM applications e JOIN split s ON s.token = e.app_name
             WHERE e.end_of_life_date IS NOT NULL AND e.end_of_life_date <> ''
             GROUP BY e.app_name, e.end_of_life_date ORDER BY e.end_of_life_date"
        )),
    },
    CatalogQuery {
        id: "expensive-subscriptions",
        section: "advanced",
        title: "Vendors of subscriptions costing over 50,000 a year",
        cypher: "MATCH (a:Application)-[:SUPPLIED_BY]->(v:Vendor)
                 WHERE a.license_type = 'subscription' AND a.annual_cost > 50000
                 RETURN v.name AS vendor, sum(a.annual_cost) AS total_subscription_cost,
                        count(a) AS expensive_apps
                 ORDER BY total_subscription_cost DESC",
        sql: Some(
            "SELECT vendor_name AS vendor, SUM(annual_cost) AS total_subscription_cost,
                    COUNT(*) AS expensive_apps
             FROM applications WHERE license_type = 'subscription' AND annual_cost > 50000
             GROUP BY vendor_name ORDER BY total_subscription_cost DESC",
        ),
    },
    CatalogQuery {
        id: "similar-apps",
        section: "advanced",
        title: "Most similar application pairs (shared vendor, category and dependencies)",
        cypher: "MATCH (a:Application)-[:SUPPLIED_BY|BELONGS_TO|DEPENDS_ON]->(shared)<-[:SUPPLIED_BY|BELONGS_TO|DEPENDS_ON]-(b:Application)
                 WHERE a.name < b.name
                 RETURN a.name AS app1, b.name AS app2, count(DISTINCT shared) AS similarity_score,
                        collect(DISTINCT shared.name) AS shared_with
                 ORDER BY similarity_score DESC LIMIT 10",
        sql: Some(
            "SELECT a.app_name AS app1, b.app_name AS app2,
                    (CASE WHEN a.vendor_name = b.vendor_name THEN 1 ELSE 0 END)
                  + (CASE WHEN a.category = b.category THEN 1 ELSE 0 END)
                  + (CASE WHEN a.subcategory = b.subcategory THEN 1 ELSE 0 END) AS similarity_score
             FROM applications a JOIN applications b ON a.app_name < b.app_name
             ORDER BY similarity_score DESC LIMIT 10",
        ),
    },
    // Compliance
    CatalogQuery {
        id: "compliance-distribution",
        section: "compliance",
        title: "Compliance requirements distribution",
        cypher: "MATCH (a:Application)
                 UNWIND a.compliance_requirements AS requirement
                 RETURN requirement, count(a) AS app_count
                 ORDER BY app_count DESC",
        sql: Some(concat!(
            split_cte!("compliance_requirements"),
            "SELECT token AS requirement, COUNT(DISTINCT app) AS app_count
             FROM split WHERE token <> ''
             GROUP BY token ORDER BY app_count DESC"
        )),
    },
    CatalogQuery {
        id: "gdpr-vendors",
        section: "compliance",
        title: "Vendors of GDPR-scoped applications",
        cypher: "MATCH (a:Application)-[:SUPPLIED_BY]->(v:Vendor)
                 WHERE 'GDPR' IN a.compliance_requirements
                 RETURN v.name AS vendor, count(a) AS gdpr_apps
                 ORDER BY gdpr_apps DESC",
        sql: Some(
            "SELECT vendor_name AS vendor, COUNT(*) AS gdpr_apps
             FROM applications WHERE compliance_requirements LIKE '%GDPR%' AND vendor_name IS NOT NULL
             GROUP BY vendor_name ORDER BY gdpr_apps DESC",
        ),
    },
    CatalogQuery {
        id: "critical-data-departments",
        section: "compliance",
        title: "Departments holding critical data",
        cypher: "MATCH (a:Application)-[:OWNED_BY]->(d:Department)
                 WHERE a.data_sensitivity = 'critical'
                 RETURN d.name AS department, count(a) AS critical_data_apps
                 ORDER BY critical_data_apps DESC",
        sql: Some(
            "SELECT department, COUNT(*) AS critical_data_apps
             FROM applications WHERE data_sensitivity = 'critical' AND department IS NOT NULL
             GROUP BY department ORDER BY critical_data_apps DESC",
        ),
    },
];

/// Every catalog entry, grouped by section.
pub fn catalog() -> &'static [CatalogQuery] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static CatalogQuery> {
    CATALOG.iter().find(|q| q.id == id)
}

/// Section names in catalog order.
pub fn sections() -> Vec<&'static str> {
    let mut sections: Vec<&'static str> = Vec::new();
    for query in CATALOG {
        if !sections.contains(&query.section) {
            sections.push(query.section);
        }
    }
    sections
}

pub fn in_section(section: &str) -> Vec<&'static CatalogQuery> {
    CATALOG.iter().filter(|q| q.section == section).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use appgraph_core::generate::seed_database;
    use chrono::NaiveDate;

    use crate::queries::run::return_columns;

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<_> = catalog().iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_sections_in_order() {
        assert_eq!(
            sections(),
            vec![
                "statistics",
                "vendor",
                "dependency",
                "integration",
                "department",
                "category",
                "person",
                "advanced",
                "compliance"
            ]
        );
        assert_eq!(in_section("vendor").len(), 3);
    }

    #[test]
    fn test_find() {
        assert_eq!(find("circular-dependencies").map(|q| q.section), Some("dependency"));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_every_cypher_query_names_its_columns() {
        for query in catalog() {
            let columns = return_columns(query.cypher);
            assert!(!columns.is_empty(), "{} has no RETURN columns", query.id);
            assert!(
                columns.iter().all(|c| !c.contains('(') && !c.contains(' ')),
                "{} has an unaliased column: {:?}",
                query.id,
                columns
            );
        }
    }

    #[test]
    fn test_every_sql_query_runs() {
        let pool = appgraph_db::init_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        seed_database(&pool, 60, 7, today, false).unwrap();

        for query in catalog() {
            if let Some(sql) = query.sql {
                let table = appgraph_db::queries::raw::raw_query(&pool, sql)
                    .unwrap_or_else(|e| panic!("{} failed: {}", query.id, e));
                assert!(!table.columns.is_empty(), "{}", query.id);
            }
        }
    }

    #[test]
    fn test_split_cte_matches_list_parsing() {
        let pool = appgraph_db::init_in_memory().unwrap();
        let row = appgraph_db::ApplicationRow::new()
            .with("app_id", 1)
            .with("app_name", "X")
            .with("depends_on_apps", "AppA, AppB,AppC ,");
        appgraph_db::queries::applications::insert_application(&pool, &row).unwrap();

        let sql = find("most-dependencies").and_then(|q| q.sql).unwrap();
        let table = appgraph_db::queries::raw::raw_query(&pool, sql).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], appgraph_db::Cell::Integer(3));
    }
}
