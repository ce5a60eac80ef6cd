//! SQLite file to in-memory graph, end to end.

use appgraph_core::generate::{seed_database, COMMON_APPS};
use appgraph_db::queries::{applications, raw};
use appgraph_db::{ApplicationRow, Cell};
use appgraph_graph::{migrate_from_sqlite, GraphTarget, MemoryGraph, NodeKey, NodeLabel, NodeRef, RelType};
use chrono::NaiveDate;

fn seeded_db(dir: &tempfile::TempDir, count: usize) -> appgraph_db::DbPool {
    let pool = appgraph_db::init_pool(&dir.path().join("applications.db")).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    seed_database(&pool, count, 42, today, false).unwrap();
    pool
}

fn distinct(pool: &appgraph_db::DbPool, column: &str) -> usize {
    let sql = format!(
        "SELECT COUNT(DISTINCT {c}) FROM applications WHERE {c} IS NOT NULL AND TRIM({c}) <> ''",
        c = column
    );
    match raw::raw_query(pool, &sql).unwrap().rows[0][0] {
        Cell::Integer(n) => n as usize,
        ref other => panic!("unexpected count {:?}", other),
    }
}

#[tokio::test]
async fn test_seeded_inventory_migrates() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_db(&dir, 40);
    let graph = MemoryGraph::new();

    let report = migrate_from_sqlite(&pool, &graph, false).await.unwrap();

    assert_eq!(report.rows_read, 40);
    assert_eq!(report.rows_loaded, 40);
    assert_eq!(report.rows_skipped, 0);
    assert_eq!(report.field_issues, 0);
    assert_eq!(graph.node_count_by_label(NodeLabel::Application), 40);
    assert_eq!(graph.node_count_by_label(NodeLabel::Vendor), distinct(&pool, "vendor_name"));
    assert_eq!(graph.node_count_by_label(NodeLabel::Department), distinct(&pool, "department"));
    assert_eq!(graph.node_count_by_label(NodeLabel::Category), distinct(&pool, "category"));
    assert_eq!(graph.edge_count_by_type(RelType::SUPPLIED_BY), 40);

    for external in graph.nodes(NodeLabel::ExternalApp) {
        match &external.key {
            NodeKey::Name(name) => assert!(COMMON_APPS.contains(&name.as_str()), "{}", name),
            NodeKey::AppId(id) => panic!("external app keyed by id {}", id),
        }
    }
}

#[tokio::test]
async fn test_rerun_converges() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_db(&dir, 25);
    let graph = MemoryGraph::new();

    migrate_from_sqlite(&pool, &graph, false).await.unwrap();
    let first = graph.counts().await.unwrap();
    let first_edges = graph.edges();

    let report = migrate_from_sqlite(&pool, &graph, false).await.unwrap();
    assert_eq!(graph.counts().await.unwrap(), first);
    assert_eq!(graph.edges(), first_edges);
    assert!(report.nodes_merged >= first.nodes);
}

#[tokio::test]
async fn test_dependency_on_inventory_app_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let pool = seeded_db(&dir, 5);
    let target_name = applications::get_application(&pool, 3)
        .unwrap()
        .text("app_name")
        .unwrap()
        .to_string();

    let row = ApplicationRow::new()
        .with("app_id", 100)
        .with("app_name", "Reporting Portal")
        .with("depends_on_apps", format!("{}, Legacy Mainframe", target_name));
    applications::insert_application(&pool, &row).unwrap();

    let graph = MemoryGraph::new();
    migrate_from_sqlite(&pool, &graph, false).await.unwrap();

    let portal = NodeRef::new(NodeLabel::Application, NodeKey::AppId(100));
    let target = NodeRef::new(NodeLabel::Application, NodeKey::AppId(3));
    assert!(graph.has_edge(&portal, RelType::DEPENDS_ON, &target));
    assert!(graph.has_edge(
        &portal,
        RelType::DEPENDS_ON,
        &NodeRef::named(NodeLabel::ExternalApp, "Legacy Mainframe")
    ));
    assert!(!graph.contains_node(&NodeRef::named(NodeLabel::ExternalApp, target_name)));
}
