//! Applications table to property graph.
//!
//! Each valid row becomes an Application node plus the Vendor, Department,
//! Category, Subcategory, Person and dependency nodes it references, all
//! written with match-or-create upserts so a rerun converges to the same
//! graph:
//! - (:Application)-[:SUPPLIED_BY]->(:Vendor)
//! - (:Application)-[:OWNED_BY]->(:Department)
//! - (:Application)-[:BELONGS_TO]->(:Category|:Subcategory)
//! - (:Subcategory)-[:BELONGS_TO]->(:Category)
//! - (:Application)-[:HAS_OWNER|HAS_TECHNICAL_LEAD|HAS_BUSINESS_OWNER]->(:Person)
//! - (:Application)-[:DEPENDS_ON|INTEGRATES_WITH]->(:Application|:ExternalApp)

pub mod plan;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use appgraph_core::application::{parse_rows, ParsedRow};
use appgraph_core::AppGraphResult;
use appgraph_db::{ApplicationRow, DbPool};

use crate::target::GraphTarget;
use plan::{plan_row, NameIndex, Step};

/// A row left out of the graph.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    pub index: usize,
    pub app_id: Option<String>,
    pub reason: String,
}

/// Summary of one load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    /// Node upserts issued, including repeats of shared nodes.
    pub nodes_merged: usize,
    /// Relationship upserts issued, including repeats.
    pub relationships_merged: usize,
    /// Cells loaded as null because they could not be coerced.
    pub field_issues: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    fn new(rows_read: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            rows_read,
            rows_loaded: 0,
            rows_skipped: 0,
            nodes_merged: 0,
            relationships_merged: 0,
            field_issues: 0,
            skipped: Vec::new(),
        }
    }
}

/// Write the graph for `rows` into `target`.
///
/// Rows without a name are skipped and reported; unreadable scalar cells are
/// loaded as null. Store errors abort the load immediately, leaving whatever
/// prefix was already written (safe to rerun).
pub async fn transform_and_load<T>(target: &T, rows: &[ApplicationRow]) -> AppGraphResult<LoadReport>
where
    T: GraphTarget + ?Sized,
{
    let mut report = LoadReport::new(rows.len());
    info!(run_id = %report.run_id, rows = rows.len(), "Starting graph load");

    let outcome = parse_rows(rows);
    report.field_issues = outcome.issue_count();
    report.rows_skipped = outcome.rejected.len();
    report.skipped = outcome
        .rejected
        .iter()
        .map(|r| SkippedRow {
            index: r.index,
            app_id: r.app_id.clone(),
            reason: r.error.to_string(),
        })
        .collect();

    let index = NameIndex::build(outcome.parsed.iter().map(|(_, p)| &p.application));

    for (row, ParsedRow { application, .. }) in &outcome.parsed {
        let plan = plan_row(application, &index);

        for step in &plan.steps {
            match step {
                Step::Node(node, properties) => {
                    target.upsert_node(node, properties).await?;
                    report.nodes_merged += 1;
                }
                Step::Edge(from, rel, to) => {
                    target.upsert_edge(from, *rel, to).await?;
                    report.relationships_merged += 1;
                }
            }
        }

        report.rows_loaded += 1;
        debug!(
            row,
            app = %application.name,
            key = %application.key(),
            nodes = plan.node_count(),
            rels = plan.edge_count(),
            "Loaded application"
        );
    }

    info!(
        run_id = %report.run_id,
        loaded = report.rows_loaded,
        skipped = report.rows_skipped,
        field_issues = report.field_issues,
        nodes = report.nodes_merged,
        rels = report.relationships_merged,
        "Graph load complete"
    );

    Ok(report)
}

/// Delete every node and relationship in `target`.
///
/// Destructive and irreversible. Loads already converge through upserts, so
/// this is only for starting over from an empty graph.
pub async fn wipe<T: GraphTarget + ?Sized>(target: &T) -> AppGraphResult<()> {
    let before = target.counts().await?;
    warn!(
        nodes = before.nodes,
        rels = before.relationships,
        "Wiping graph: deleting all nodes and relationships"
    );
    target.wipe().await
}

/// Extract every application from SQLite and load it into `target`,
/// optionally wiping the graph first.
pub async fn migrate_from_sqlite<T>(db: &DbPool, target: &T, clear_first: bool) -> AppGraphResult<LoadReport>
where
    T: GraphTarget + ?Sized,
{
    let rows = appgraph_db::queries::applications::list_applications(db)?;
    info!(rows = rows.len(), path = ?db.path(), "Extracted applications");

    if clear_first {
        wipe(target).await?;
    }

    transform_and_load(target, &rows).await
}
