//! Relational exploration of the applications inventory.
//!
//! The same questions the graph catalog answers, asked of the flat table.

use crate::pool::{DbPool, DbResult};
use rusqlite::Connection;
use serde::Serialize;

/// Aggregate view of the `applications` table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExploreSummary {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub average_annual_cost: f64,
    pub total_annual_cost: f64,
    pub with_dependencies: i64,
    pub with_integrations: i64,
    pub by_category: Vec<(String, i64)>,
    pub top_vendors: Vec<(String, i64)>,
    pub by_department: Vec<(String, i64)>,
    pub by_criticality: Vec<(String, i64)>,
    pub by_license_type: Vec<(String, i64)>,
}

/// Compute the exploration summary.
pub fn summarize(pool: &DbPool) -> DbResult<ExploreSummary> {
    pool.with_conn(|conn| {
        let (total, active, average_annual_cost, total_annual_cost) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN in_use = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(AVG(annual_cost), 0.0),
                    COALESCE(SUM(annual_cost), 0.0)
             FROM applications",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, f64>(2)?, row.get::<_, f64>(3)?)),
        )?;

        let with_dependencies: i64 = conn.query_row(
            "SELECT COUNT(*) FROM applications WHERE TRIM(COALESCE(depends_on_apps, '')) <> ''",
            [],
            |row| row.get(0),
        )?;
        let with_integrations: i64 = conn.query_row(
            "SELECT COUNT(*) FROM applications WHERE TRIM(COALESCE(integrates_with_apps, '')) <> ''",
            [],
            |row| row.get(0),
        )?;

        Ok(ExploreSummary {
            total,
            active,
            inactive: total - active,
            average_annual_cost,
            total_annual_cost,
            with_dependencies,
            with_integrations,
            by_category: distribution(conn, "category", None)?,
            top_vendors: distribution(conn, "vendor_name", Some(10))?,
            by_department: distribution(conn, "department", None)?,
            by_criticality: distribution(conn, "criticality", None)?,
            by_license_type: distribution(conn, "license_type", None)?,
        })
    })
}

/// Value counts for one column, most frequent first. Nulls are excluded.
fn distribution(conn: &Connection, column: &str, limit: Option<i64>) -> DbResult<Vec<(String, i64)>> {
    let sql = format!(
        "SELECT {col}, COUNT(*) AS n FROM applications
         WHERE {col} IS NOT NULL AND TRIM({col}) <> ''
         GROUP BY {col} ORDER BY n DESC, {col} ASC LIMIT ?1",
        col = column
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([limit.unwrap_or(-1)], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::queries::applications::insert_applications;
    use crate::row::ApplicationRow;

    #[test]
    fn test_summary() {
        let pool = DbPool::in_memory().unwrap();
        run_migrations(&pool).unwrap();
        insert_applications(
            &pool,
            &[
                ApplicationRow::new()
                    .with("app_id", 1)
                    .with("app_name", "A")
                    .with("category", "Finance")
                    .with("in_use", true)
                    .with("annual_cost", 100.0)
                    .with("depends_on_apps", "Slack"),
                ApplicationRow::new()
                    .with("app_id", 2)
                    .with("app_name", "B")
                    .with("category", "Finance")
                    .with("in_use", false)
                    .with("annual_cost", 300.0)
                    .with("depends_on_apps", ""),
                ApplicationRow::new()
                    .with("app_id", 3)
                    .with("app_name", "C")
                    .with("category", "HR")
                    .with("in_use", true)
                    .with("integrates_with_apps", "Okta"),
            ],
        )
        .unwrap();

        let summary = summarize(&pool).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.inactive, 1);
        assert_eq!(summary.total_annual_cost, 400.0);
        assert_eq!(summary.average_annual_cost, 200.0);
        assert_eq!(summary.with_dependencies, 1);
        assert_eq!(summary.with_integrations, 1);
        assert_eq!(summary.by_category, vec![("Finance".to_string(), 2), ("HR".to_string(), 1)]);
        assert!(summary.top_vendors.is_empty());
    }

    #[test]
    fn test_summary_of_empty_table() {
        let pool = DbPool::in_memory().unwrap();
        run_migrations(&pool).unwrap();
        let summary = summarize(&pool).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_annual_cost, 0.0);
    }
}
