//! Ad-hoc SQL execution.
//!
//! Used by the query catalog to run the relational side of each comparison
//! and by `appgraph db sql`.

use crate::pool::{DbPool, DbResult};
use crate::row::Cell;
use serde::Serialize;

/// Column names plus rows of cells.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl QueryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Each row as a JSON object keyed by column name.
    pub fn to_json_rows(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let map: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.clone(), cell_to_json(cell)))
                    .collect();
                serde_json::Value::Object(map)
            })
            .collect()
    }
}

fn cell_to_json(cell: &Cell) -> serde_json::Value {
    match cell {
        Cell::Null => serde_json::Value::Null,
        Cell::Integer(i) => serde_json::Value::from(*i),
        Cell::Real(r) => serde_json::Value::from(*r),
        Cell::Text(s) => serde_json::Value::from(s.as_str()),
    }
}

/// Run a statement and collect every result row.
pub fn raw_query(pool: &DbPool, sql: &str) -> DbResult<QueryTable> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |r| {
                let mut cells = Vec::with_capacity(width);
                for i in 0..width {
                    cells.push(r.get::<_, Cell>(i)?);
                }
                Ok(cells)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryTable { columns, rows })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use crate::queries::applications::insert_applications;
    use crate::row::ApplicationRow;

    #[test]
    fn test_raw_query_groups() {
        let pool = DbPool::in_memory().unwrap();
        run_migrations(&pool).unwrap();
        insert_applications(
            &pool,
            &[
                ApplicationRow::new().with("app_id", 1).with("app_name", "A").with("vendor_name", "Acme"),
                ApplicationRow::new().with("app_id", 2).with("app_name", "B").with("vendor_name", "Acme"),
                ApplicationRow::new().with("app_id", 3).with("app_name", "C").with("vendor_name", "Globex"),
            ],
        )
        .unwrap();

        let table = raw_query(
            &pool,
            "SELECT vendor_name AS vendor, COUNT(*) AS app_count
             FROM applications GROUP BY vendor_name ORDER BY app_count DESC",
        )
        .unwrap();

        assert_eq!(table.columns, vec!["vendor", "app_count"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec![Cell::from("Acme"), Cell::Integer(2)]);

        let json = table.to_json_rows();
        assert_eq!(json[1]["vendor"], "Globex");
        assert_eq!(json[1]["app_count"], 1);
    }

    #[test]
    fn test_raw_query_rejects_bad_sql() {
        let pool = DbPool::in_memory().unwrap();
        assert!(raw_query(&pool, "SELEC nonsense").is_err());
    }
}
