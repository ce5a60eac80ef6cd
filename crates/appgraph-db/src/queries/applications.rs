//! Application-related database queries.

use crate::pool::{DbError, DbPool, DbResult};
use crate::row::{is_application_column, ApplicationRow, Cell, APPLICATION_COLUMNS};
use rusqlite::{params, params_from_iter, Connection};

/// Insert a single application row. Only the columns present in the row are written.
pub fn insert_application(pool: &DbPool, row: &ApplicationRow) -> DbResult<()> {
    pool.with_conn(|conn| insert_row(conn, row))
}

/// Insert many rows in one transaction.
pub fn insert_applications(pool: &DbPool, rows: &[ApplicationRow]) -> DbResult<usize> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        for row in rows {
            insert_row(&tx, row)?;
        }
        tx.commit()?;
        Ok(rows.len())
    })
}

fn insert_row(conn: &Connection, row: &ApplicationRow) -> DbResult<()> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values: Vec<&Cell> = Vec::with_capacity(row.len());

    for (column, cell) in row.columns() {
        if !is_application_column(column) {
            return Err(DbError::UnknownColumn(column.to_string()));
        }
        columns.push(column);
        values.push(cell);
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO applications ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );

    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Read every application row, ordered by `app_id`.
///
/// Values come back exactly as stored; no coercion happens here.
pub fn list_applications(pool: &DbPool) -> DbResult<Vec<ApplicationRow>> {
    pool.with_conn(|conn| {
        let sql = format!(
            "SELECT {} FROM applications ORDER BY app_id",
            APPLICATION_COLUMNS.join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Fetch one application by id.
pub fn get_application(pool: &DbPool, app_id: i64) -> DbResult<ApplicationRow> {
    pool.with_conn(|conn| {
        let sql = format!(
            "SELECT {} FROM applications WHERE app_id = ?1",
            APPLICATION_COLUMNS.join(", ")
        );
        conn.query_row(&sql, params![app_id], read_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("Application: {}", app_id))
                }
                e => DbError::Connection(e),
            })
    })
}

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<ApplicationRow> {
    let mut row = ApplicationRow::new();
    for (i, column) in APPLICATION_COLUMNS.iter().enumerate() {
        let cell: Cell = r.get(i)?;
        row.set(column, cell);
    }
    Ok(row)
}

/// Number of rows in `applications`.
pub fn count_applications(pool: &DbPool) -> DbResult<i64> {
    pool.with_conn(|conn| {
        let count = conn.query_row("SELECT COUNT(*) FROM applications", [], |row| row.get(0))?;
        Ok(count)
    })
}

/// Delete every application row. Returns the number of rows removed.
pub fn clear_applications(pool: &DbPool) -> DbResult<usize> {
    pool.with_conn(|conn| Ok(conn.execute("DELETE FROM applications", [])?))
}
