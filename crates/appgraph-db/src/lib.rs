//! AppGraph Database Layer
//!
//! SQLite storage for the relational side of the walkthrough: the
//! `applications` table, its migration, and the queries that read it.

pub mod migrations;
pub mod pool;
pub mod queries;
pub mod row;

use std::path::Path;

pub use pool::{DbError, DbPool, DbResult};
pub use queries::raw::QueryTable;
pub use row::{ApplicationRow, Cell, APPLICATION_COLUMNS};

/// Open the database at `path` and bring its schema up to date.
pub fn init_pool(path: &Path) -> DbResult<DbPool> {
    let pool = DbPool::open(path)?;
    migrations::run_migrations(&pool)?;
    tracing::debug!(path = %path.display(), "SQLite database ready");
    Ok(pool)
}

/// In-memory database with the schema applied (for testing).
pub fn init_in_memory() -> DbResult<DbPool> {
    let pool = DbPool::in_memory()?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
