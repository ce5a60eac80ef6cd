//! SQLite connection pool.
//!
//! The relational side of the walkthrough is a single embedded database file,
//! so the "pool" is one connection behind a mutex. All writes happen from one
//! thread during seeding; reads happen once per migration.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Connection lock poisoned")]
    LockPoisoned,
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Single-connection SQLite pool.
pub struct DbPool {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl DbPool {
    /// Open a database file, creating it if needed.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Run a closure with a shared reference to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let guard = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&guard)
    }

    /// Run a closure with a mutable reference to the connection
    /// (transactions, migrations).
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut Connection) -> DbResult<T>,
    {
        let mut guard = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&mut guard)
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
