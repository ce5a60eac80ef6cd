//! Centralized error types for AppGraph.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Main error type for AppGraph operations.
#[derive(Error, Debug)]
pub enum AppGraphError {
    #[error("Graph database unavailable: {0}")]
    GraphUnavailable(String),

    #[error("Graph write failed: {0}")]
    GraphStore(String),

    #[error("Database error: {0}")]
    Database(#[from] appgraph_db::DbError),
}

/// Result type for AppGraph operations.
pub type AppGraphResult<T> = Result<T, AppGraphError>;

/// Why a row could not become an `Application` at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// A scalar cell that could not be coerced. The field is loaded as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub column: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}': expected {}, got '{}' (stored as null)",
            self.column, self.expected, self.value
        )
    }
}
