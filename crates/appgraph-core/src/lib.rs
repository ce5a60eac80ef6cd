//! AppGraph Core Library
//!
//! Typed model of the applications inventory and the rules that turn raw
//! relational rows into it.

pub mod application;
pub mod error;
pub mod generate;

pub use application::model::{AppKey, Application};
pub use error::{AppGraphError, AppGraphResult, FieldIssue, RowError};
