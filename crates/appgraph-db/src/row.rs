//! Raw relational rows.
//!
//! The db layer never coerces: every column is read back as the SQLite storage
//! class it was stored with. Typing happens in `appgraph-core`.

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::Serialize;

/// Columns of the `applications` table, in schema order.
pub const APPLICATION_COLUMNS: &[&str] = &[
    "app_id",
    "app_name",
    "app_description",
    "app_version",
    "category",
    "subcategory",
    "vendor_name",
    "vendor_contact_email",
    "app_owner",
    "technical_lead",
    "business_owner",
    "department",
    "annual_cost",
    "license_type",
    "cost_center",
    "in_use",
    "user_count",
    "deployment_type",
    "environment",
    "platform",
    "programming_language",
    "database_type",
    "depends_on_apps",
    "integrates_with_apps",
    "compliance_requirements",
    "security_classification",
    "data_sensitivity",
    "installation_date",
    "last_updated",
    "end_of_life_date",
    "renewal_date",
    "uptime_sla",
    "criticality",
    "tags",
    "notes",
    "created_at",
    "updated_at",
];

/// Returns true if `column` belongs to the `applications` table.
pub fn is_application_column(column: &str) -> bool {
    APPLICATION_COLUMNS.contains(&column)
}

/// A single SQLite value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text content, trimmed. Blank text reads as absent.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { Some(s) }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Integer(v as i64)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Real(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Integer(v as i64)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(r) => Cell::Real(r),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Cell::Text(String::from_utf8_lossy(t).into_owned())
            }
        })
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// One row of the `applications` table, keyed by column name.
///
/// A column that was never set reads as `Cell::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationRow {
    cells: BTreeMap<String, Cell>,
}

impl ApplicationRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, column: &str, value: impl Into<Cell>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<Cell>) {
        self.cells.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> &Cell {
        static NULL: Cell = Cell::Null;
        self.cells.get(column).unwrap_or(&NULL)
    }

    /// Trimmed, non-blank text of a column.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).as_text()
    }

    /// Columns that were explicitly set, in column-name order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_reads_null() {
        let row = ApplicationRow::new().with("app_name", "Billing");
        assert_eq!(row.get("vendor_name"), &Cell::Null);
        assert_eq!(row.text("app_name"), Some("Billing"));
    }

    #[test]
    fn test_blank_text_reads_absent() {
        let row = ApplicationRow::new().with("subcategory", "   ");
        assert_eq!(row.text("subcategory"), None);
        assert!(!row.get("subcategory").is_null());
    }

    #[test]
    fn test_option_into_cell() {
        let row = ApplicationRow::new()
            .with("user_count", None::<i64>)
            .with("annual_cost", Some(12.5));
        assert!(row.get("user_count").is_null());
        assert_eq!(row.get("annual_cost"), &Cell::Real(12.5));
    }

    #[test]
    fn test_known_columns() {
        assert!(is_application_column("depends_on_apps"));
        assert!(!is_application_column("app_id; DROP TABLE applications"));
        assert_eq!(APPLICATION_COLUMNS.len(), 37);
    }
}
