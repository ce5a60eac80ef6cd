//! Cell coercion.
//!
//! A cell that cannot be read as its column's type is recorded as a
//! `FieldIssue` and yields `None`. Blank cells are simply absent.

use appgraph_db::{ApplicationRow, Cell};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::FieldIssue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Split a comma-separated list: tokens are trimmed, empty tokens dropped,
/// repeats collapsed to their first occurrence.
pub fn split_list(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for token in text.split(',') {
        let token = token.trim();
        if !token.is_empty() && !items.iter().any(|t| t == token) {
            items.push(token.to_string());
        }
    }
    items
}

/// Reads typed values out of one row, collecting issues as it goes.
pub(crate) struct Coercer<'a> {
    row: &'a ApplicationRow,
    issues: Vec<FieldIssue>,
}

impl<'a> Coercer<'a> {
    pub(crate) fn new(row: &'a ApplicationRow) -> Self {
        Self { row, issues: Vec::new() }
    }

    pub(crate) fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }

    fn reject(&mut self, column: &'static str, cell: &Cell, expected: &'static str) {
        self.issues.push(FieldIssue {
            column,
            value: cell.to_string(),
            expected,
        });
    }

    /// Text column. Numbers are rendered as text rather than rejected.
    pub(crate) fn text(&mut self, column: &'static str) -> Option<String> {
        match self.row.get(column) {
            Cell::Null => None,
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Real(r) => Some(r.to_string()),
            cell => cell.as_text().map(str::to_string),
        }
    }

    pub(crate) fn list(&mut self, column: &'static str) -> Vec<String> {
        self.text(column).map(|t| split_list(&t)).unwrap_or_default()
    }

    pub(crate) fn integer(&mut self, column: &'static str) -> Option<i64> {
        let row = self.row;
        let cell = row.get(column);
        let parsed = match cell {
            Cell::Null => return None,
            Cell::Integer(i) => Some(*i),
            Cell::Real(r) => integral(*r),
            Cell::Text(_) => match cell.as_text() {
                None => return None,
                Some(s) => s
                    .parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral)),
            },
        };
        if parsed.is_none() {
            self.reject(column, cell, "an integer");
        }
        parsed
    }

    pub(crate) fn real(&mut self, column: &'static str) -> Option<f64> {
        let row = self.row;
        let cell = row.get(column);
        let parsed = match cell {
            Cell::Null => return None,
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(r) => Some(*r).filter(|r| r.is_finite()),
            Cell::Text(_) => match cell.as_text() {
                None => return None,
                Some(s) => s.parse::<f64>().ok().filter(|r| r.is_finite()),
            },
        };
        if parsed.is_none() {
            self.reject(column, cell, "a number");
        }
        parsed
    }

    pub(crate) fn boolean(&mut self, column: &'static str) -> Option<bool> {
        let row = self.row;
        let cell = row.get(column);
        let parsed = match cell {
            Cell::Null => return None,
            Cell::Integer(0) => Some(false),
            Cell::Integer(1) => Some(true),
            Cell::Integer(_) => None,
            Cell::Real(r) if *r == 0.0 => Some(false),
            Cell::Real(r) if *r == 1.0 => Some(true),
            Cell::Real(_) => None,
            Cell::Text(_) => match cell.as_text() {
                None => return None,
                Some(s) => parse_bool(s),
            },
        };
        if parsed.is_none() {
            self.reject(column, cell, "a boolean");
        }
        parsed
    }

    pub(crate) fn date(&mut self, column: &'static str) -> Option<NaiveDate> {
        let row = self.row;
        let cell = row.get(column);
        let parsed = match cell {
            Cell::Null => return None,
            Cell::Text(_) => match cell.as_text() {
                None => return None,
                Some(s) => parse_date(s),
            },
            _ => None,
        };
        if parsed.is_none() {
            self.reject(column, cell, "a date (YYYY-MM-DD)");
        }
        parsed
    }

    pub(crate) fn datetime(&mut self, column: &'static str) -> Option<NaiveDateTime> {
        let row = self.row;
        let cell = row.get(column);
        let parsed = match cell {
            Cell::Null => return None,
            Cell::Text(_) => match cell.as_text() {
                None => return None,
                Some(s) => parse_datetime(s),
            },
            _ => None,
        };
        if parsed.is_none() {
            self.reject(column, cell, "a timestamp");
        }
        parsed
    }
}

fn integral(r: f64) -> Option<i64> {
    if r.is_finite() && r.fract() == 0.0 && r.abs() < i64::MAX as f64 {
        Some(r as i64)
    } else {
        None
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty() {
        assert_eq!(split_list("AppA, AppB,AppC "), vec!["AppA", "AppB", "AppC"]);
        assert_eq!(split_list(",AppA,,AppB,"), vec!["AppA", "AppB"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn test_split_list_collapses_repeats() {
        assert_eq!(split_list("Slack, Jira, Slack"), vec!["Slack", "Jira"]);
    }

    #[test]
    fn test_integer_accepts_integral_reals_and_text() {
        let row = ApplicationRow::new()
            .with("user_count", 12.0)
            .with("app_id", " 7 ");
        let mut c = Coercer::new(&row);
        assert_eq!(c.integer("user_count"), Some(12));
        assert_eq!(c.integer("app_id"), Some(7));
        assert!(c.into_issues().is_empty());
    }

    #[test]
    fn test_bad_number_is_reported() {
        let row = ApplicationRow::new()
            .with("annual_cost", "lots")
            .with("user_count", 2.5);
        let mut c = Coercer::new(&row);
        assert_eq!(c.real("annual_cost"), None);
        assert_eq!(c.integer("user_count"), None);

        let issues = c.into_issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].column, "annual_cost");
        assert_eq!(issues[0].value, "lots");
        assert_eq!(issues[1].column, "user_count");
    }

    #[test]
    fn test_booleans() {
        let row = ApplicationRow::new()
            .with("a", 1)
            .with("b", "No")
            .with("c", "maybe")
            .with("d", 3);
        let mut c = Coercer::new(&row);
        assert_eq!(c.boolean("a"), Some(true));
        assert_eq!(c.boolean("b"), Some(false));
        assert_eq!(c.boolean("c"), None);
        assert_eq!(c.boolean("d"), None);
        assert_eq!(c.into_issues().len(), 2);
    }

    #[test]
    fn test_dates() {
        let row = ApplicationRow::new()
            .with("installation_date", "2021-03-04")
            .with("last_updated", "2022-01-02T10:11:12.123456")
            .with("renewal_date", "04/03/2021")
            .with("end_of_life_date", "");
        let mut c = Coercer::new(&row);
        assert_eq!(c.date("installation_date"), NaiveDate::from_ymd_opt(2021, 3, 4));
        assert_eq!(c.date("last_updated"), NaiveDate::from_ymd_opt(2022, 1, 2));
        assert_eq!(c.date("renewal_date"), None);
        assert_eq!(c.date("end_of_life_date"), None);

        let issues = c.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, "renewal_date");
    }

    #[test]
    fn test_datetime_accepts_date_only() {
        let row = ApplicationRow::new()
            .with("created_at", "2024-05-06")
            .with("updated_at", "2024-05-06T07:08:09+00:00");
        let mut c = Coercer::new(&row);
        let created = c.datetime("created_at").unwrap();
        assert_eq!(created.to_string(), "2024-05-06 00:00:00");
        let updated = c.datetime("updated_at").unwrap();
        assert_eq!(updated.to_string(), "2024-05-06 07:08:09");
    }

    #[test]
    fn test_text_renders_numbers() {
        let row = ApplicationRow::new().with("app_version", 2).with("notes", "  ");
        let mut c = Coercer::new(&row);
        assert_eq!(c.text("app_version"), Some("2".to_string()));
        assert_eq!(c.text("notes"), None);
    }
}
