//! Applications inventory.
//!
//! Turns raw `applications` rows into typed [`Application`] values under one
//! fixed policy: a row without a name is rejected, any other unreadable cell
//! is loaded as null and reported.

pub mod coerce;
pub mod model;

use appgraph_db::ApplicationRow;
use tracing::warn;

use crate::error::{FieldIssue, RowError};
use model::Application;

pub use coerce::split_list;

/// A row that became an `Application`, plus any cells that were nulled.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub application: Application,
    pub issues: Vec<FieldIssue>,
}

/// A row that could not become an `Application`.
#[derive(Debug, Clone)]
pub struct RejectedRow {
    /// Position of the row in the input (0-based).
    pub index: usize,
    /// Raw `app_id` cell, for identifying the row in logs.
    pub app_id: Option<String>,
    pub error: RowError,
}

/// Result of parsing a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Accepted rows with their input position.
    pub parsed: Vec<(usize, ParsedRow)>,
    pub rejected: Vec<RejectedRow>,
}

impl ParseOutcome {
    pub fn issue_count(&self) -> usize {
        self.parsed.iter().map(|(_, p)| p.issues.len()).sum()
    }
}

/// Build an `Application` from one raw row.
pub fn from_row(row: &ApplicationRow) -> Result<ParsedRow, RowError> {
    let mut c = coerce::Coercer::new(row);

    let name = c.text("app_name").ok_or(RowError::MissingField("app_name"))?;

    let application = Application {
        app_id: c.integer("app_id"),
        name,
        description: c.text("app_description"),
        version: c.text("app_version"),
        category: c.text("category"),
        subcategory: c.text("subcategory"),
        vendor_name: c.text("vendor_name"),
        vendor_contact_email: c.text("vendor_contact_email"),
        department: c.text("department"),
        app_owner: c.text("app_owner"),
        technical_lead: c.text("technical_lead"),
        business_owner: c.text("business_owner"),
        annual_cost: c.real("annual_cost"),
        license_type: c.text("license_type"),
        cost_center: c.text("cost_center"),
        in_use: c.boolean("in_use"),
        user_count: c.integer("user_count"),
        deployment_type: c.text("deployment_type"),
        environment: c.text("environment"),
        platform: c.text("platform"),
        programming_language: c.text("programming_language"),
        database_type: c.text("database_type"),
        depends_on: c.list("depends_on_apps"),
        integrates_with: c.list("integrates_with_apps"),
        compliance_requirements: c.list("compliance_requirements"),
        security_classification: c.text("security_classification"),
        data_sensitivity: c.text("data_sensitivity"),
        installation_date: c.date("installation_date"),
        last_updated: c.date("last_updated"),
        end_of_life_date: c.date("end_of_life_date"),
        renewal_date: c.date("renewal_date"),
        uptime_sla: c.real("uptime_sla"),
        criticality: c.text("criticality"),
        tags: c.list("tags"),
        notes: c.text("notes"),
        created_at: c.datetime("created_at"),
        updated_at: c.datetime("updated_at"),
    };

    Ok(ParsedRow {
        application,
        issues: c.into_issues(),
    })
}

/// Parse every row, logging rejected rows and nulled cells.
pub fn parse_rows(rows: &[ApplicationRow]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        match from_row(row) {
            Ok(parsed) => {
                for issue in &parsed.issues {
                    warn!(row = index, app = %parsed.application.name, "{}", issue);
                }
                outcome.parsed.push((index, parsed));
            }
            Err(error) => {
                let app_id = match row.get("app_id") {
                    cell if cell.is_null() => None,
                    cell => Some(cell.to_string()),
                };
                warn!(row = index, app_id = ?app_id, error = %error, "Skipping application row");
                outcome.rejected.push(RejectedRow { index, app_id, error });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn full_row() -> ApplicationRow {
        ApplicationRow::new()
            .with("app_id", 1)
            .with("app_name", "Acme Ledger App")
            .with("category", "Finance")
            .with("subcategory", "Accounting")
            .with("vendor_name", "Acme Corp")
            .with("app_owner", "Ana Silva")
            .with("technical_lead", "Bo Chen")
            .with("business_owner", "Ana Silva")
            .with("department", "Finance Dept")
            .with("annual_cost", 1234.5)
            .with("in_use", 1)
            .with("user_count", 40)
            .with("depends_on_apps", "Slack, Jira")
            .with("integrates_with_apps", "")
            .with("compliance_requirements", "SOX,GDPR")
            .with("tags", "ledger, books")
            .with("installation_date", "2020-01-15")
            .with("uptime_sla", 99.5)
    }

    #[test]
    fn test_from_row() {
        let parsed = from_row(&full_row()).unwrap();
        let app = parsed.application;

        assert!(parsed.issues.is_empty());
        assert_eq!(app.app_id, Some(1));
        assert_eq!(app.name, "Acme Ledger App");
        assert_eq!(app.in_use, Some(true));
        assert_eq!(app.depends_on, vec!["Slack", "Jira"]);
        assert!(app.integrates_with.is_empty());
        assert_eq!(app.compliance_requirements, vec!["SOX", "GDPR"]);
        assert_eq!(app.tags, vec!["ledger", "books"]);
        assert_eq!(app.installation_date, NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(app.end_of_life_date, None);
    }

    #[test]
    fn test_missing_name_rejected() {
        let row = ApplicationRow::new().with("app_id", 3).with("app_name", None::<String>);
        assert_eq!(from_row(&row).unwrap_err(), RowError::MissingField("app_name"));

        let blank = ApplicationRow::new().with("app_id", 4).with("app_name", "  ");
        assert!(from_row(&blank).is_err());
    }

    #[test]
    fn test_malformed_scalar_loaded_as_null() {
        let row = full_row()
            .with("annual_cost", "n/a")
            .with("renewal_date", "someday");
        let parsed = from_row(&row).unwrap();

        assert_eq!(parsed.application.annual_cost, None);
        assert_eq!(parsed.application.renewal_date, None);
        assert_eq!(parsed.application.name, "Acme Ledger App");
        let columns: Vec<_> = parsed.issues.iter().map(|i| i.column).collect();
        assert_eq!(columns, vec!["annual_cost", "renewal_date"]);
    }

    #[test]
    fn test_parse_rows_keeps_going() {
        let rows = vec![
            full_row(),
            ApplicationRow::new().with("app_id", 2),
            ApplicationRow::new().with("app_id", 3).with("app_name", "Other"),
        ];
        let outcome = parse_rows(&rows);

        assert_eq!(outcome.parsed.len(), 2);
        assert_eq!(outcome.parsed[1].0, 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 1);
        assert_eq!(outcome.rejected[0].app_id.as_deref(), Some("2"));
    }
}
