//! Application domain models.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// An application from the inventory, with every column typed.
///
/// `depends_on` and `integrates_with` are relationship input only; they are
/// kept here so the loader can turn them into edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub app_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,

    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_contact_email: Option<String>,
    pub department: Option<String>,

    pub app_owner: Option<String>,
    pub technical_lead: Option<String>,
    pub business_owner: Option<String>,

    pub annual_cost: Option<f64>,
    pub license_type: Option<String>,
    pub cost_center: Option<String>,

    pub in_use: Option<bool>,
    pub user_count: Option<i64>,
    pub deployment_type: Option<String>,
    pub environment: Option<String>,
    pub platform: Option<String>,
    pub programming_language: Option<String>,
    pub database_type: Option<String>,

    pub depends_on: Vec<String>,
    pub integrates_with: Vec<String>,

    pub compliance_requirements: Vec<String>,
    pub security_classification: Option<String>,
    pub data_sensitivity: Option<String>,

    pub installation_date: Option<NaiveDate>,
    pub last_updated: Option<NaiveDate>,
    pub end_of_life_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,

    pub uptime_sla: Option<f64>,
    pub criticality: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Application {
    /// A bare application with only a name. Mostly useful in tests.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The identity used to upsert this application.
    pub fn key(&self) -> AppKey {
        match self.app_id {
            Some(id) => AppKey::Id(id),
            None => AppKey::Name(self.name.clone()),
        }
    }

    pub fn is_end_of_life(&self) -> bool {
        self.end_of_life_date.is_some()
    }
}

/// Natural key of an application: `app_id` when present, otherwise its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AppKey {
    Id(i64),
    Name(String),
}

impl fmt::Display for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppKey::Id(id) => write!(f, "app_id={}", id),
            AppKey::Name(name) => write!(f, "name={}", name),
        }
    }
}
