//! Synthetic applications inventory.
//!
//! Produces plausible `applications` rows for the walkthrough. Output is fully
//! determined by the seed and the reference date.

use std::collections::HashSet;

use appgraph_db::{ApplicationRow, DbPool};
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::AppGraphResult;

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Productivity", &["Office Suite", "Project Management", "Note Taking", "Task Management"]),
    ("Communication", &["Messaging", "Video Conferencing", "Email"]),
    ("Design", &["Graphic Design", "Video Editing", "CAD"]),
    ("Development", &["IDE", "Version Control", "CI/CD", "Database Tool"]),
    ("Finance", &["Accounting", "Expense Tracking", "Payroll"]),
    ("HR", &["Recruitment", "Performance Management", "Onboarding"]),
    ("Marketing", &["CRM", "Analytics", "Social Media Management"]),
    ("Sales", &["CRM", "Sales Enablement", "E-commerce"]),
    ("IT Operations", &["Monitoring", "Ticketing", "Asset Management"]),
    ("Security", &["Antivirus", "Firewall", "MFA"]),
];

/// Well-known products that inventory rows depend on or integrate with.
pub const COMMON_APPS: &[&str] = &[
    "Gmail", "Microsoft Teams", "Slack", "Zoom", "Jira", "Confluence", "GitHub", "GitLab",
    "Adobe Photoshop", "Figma", "Salesforce", "SAP ERP", "Workday", "ServiceNow", "Splunk",
    "Okta", "Azure AD", "AWS Console", "Google Cloud Console", "Postman", "VS Code", "Notion",
    "Asana", "Trello", "Miro", "Tableau", "Power BI", "Google Analytics", "Mailchimp",
];

const LICENSE_TYPES: &[&str] = &["subscription", "perpetual", "open_source", "freemium"];
const DEPLOYMENT_TYPES: &[&str] = &["cloud", "on_premise", "hybrid"];
const ENVIRONMENTS: &[&str] = &["production", "staging", "development"];
const PLATFORMS: &[&str] = &["web", "desktop", "mobile", "api"];
const DATABASE_TYPES: &[&str] = &["PostgreSQL", "MySQL", "MongoDB", "SQLite", "Oracle", "SQL Server", "Neo4j"];
const LANGUAGES: &[&str] = &[
    "Python", "JavaScript", "Java", "C++", "C#", "Ruby", "Go", "Rust", "PHP", "TypeScript", "Swift", "Kotlin",
];
const SECURITY_CLASSIFICATIONS: &[&str] = &["public", "internal", "confidential", "restricted"];
const LEVELS: &[&str] = &["low", "medium", "high", "critical"];
const COMPLIANCE: &[&str] = &["SOX", "GDPR", "HIPAA", "PCI DSS", "ISO 27001"];

const COMPANY_PREFIXES: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Stark", "Wayne", "Hooli", "Vandelay", "Soylent",
    "Tyrell", "Cyberdyne", "Wonka", "Aperture", "Massive", "Oscorp", "Gringotts", "Monarch",
    "Pied Piper", "Dunder", "Sterling",
];
const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "Labs", "Systems", "Partners", "Holdings", "Ltd"];
const PRODUCT_WORDS: &[&str] = &[
    "Nimbus", "Ledger", "Pulse", "Beacon", "Atlas", "Forge", "Harbor", "Vector", "Summit", "Orbit",
    "Quill", "Relay", "Prism", "Anchor", "Cascade", "Lumen", "Vault", "Compass", "Echo", "Sprout",
];
const FIRST_NAMES: &[&str] = &[
    "Ana", "Ben", "Chloe", "Diego", "Elena", "Farah", "Gus", "Hana", "Ivan", "Jada", "Kofi", "Lena",
    "Marco", "Nia", "Omar", "Priya", "Quinn", "Rosa", "Sam", "Tara",
];
const LAST_NAMES: &[&str] = &[
    "Silva", "Chen", "Okafor", "Novak", "Garcia", "Patel", "Kim", "Muller", "Rossi", "Haddad",
    "Larsen", "Ito", "Mensah", "Kowalski", "Dubois", "Singh",
];
const DEPARTMENTS: &[&str] = &[
    "Accounting", "Engineering", "Marketing", "Sales", "Human_resources", "Legal", "Operations",
    "Customer_support", "Research", "Procurement", "Facilities", "Security",
];
const WORDS: &[&str] = &[
    "legacy", "core", "internal", "shared", "pilot", "regional", "global", "reporting", "batch",
    "realtime", "customer", "partner",
];

/// Random inventory generator.
pub struct Generator {
    rng: StdRng,
    today: NaiveDate,
    used_names: HashSet<String>,
}

impl Generator {
    pub fn new(seed: u64, today: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today,
            used_names: HashSet::new(),
        }
    }

    /// Generate `count` rows with `app_id` 1..=count.
    pub fn applications(&mut self, count: usize) -> Vec<ApplicationRow> {
        (1..=count as i64).map(|id| self.application(id)).collect()
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn company(&mut self) -> String {
        format!("{} {}", self.pick(COMPANY_PREFIXES), self.pick(COMPANY_SUFFIXES))
    }

    fn person(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn unique_app_name(&mut self) -> String {
        for _ in 0..64 {
            let name = format!("{} {} App", self.pick(COMPANY_PREFIXES), self.pick(PRODUCT_WORDS));
            if self.used_names.insert(name.clone()) {
                return name;
            }
        }
        let name = format!("{} {} App {}", self.pick(COMPANY_PREFIXES), self.pick(PRODUCT_WORDS), self.used_names.len());
        self.used_names.insert(name.clone());
        name
    }

    /// Random date in `[start, end]`.
    fn date_between(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        let span = (end - start).num_days().max(0);
        start + Duration::days(self.rng.gen_range(0..=span))
    }

    fn sample_apps(&mut self, max: usize, exclude: &[&str]) -> Vec<&'static str> {
        let n = self.rng.gen_range(0..=max);
        COMMON_APPS
            .choose_multiple(&mut self.rng, n)
            .copied()
            .filter(|a| !exclude.contains(a))
            .collect()
    }

    fn application(&mut self, app_id: i64) -> ApplicationRow {
        let today = self.today;
        let name = self.unique_app_name();
        let (category, subcategories) = *CATEGORIES.choose(&mut self.rng).unwrap_or(&CATEGORIES[0]);
        let subcategory = self.pick(subcategories);
        let vendor = self.company();
        let vendor_domain = vendor.split_whitespace().next().unwrap_or("vendor").to_lowercase();
        let contact = self.pick(FIRST_NAMES).to_lowercase();
        let department = format!("{} Dept", self.pick(DEPARTMENTS));

        let installation_date = self.date_between(today - Duration::days(5 * 365), today);
        let last_updated = self.date_between(installation_date, today);
        let end_of_life_date = if self.rng.gen_bool(0.1) {
            Some(self.date_between(today - Duration::days(365), today).to_string())
        } else {
            None
        };
        let renewal_date = self.date_between(today, today + Duration::days(2 * 365));

        let depends_on = self.sample_apps(3, &[name.as_str()]);
        let mut exclude = depends_on.clone();
        exclude.push(name.as_str());
        let integrates_with = self.sample_apps(3, &exclude);

        let compliance_count = self.rng.gen_range(0..=3);
        let compliance: Vec<&str> = COMPLIANCE
            .choose_multiple(&mut self.rng, compliance_count)
            .copied()
            .collect();
        let tag_count = self.rng.gen_range(1..=5);
        let tags: Vec<&str> = WORDS.choose_multiple(&mut self.rng, tag_count).copied().collect();

        let user_count = if self.rng.gen_bool(0.8) {
            Some(self.rng.gen_range(10..=5000i64))
        } else {
            None
        };
        let language = if self.rng.gen_bool(0.7) {
            Some(self.pick(LANGUAGES))
        } else {
            None
        };
        let database = if self.rng.gen_bool(0.6) {
            Some(self.pick(DATABASE_TYPES))
        } else {
            None
        };

        let created_at = (today - Duration::days(self.rng.gen_range(0..5 * 365)))
            .and_time(NaiveTime::MIN)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let updated_at = today.and_time(NaiveTime::MIN).format("%Y-%m-%dT%H:%M:%S").to_string();
        let version = format!(
            "{}.{}.{}",
            self.rng.gen_range(1..=5),
            self.rng.gen_range(0..=9),
            self.rng.gen_range(0..=9)
        );
        let annual_cost = (self.rng.gen_range(1000.0..500000.0_f64) * 100.0).round() / 100.0;
        let uptime_sla = (self.rng.gen_range(99.0..99.99_f64) * 100.0).round() / 100.0;
        let cost_center = format!("CC{:04}", self.rng.gen_range(0..10000));
        let word = self.pick(WORDS);

        ApplicationRow::new()
            .with("app_id", app_id)
            .with("app_description", format!("{} application for {} {}.", word, category.to_lowercase(), subcategory.to_lowercase()))
            .with("app_name", name)
            .with("app_version", version)
            .with("category", category)
            .with("subcategory", subcategory)
            .with("vendor_contact_email", format!("{}@{}.example.com", contact, vendor_domain))
            .with("vendor_name", vendor)
            .with("app_owner", self.person())
            .with("technical_lead", self.person())
            .with("business_owner", self.person())
            .with("department", department)
            .with("annual_cost", annual_cost)
            .with("license_type", self.pick(LICENSE_TYPES))
            .with("cost_center", cost_center)
            .with("in_use", self.rng.gen_bool(0.9))
            .with("user_count", user_count)
            .with("deployment_type", self.pick(DEPLOYMENT_TYPES))
            .with("environment", self.pick(ENVIRONMENTS))
            .with("platform", self.pick(PLATFORMS))
            .with("programming_language", language)
            .with("database_type", database)
            .with("depends_on_apps", depends_on.join(","))
            .with("integrates_with_apps", integrates_with.join(","))
            .with("compliance_requirements", compliance.join(","))
            .with("security_classification", self.pick(SECURITY_CLASSIFICATIONS))
            .with("data_sensitivity", self.pick(LEVELS))
            .with("installation_date", installation_date.to_string())
            .with("last_updated", last_updated.to_string())
            .with("end_of_life_date", end_of_life_date)
            .with("renewal_date", renewal_date.to_string())
            .with("uptime_sla", uptime_sla)
            .with("criticality", self.pick(LEVELS))
            .with("tags", tags.join(","))
            .with("notes", format!("Managed by the {} team.", word))
            .with("created_at", created_at)
            .with("updated_at", updated_at)
    }
}

/// Generate `count` rows with a fixed seed.
pub fn generate_applications(count: usize, seed: u64, today: NaiveDate) -> Vec<ApplicationRow> {
    Generator::new(seed, today).applications(count)
}

/// Generate rows and insert them. With `replace`, existing rows are deleted first.
pub fn seed_database(pool: &DbPool, count: usize, seed: u64, today: NaiveDate, replace: bool) -> AppGraphResult<usize> {
    if replace {
        let removed = appgraph_db::queries::applications::clear_applications(pool)?;
        info!(removed, "Cleared applications table");
    }

    let rows = generate_applications(count, seed, today);
    let inserted = appgraph_db::queries::applications::insert_applications(pool, &rows)?;
    info!(inserted, seed, "Seeded applications table");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{from_row, split_list};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = generate_applications(20, 7, today());
        let b = generate_applications(20, 7, today());
        assert_eq!(a, b);
    }

    #[test]
    fn test_rows_parse_cleanly() {
        let rows = generate_applications(50, 1, today());
        assert_eq!(rows.len(), 50);

        let mut names = HashSet::new();
        for (i, row) in rows.iter().enumerate() {
            let parsed = from_row(row).unwrap();
            assert!(parsed.issues.is_empty(), "row {} had issues: {:?}", i, parsed.issues);
            assert_eq!(parsed.application.app_id, Some(i as i64 + 1));
            assert!(names.insert(parsed.application.name.clone()));
        }
    }

    #[test]
    fn test_dependency_lists_are_disjoint() {
        for row in generate_applications(50, 3, today()) {
            let deps = split_list(row.text("depends_on_apps").unwrap_or(""));
            let integrations = split_list(row.text("integrates_with_apps").unwrap_or(""));
            assert!(deps.len() <= 3 && integrations.len() <= 3);
            assert!(deps.iter().all(|d| !integrations.contains(d)));
            assert!(deps.iter().all(|d| COMMON_APPS.contains(&d.as_str())));
        }
    }

    #[test]
    fn test_seed_database() {
        let pool = appgraph_db::init_in_memory().unwrap();
        assert_eq!(seed_database(&pool, 10, 1, today(), false).unwrap(), 10);
        assert_eq!(seed_database(&pool, 5, 2, today(), true).unwrap(), 5);
        assert_eq!(appgraph_db::queries::applications::count_applications(&pool).unwrap(), 5);
    }
}
