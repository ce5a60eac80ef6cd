//! Row planning: which nodes and edges one application produces.
//!
//! Planning is pure. The loader executes the steps in order against a
//! [`GraphTarget`](crate::GraphTarget).

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use appgraph_core::Application;

use crate::model::{NodeKey, NodeLabel, NodeRef, Properties, PropertyValue, RelType};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One write against the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Node(NodeRef, Properties),
    Edge(NodeRef, RelType, NodeRef),
}

/// The ordered writes for one application.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlan {
    pub application: NodeRef,
    pub steps: Vec<Step>,
}

impl RowPlan {
    pub fn node_count(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, Step::Node(..))).count()
    }

    pub fn edge_count(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, Step::Edge(..))).count()
    }
}

/// Application name to node. Dependency and integration tokens found here
/// point at the named application instead of an `ExternalApp`.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    by_name: HashMap<String, NodeRef>,
}

impl NameIndex {
    /// Index the given applications. On duplicate names the first row with
    /// an `app_id` wins, else the first row.
    pub fn build<'a>(apps: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut by_name = HashMap::new();
        for app in apps {
            let node = NodeRef::application(&app.key());
            match by_name.entry(app.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(mut slot) => {
                    if app.app_id.is_some() && matches!(slot.get().key, NodeKey::Name(_)) {
                        slot.insert(node);
                    }
                }
            }
        }
        Self { by_name }
    }

    /// The node an application's own row writes to. A row without an
    /// `app_id` folds into the indexed application of the same name.
    pub fn application_for(&self, app: &Application) -> NodeRef {
        match (app.app_id, self.resolve(&app.name)) {
            (None, Some(indexed)) => indexed.clone(),
            _ => NodeRef::application(&app.key()),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&NodeRef> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Scalar attributes stored on the Application node. The dependency and
/// integration lists are edges, never attributes. `app_id` is the merge key,
/// never an attribute.
pub fn application_properties(app: &Application) -> Properties {
    let date = |d: Option<chrono::NaiveDate>| PropertyValue::from(d.map(|d| d.to_string()));
    let timestamp = |t: Option<chrono::NaiveDateTime>| {
        PropertyValue::from(t.map(|t| t.format(DATETIME_FORMAT).to_string()))
    };

    vec![
        ("name", app.name.as_str().into()),
        ("description", app.description.clone().into()),
        ("version", app.version.clone().into()),
        ("category", app.category.clone().into()),
        ("subcategory", app.subcategory.clone().into()),
        ("vendor_name", app.vendor_name.clone().into()),
        ("department", app.department.clone().into()),
        ("app_owner", app.app_owner.clone().into()),
        ("technical_lead", app.technical_lead.clone().into()),
        ("business_owner", app.business_owner.clone().into()),
        ("annual_cost", app.annual_cost.into()),
        ("license_type", app.license_type.clone().into()),
        ("cost_center", app.cost_center.clone().into()),
        ("in_use", app.in_use.into()),
        ("user_count", app.user_count.into()),
        ("deployment_type", app.deployment_type.clone().into()),
        ("environment", app.environment.clone().into()),
        ("platform", app.platform.clone().into()),
        ("programming_language", app.programming_language.clone().into()),
        ("database_type", app.database_type.clone().into()),
        ("compliance_requirements", app.compliance_requirements.clone().into()),
        ("security_classification", app.security_classification.clone().into()),
        ("data_sensitivity", app.data_sensitivity.clone().into()),
        ("installation_date", date(app.installation_date)),
        ("last_updated", date(app.last_updated)),
        ("end_of_life_date", date(app.end_of_life_date)),
        ("renewal_date", date(app.renewal_date)),
        ("uptime_sla", app.uptime_sla.into()),
        ("criticality", app.criticality.clone().into()),
        ("tags", app.tags.clone().into()),
        ("notes", app.notes.clone().into()),
        ("created_at", timestamp(app.created_at)),
        ("updated_at", timestamp(app.updated_at)),
    ]
}

/// Plan every write for one application.
pub fn plan_row(app: &Application, index: &NameIndex) -> RowPlan {
    let application = index.application_for(app);
    let mut steps = vec![Step::Node(application.clone(), application_properties(app))];

    let mut link = |target: NodeRef, properties: Properties, rel: RelType| {
        steps.push(Step::Node(target.clone(), properties));
        steps.push(Step::Edge(application.clone(), rel, target));
    };

    if let Some(vendor) = &app.vendor_name {
        let mut props: Properties = Vec::new();
        if let Some(email) = &app.vendor_contact_email {
            props.push(("contact_email", email.as_str().into()));
        }
        link(NodeRef::named(NodeLabel::Vendor, vendor), props, RelType::SUPPLIED_BY);
    }

    if let Some(department) = &app.department {
        link(NodeRef::named(NodeLabel::Department, department), Vec::new(), RelType::OWNED_BY);
    }

    let category = app.category.as_ref().map(|c| NodeRef::named(NodeLabel::Category, c));
    if let Some(category) = &category {
        link(category.clone(), vec![("type", "main".into())], RelType::BELONGS_TO);
    }

    if let Some(subcategory) = &app.subcategory {
        let subcategory = NodeRef::named(NodeLabel::Subcategory, subcategory);
        link(subcategory.clone(), Vec::new(), RelType::BELONGS_TO);
        if let Some(category) = &category {
            steps.push(Step::Edge(subcategory, RelType::BELONGS_TO, category.clone()));
        }
    }

    let roles = [
        (&app.app_owner, RelType::HAS_OWNER),
        (&app.technical_lead, RelType::HAS_TECHNICAL_LEAD),
        (&app.business_owner, RelType::HAS_BUSINESS_OWNER),
    ];
    for (person, rel) in roles {
        if let Some(person) = person {
            steps.push(Step::Node(NodeRef::named(NodeLabel::Person, person), Vec::new()));
            steps.push(Step::Edge(application.clone(), rel, NodeRef::named(NodeLabel::Person, person)));
        }
    }

    let lists = [
        (&app.depends_on, RelType::DEPENDS_ON),
        (&app.integrates_with, RelType::INTEGRATES_WITH),
    ];
    for (tokens, rel) in lists {
        for token in tokens {
            let (target, properties) = match index.resolve(token) {
                // Resolved applications get their full attributes from their own row.
                Some(app_ref) => (app_ref.clone(), vec![("name", token.as_str().into())]),
                None => (NodeRef::named(NodeLabel::ExternalApp, token), Vec::new()),
            };
            steps.push(Step::Node(target.clone(), properties));
            steps.push(Step::Edge(application.clone(), rel, target));
        }
    }

    RowPlan { application, steps }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: i64, name: &str) -> Application {
        let mut app = Application::named(name);
        app.app_id = Some(id);
        app
    }

    fn edges(plan: &RowPlan) -> Vec<(RelType, NodeRef)> {
        plan.steps
            .iter()
            .filter_map(|s| match s {
                Step::Edge(from, rel, to) if *from == plan.application => Some((*rel, to.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bare_application_plans_one_node() {
        let plan = plan_row(&app(1, "Solo"), &NameIndex::default());
        assert_eq!(plan.node_count(), 1);
        assert_eq!(plan.edge_count(), 0);
        assert_eq!(plan.application.key, NodeKey::AppId(1));
    }

    #[test]
    fn test_application_without_id_keyed_by_name() {
        let plan = plan_row(&Application::named("NoId"), &NameIndex::default());
        assert_eq!(plan.application, NodeRef::named(NodeLabel::Application, "NoId"));
    }

    #[test]
    fn test_list_fields_are_not_attributes() {
        let mut a = app(1, "A");
        a.depends_on = vec!["B".into()];
        a.integrates_with = vec!["C".into()];
        a.tags = vec!["t".into()];

        let props = application_properties(&a);
        let names: Vec<_> = props.iter().map(|(n, _)| *n).collect();
        assert!(!names.iter().any(|n| n.contains("depends") || n.contains("integrates")));
        assert!(props.contains(&("tags", PropertyValue::List(vec!["t".into()]))));
    }

    #[test]
    fn test_categorical_fields_produce_fixed_edges() {
        let mut a = app(1, "A");
        a.vendor_name = Some("Acme".into());
        a.department = Some("IT".into());
        a.category = Some("Finance".into());
        a.subcategory = Some("Accounting".into());
        a.app_owner = Some("Ana".into());
        a.technical_lead = Some("Bo".into());
        a.business_owner = Some("Ana".into());

        let plan = plan_row(&a, &NameIndex::default());
        let edges = edges(&plan);

        assert!(edges.contains(&(RelType::SUPPLIED_BY, NodeRef::named(NodeLabel::Vendor, "Acme"))));
        assert!(edges.contains(&(RelType::OWNED_BY, NodeRef::named(NodeLabel::Department, "IT"))));
        assert!(edges.contains(&(RelType::BELONGS_TO, NodeRef::named(NodeLabel::Category, "Finance"))));
        assert!(edges.contains(&(RelType::BELONGS_TO, NodeRef::named(NodeLabel::Subcategory, "Accounting"))));
        assert!(edges.contains(&(RelType::HAS_OWNER, NodeRef::named(NodeLabel::Person, "Ana"))));
        assert!(edges.contains(&(RelType::HAS_BUSINESS_OWNER, NodeRef::named(NodeLabel::Person, "Ana"))));
        assert!(plan.steps.contains(&Step::Edge(
            NodeRef::named(NodeLabel::Subcategory, "Accounting"),
            RelType::BELONGS_TO,
            NodeRef::named(NodeLabel::Category, "Finance"),
        )));
    }

    #[test]
    fn test_subcategory_without_category_has_no_parent_edge() {
        let mut a = app(1, "A");
        a.subcategory = Some("Accounting".into());
        let plan = plan_row(&a, &NameIndex::default());
        assert_eq!(plan.edge_count(), 1);
    }

    #[test]
    fn test_tokens_resolve_against_index() {
        let b = app(2, "B");
        let index = NameIndex::build([&b]);

        let mut a = app(1, "A");
        a.depends_on = vec!["B".into(), "Slack".into()];
        let plan = plan_row(&a, &index);
        let edges = edges(&plan);

        assert_eq!(
            edges,
            vec![
                (RelType::DEPENDS_ON, NodeRef::new(NodeLabel::Application, NodeKey::AppId(2))),
                (RelType::DEPENDS_ON, NodeRef::named(NodeLabel::ExternalApp, "Slack")),
            ]
        );
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let first = app(1, "Dup");
        let second = app(2, "Dup");
        let index = NameIndex::build([&first, &second]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve("Dup").map(|n| &n.key), Some(&NodeKey::AppId(1)));
    }

    #[test]
    fn test_row_without_id_folds_into_named_application() {
        let with_id = app(5, "X");
        let without_id = Application::named("X");
        let index = NameIndex::build([&without_id, &with_id]);

        let plan = plan_row(&without_id, &index);
        assert_eq!(plan.application.key, NodeKey::AppId(5));
        assert!(!application_properties(&without_id).iter().any(|(n, _)| *n == "app_id"));
    }

    #[test]
    fn test_vendor_email_only_when_present() {
        let mut a = app(1, "A");
        a.vendor_name = Some("Acme".into());
        let plan = plan_row(&a, &NameIndex::default());
        let vendor = NodeRef::named(NodeLabel::Vendor, "Acme");
        assert!(plan.steps.contains(&Step::Node(vendor, Vec::new())));
    }
}
