//! Dependency Resolver Domain Service
//!
//! Extracts dependency edges from materialized component bodies and reports
//! the referenced components a selection leaves out. Extraction is pure: it
//! only looks at bodies that were already exported or stored.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde_json::Value;

use crate::domain::entities::{
    ComponentRef, ComponentSelection, DependencyEdge, DependencyReport, MaterializedComponent,
};
use crate::domain::value_objects::ComponentKind;

/// One way a component body can declare a reference to another component
pub trait EdgeRule: Send + Sync {
    /// Rule name, for diagnostics
    fn name(&self) -> &'static str;

    fn applies_to(&self, kind: &ComponentKind) -> bool;

    /// Push every referenced component onto `out`
    fn extract(&self, component: &MaterializedComponent, out: &mut Vec<ComponentRef>);
}

/// Generic `relationships: [{type, name}]` list on the document
pub struct RelationshipListRule;

impl EdgeRule for RelationshipListRule {
    fn name(&self) -> &'static str {
        "relationships"
    }

    fn applies_to(&self, _kind: &ComponentKind) -> bool {
        true
    }

    fn extract(&self, component: &MaterializedComponent, out: &mut Vec<ComponentRef>) {
        let Some(list) = component
            .body
            .document
            .get("relationships")
            .and_then(Value::as_array)
        else {
            return;
        };
        for item in list {
            let kind = item.get("type").and_then(non_empty_str);
            let name = item.get("name").and_then(non_empty_str);
            if let (Some(kind), Some(name)) = (kind, name) {
                out.push(ComponentRef::new(ComponentKind::parse_lenient(kind), name));
            }
        }
    }
}

/// FlexCard data source and child cards inside the card definition
pub struct FlexCardDataSourceRule;

impl EdgeRule for FlexCardDataSourceRule {
    fn name(&self) -> &'static str {
        "flexcard-datasource"
    }

    fn applies_to(&self, kind: &ComponentKind) -> bool {
        *kind == ComponentKind::FlexCard
    }

    fn extract(&self, component: &MaterializedComponent, out: &mut Vec<ComponentRef>) {
        let Some(definition) = card_definition(&component.body.document) else {
            return;
        };

        if let Some(source) = definition.get("dataSource") {
            let is_procedure = source
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t == "IntegrationProcedures");
            if is_procedure {
                if let Some(method) = source
                    .get("value")
                    .and_then(|v| v.get("ipMethod"))
                    .and_then(non_empty_str)
                {
                    out.push(ComponentRef::new(ComponentKind::IntegrationProcedure, method));
                }
            }
        }

        let states = definition.get("states").and_then(Value::as_array);
        for state in states.into_iter().flatten() {
            let children = state.get("childCards").and_then(Value::as_array);
            for child in children.into_iter().flatten().filter_map(non_empty_str) {
                out.push(ComponentRef::new(ComponentKind::FlexCard, child));
            }
        }
    }
}

/// Step configuration of integration procedures and omniscripts
pub struct ProcedureStepRule;

impl EdgeRule for ProcedureStepRule {
    fn name(&self) -> &'static str {
        "procedure-steps"
    }

    fn applies_to(&self, kind: &ComponentKind) -> bool {
        matches!(
            kind,
            ComponentKind::IntegrationProcedure | ComponentKind::OmniScript
        )
    }

    fn extract(&self, component: &MaterializedComponent, out: &mut Vec<ComponentRef>) {
        let document = &component.body.document;
        let inline = element_arrays(document).flat_map(|items| items.iter());
        for step in component.body.steps.values().chain(inline) {
            let Some(config) = step_config(step) else {
                continue;
            };
            if let Some(bundle) = config.get("bundle").and_then(non_empty_str) {
                out.push(ComponentRef::new(ComponentKind::DataRaptor, bundle));
            }
            if let Some(key) = config.get("integrationProcedureKey").and_then(non_empty_str) {
                out.push(ComponentRef::new(ComponentKind::IntegrationProcedure, key));
            }
            if let Some(class) = config.get("remoteClass").and_then(non_empty_str) {
                out.push(ComponentRef::new(ComponentKind::metadata("ApexClass"), class));
            }
        }
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Vlocity stores some nested configuration as JSON-encoded strings
fn decoded(value: &Value) -> Cow<'_, Value> {
    if let Value::String(text) = value {
        if let Ok(parsed @ (Value::Object(_) | Value::Array(_))) =
            serde_json::from_str::<Value>(text)
        {
            return Cow::Owned(parsed);
        }
    }
    Cow::Borrowed(value)
}

/// First field whose key matches, looked up on an object
fn field_matching<'a>(value: &'a Value, matches: impl Fn(&str) -> bool) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(key, _)| matches(key))
        .map(|(_, v)| v)
}

fn card_definition(document: &Value) -> Option<Cow<'_, Value>> {
    let raw = document.get("PropertySetConfig").or_else(|| {
        field_matching(document, |key| {
            key == "Definition" || key.ends_with("__Definition__c")
        })
    })?;
    Some(decoded(raw))
}

fn element_arrays(document: &Value) -> impl Iterator<Item = &Vec<Value>> {
    document
        .as_object()
        .into_iter()
        .flat_map(|map| map.iter())
        .filter(|(key, _)| key.as_str() == "elements" || key.ends_with("__Element__c"))
        .filter_map(|(_, v)| v.as_array())
}

fn step_config(step: &Value) -> Option<Cow<'_, Value>> {
    let raw = step
        .get("propertySetConfig")
        .or_else(|| step.get("PropertySetConfig"))
        .or_else(|| field_matching(step, |key| key.ends_with("__PropertySet__c")))?;
    Some(decoded(raw))
}

/// Dependency resolver with a fixed rule set
pub struct DependencyResolver {
    rules: Vec<Box<dyn EdgeRule>>,
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyResolver {
    /// Resolver with the built-in rules
    pub fn new() -> Self {
        Self::with_rules(vec![
            Box::new(RelationshipListRule),
            Box::new(FlexCardDataSourceRule),
            Box::new(ProcedureStepRule),
        ])
    }

    pub fn with_rules(rules: Vec<Box<dyn EdgeRule>>) -> Self {
        Self { rules }
    }

    /// Deduplicated outgoing edges of one component, without self references
    pub fn edges_of(&self, component: &MaterializedComponent) -> BTreeSet<DependencyEdge> {
        let mut targets = Vec::new();
        for rule in self.rules.iter().filter(|r| r.applies_to(component.kind())) {
            rule.extract(component, &mut targets);
        }
        targets
            .into_iter()
            .filter(|target| *target != component.reference)
            .map(|target| DependencyEdge::new(component.reference.clone(), target))
            .collect()
    }

    /// Build the report for `selection` from its materialized components
    pub fn resolve<'a>(
        &self,
        selection: &ComponentSelection,
        components: impl IntoIterator<Item = &'a MaterializedComponent>,
    ) -> DependencyReport {
        let mut report = DependencyReport::default();
        for component in components {
            for edge in self.edges_of(component) {
                let selected = selection.contains(&edge.target.kind, &edge.target.name);
                report.add_edge(&edge, selected);
            }
        }
        report
    }
}
