//! Property tests for dependency extraction.

use proptest::prelude::*;
use serde_json::Value;

use omnirelease::domain::entities::{ComponentBody, ComponentSelection, MaterializedComponent};
use omnirelease::domain::services::DependencyResolver;
use omnirelease::domain::value_objects::ComponentKind;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[A-Za-z_{}\":]{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        let keys = prop_oneof![
            Just("propertySetConfig".to_string()),
            Just("PropertySetConfig".to_string()),
            Just("elements".to_string()),
            Just("bundle".to_string()),
            Just("dataSource".to_string()),
            Just("relationships".to_string()),
            "[A-Za-z_]{1,8}",
        ];
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::btree_map(keys, inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn kind() -> impl Strategy<Value = ComponentKind> {
    prop_oneof![
        Just(ComponentKind::OmniScript),
        Just(ComponentKind::IntegrationProcedure),
        Just(ComponentKind::DataRaptor),
        Just(ComponentKind::FlexCard),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: edge extraction never panics on arbitrary component documents.
    #[test]
    fn property_extraction_never_panics(kind in kind(), document in json_value(), step in json_value()) {
        let component = MaterializedComponent::new(
            kind,
            "Subject",
            ComponentBody::new(document).with_step("Step", step),
        );
        let _ = DependencyResolver::new().edges_of(&component);
    }

    /// PROPERTY: selecting every reported dependency leaves nothing missing.
    #[test]
    fn property_selecting_dependencies_clears_missing(kind in kind(), document in json_value()) {
        let component = MaterializedComponent::new(kind.clone(), "Subject", ComponentBody::new(document));
        let resolver = DependencyResolver::new();

        let mut selection = ComponentSelection::new().with(kind, "Subject");
        let first = resolver.resolve(&selection, [&component]);
        for missing in first.missing_components() {
            selection.insert(missing.kind, missing.name);
        }
        let second = resolver.resolve(&selection, [&component]);

        prop_assert!(!second.has_missing());
    }
}
