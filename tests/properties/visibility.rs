//! Property tests for the pending view.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

use omnirelease::domain::entities::{ComponentBody, ComponentIndex, ComponentSelection, ReleaseRecord};
use omnirelease::domain::services::compute_pending;
use omnirelease::domain::value_objects::{ComponentKind, ReleaseId};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// (name, minutes after t0 the component was last modified, part of the release)
fn components() -> impl Strategy<Value = Vec<(String, i64, bool)>> {
    proptest::collection::btree_map("[A-Za-z]{1,10}", (0i64..120, any::<bool>()), 0..12)
        .prop_map(|map| map.into_iter().map(|(n, (m, s))| (n, m, s)).collect())
}

fn fixture(components: &[(String, i64, bool)], released_at: i64) -> (ComponentIndex, ReleaseRecord) {
    let mut index = ComponentIndex::new();
    let mut selection = ComponentSelection::new();
    for (name, minutes, selected) in components {
        index.record(
            ComponentKind::IntegrationProcedure,
            name,
            ComponentBody::new(json!({"Name": name})),
            t0() + Duration::minutes(*minutes),
        );
        if *selected {
            selection.insert(ComponentKind::IntegrationProcedure, name.clone());
        }
    }
    let at = t0() + Duration::minutes(released_at);
    let release = ReleaseRecord {
        release_id: ReleaseId::from_time(at),
        release_name: None,
        deployed_at: at,
        deployed_by: "tester".to_string(),
        source_environment_alias: "dev".to_string(),
        target_branch: "main".to_string(),
        component_selection: selection,
        deployment_log: Vec::new(),
    };
    (index, release)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: computing the pending view twice gives the same answer.
    #[test]
    fn property_pending_is_deterministic(components in components(), released_at in 0i64..120) {
        let (index, release) = fixture(&components, released_at);
        prop_assert_eq!(
            compute_pending(&index, Some(&release)),
            compute_pending(&index, Some(&release))
        );
    }

    /// PROPERTY: a component is hidden exactly when it was released and not modified since.
    #[test]
    fn property_hidden_iff_released_and_unchanged(
        components in components(),
        released_at in 0i64..120,
    ) {
        let (index, release) = fixture(&components, released_at);
        let pending = compute_pending(&index, Some(&release));
        let visible: Vec<&str> = pending
            .get(&ComponentKind::IntegrationProcedure)
            .map(|items| items.iter().map(|p| p.record.name.as_str()).collect())
            .unwrap_or_default();

        for (name, minutes, selected) in &components {
            let hidden = *selected && *minutes <= released_at;
            prop_assert_eq!(
                visible.contains(&name.as_str()),
                !hidden,
                "component {} modified at +{}m, released at +{}m, selected {}",
                name, minutes, released_at, selected
            );
        }
    }

    /// PROPERTY: without a release every tracked component is pending.
    #[test]
    fn property_everything_pending_without_release(components in components()) {
        let (index, _) = fixture(&components, 0);
        let pending = compute_pending(&index, None);
        let count: usize = pending.values().map(Vec::len).sum();
        prop_assert_eq!(count, components.len());
    }
}
