//! Property tests for fingerprints and the component index.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Map, Value};

use omnirelease::domain::entities::{ComponentBody, ComponentIndex, RecordOutcome};
use omnirelease::domain::value_objects::ComponentKind;

fn fields() -> impl Strategy<Value = Vec<(String, i64)>> {
    proptest::collection::btree_map("[A-Za-z_]{1,12}", any::<i64>(), 0..8)
        .prop_map(|map| map.into_iter().collect())
}

fn object(fields: &[(String, i64)]) -> Value {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.clone(), Value::from(*value));
    }
    Value::Object(map)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the fingerprint does not depend on the order keys were inserted in.
    #[test]
    fn property_fingerprint_ignores_key_order(fields in fields()) {
        let forward = object(&fields);
        let reversed: Vec<_> = fields.iter().rev().cloned().collect();
        let backward = object(&reversed);

        prop_assert_eq!(
            ComponentBody::new(forward).fingerprint(),
            ComponentBody::new(backward).fingerprint()
        );
    }

    /// PROPERTY: changing any field value changes the fingerprint.
    #[test]
    fn property_fingerprint_tracks_values(fields in fields(), bump in 1i64..1000) {
        prop_assume!(!fields.is_empty());
        let mut changed = fields.clone();
        changed[0].1 = changed[0].1.wrapping_add(bump);

        prop_assert_ne!(
            ComponentBody::new(object(&fields)).fingerprint(),
            ComponentBody::new(object(&changed)).fingerprint()
        );
    }

    /// PROPERTY: re-recording an unchanged body never moves `modified_at`.
    #[test]
    fn property_unchanged_record_keeps_modified_at(
        fields in fields(),
        later in 1i64..1_000_000,
    ) {
        let mut index = ComponentIndex::new();
        let body = ComponentBody::new(object(&fields));
        let (_, first) = index.record(ComponentKind::DataRaptor, "DRGetCase", body.clone(), t0());
        let before = first.clone();

        let (outcome, after) = index.record(
            ComponentKind::DataRaptor,
            "DRGetCase",
            body,
            t0() + Duration::seconds(later),
        );

        prop_assert_eq!(outcome, RecordOutcome::Unchanged);
        prop_assert_eq!(&before, after);
    }

    /// PROPERTY: a changed body advances `modified_at` and keeps `created_at`.
    #[test]
    fn property_changed_record_advances_modified_at(
        fields in fields(),
        later in 1i64..1_000_000,
    ) {
        let mut index = ComponentIndex::new();
        let (_, first) = index.record(
            ComponentKind::OmniScript,
            "Case_Create_English",
            ComponentBody::new(object(&fields)),
            t0(),
        );
        let created = first.created_at.clone();

        let mut changed = fields.clone();
        changed.push(("9changed".to_string(), 1));
        let now = t0() + Duration::seconds(later);
        let (outcome, record) = index.record(
            ComponentKind::OmniScript,
            "Case_Create_English",
            ComponentBody::new(object(&changed)),
            now,
        );

        prop_assert_eq!(outcome, RecordOutcome::Modified);
        prop_assert_eq!(&record.created_at, &created);
        prop_assert_eq!(record.modified_at.parse(), Some(now));
    }
}
