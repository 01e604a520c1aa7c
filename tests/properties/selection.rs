//! Property tests for component selections.

use std::collections::BTreeSet;

use proptest::prelude::*;

use omnirelease::domain::entities::ComponentSelection;
use omnirelease::domain::value_objects::ComponentKind;

fn kind() -> impl Strategy<Value = ComponentKind> {
    prop_oneof![
        Just(ComponentKind::OmniScript),
        Just(ComponentKind::IntegrationProcedure),
        Just(ComponentKind::DataRaptor),
        Just(ComponentKind::FlexCard),
        "[A-Z][a-z]{2,10}".prop_map(ComponentKind::metadata),
    ]
}

fn selection() -> impl Strategy<Value = ComponentSelection> {
    proptest::collection::vec((kind(), "[A-Za-z0-9_]{1,12}"), 0..16).prop_map(|pairs| {
        let mut selection = ComponentSelection::new();
        for (kind, name) in pairs {
            selection.insert(kind, name);
        }
        selection
    })
}

fn as_set(selection: &ComponentSelection) -> BTreeSet<(String, String)> {
    selection
        .components()
        .map(|c| (c.kind.to_string(), c.name))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: merging is a per-kind set union and reports the new entries.
    #[test]
    fn property_merge_is_union(a in selection(), b in selection()) {
        let expected: BTreeSet<_> = as_set(&a).union(&as_set(&b)).cloned().collect();
        let new_in_b = as_set(&b).difference(&as_set(&a)).count();

        let mut merged = a.clone();
        let added = merged.merge(&b);

        prop_assert_eq!(as_set(&merged), expected);
        prop_assert_eq!(added, new_in_b);
    }

    /// PROPERTY: merging a selection into itself adds nothing.
    #[test]
    fn property_merge_is_idempotent(a in selection()) {
        let mut merged = a.clone();
        prop_assert_eq!(merged.merge(&a), 0);
        prop_assert_eq!(merged, a);
    }

    /// PROPERTY: chunks partition the selection without exceeding the batch size.
    #[test]
    fn property_chunks_partition(a in selection(), size in 1usize..8) {
        let chunks = a.chunks(size);
        let mut rejoined = ComponentSelection::new();
        let mut total = 0;
        for chunk in &chunks {
            prop_assert!(chunk.len() <= size);
            prop_assert!(!chunk.is_empty());
            total += chunk.len();
            rejoined.merge(chunk);
        }
        prop_assert_eq!(total, a.len());
        prop_assert_eq!(as_set(&rejoined), as_set(&a));
    }

    /// PROPERTY: the OmniStudio and metadata halves split the selection exactly.
    #[test]
    fn property_omni_and_metadata_split(a in selection()) {
        let mut rejoined = a.omni_only();
        let added = rejoined.merge(&a.metadata_only());
        prop_assert_eq!(added, a.metadata_only().len());
        prop_assert_eq!(as_set(&rejoined), as_set(&a));
    }
}
