#![no_main]

use libfuzzer_sys::fuzz_target;
use omnirelease::domain::entities::{ComponentBody, MaterializedComponent};
use omnirelease::domain::services::DependencyResolver;
use omnirelease::domain::value_objects::ComponentKind;

fuzz_target!(|data: &[u8]| {
    let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let resolver = DependencyResolver::new();
    for kind in ComponentKind::OMNI {
        let component =
            MaterializedComponent::new(kind, "Fuzzed", ComponentBody::new(document.clone()));
        let _ = resolver.edges_of(&component);
    }
});
