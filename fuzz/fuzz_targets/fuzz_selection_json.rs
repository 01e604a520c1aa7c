#![no_main]

use libfuzzer_sys::fuzz_target;
use omnirelease::domain::entities::ComponentSelection;

fuzz_target!(|data: &[u8]| {
    if let Ok(selection) = serde_json::from_slice::<ComponentSelection>(data) {
        let _ = selection.validate();
        let _ = selection.chunks(3);
        let _ = selection.omni_only();
        let _ = selection.metadata_only();
    }
});
