#![no_main]

use libfuzzer_sys::fuzz_target;
use omnirelease::domain::value_objects::ReleaseId;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(id) = raw.parse::<ReleaseId>() {
            assert_eq!(id.as_str().parse::<ReleaseId>().ok(), Some(id));
        }
    }
});
