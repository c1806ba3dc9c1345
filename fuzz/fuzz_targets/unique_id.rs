#![no_main]

use libfuzzer_sys::fuzz_target;
use vintage_core::UniqueId;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything that parses must render to a form that parses back to the same id
        if let Ok(id) = UniqueId::parse(s) {
            let rendered = id.to_string();
            assert_eq!(UniqueId::parse(&rendered).ok(), Some(id));
        }
    }
});
