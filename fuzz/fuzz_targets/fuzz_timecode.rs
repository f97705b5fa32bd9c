#![no_main]

use chatreplay_core::{format_time, parse_time};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 256 {
        return;
    }

    // parse_time must never panic.
    if let Ok(ms) = parse_time(text) {
        // Accepted input is whole seconds and formats back to an accepted value.
        assert_eq!(ms % 1_000, 0, "parsed timecode has sub-second part");
        assert_eq!(parse_time(&format_time(ms)), Ok(ms));
    }
});
