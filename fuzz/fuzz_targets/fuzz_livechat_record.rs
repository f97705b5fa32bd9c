#![no_main]

use chatreplay_core::{EventStore, OrderPolicy, RecordParser};
use chatreplay_livechat::LiveChatParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16 * 1024 {
        return;
    }

    // Single records never panic.
    for line in text.lines() {
        let _ = LiveChatParser.parse_record(line);
    }

    // Whole-log loads never fail outside Reject and always come out sorted.
    let (store, report) = EventStore::load(text, &LiveChatParser, OrderPolicy::Sort)
        .expect("sort policy never fails");
    assert_eq!(report.accepted, store.len());
    assert_eq!(report.accepted + report.dropped + report.blank_lines, report.total_lines);
    assert!(
        store
            .events()
            .windows(2)
            .all(|w| w[0].offset_ms <= w[1].offset_ms),
        "store not sorted"
    );
});
