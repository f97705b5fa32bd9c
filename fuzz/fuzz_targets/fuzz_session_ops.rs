#![no_main]

use arbitrary::Arbitrary;
use chatreplay_core::{
    ChatEvent, EventStore, ManualClock, PlaybackState, RecordingRenderer, ReplaySession,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Advance(u16),
    Pump,
    Play,
    Pause,
    Toggle,
    Restart,
    Seek(u32),
    SeekText(String),
    Speed(f64),
}

#[derive(Debug, Arbitrary)]
struct Input {
    offsets: Vec<u32>,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    if input.offsets.len() > 256 || input.ops.len() > 512 {
        return;
    }

    let events = input
        .offsets
        .iter()
        .enumerate()
        .map(|(i, &o)| ChatEvent::new(u64::from(o), format!("u{i}"), "m", ""))
        .collect();
    let store = EventStore::from_events(events);
    let clock = ManualClock::new();
    let mut session = ReplaySession::new(store, clock.clone(), RecordingRenderer::new());

    for op in input.ops {
        match op {
            Op::Advance(ms) => clock.advance_ms(u64::from(ms)),
            Op::Pump => {
                session.pump();
            }
            Op::Play => session.play(),
            Op::Pause => session.pause(),
            Op::Toggle => session.toggle(),
            Op::Restart => session.restart(),
            Op::Seek(target) => {
                let _ = session.seek(u64::from(target));
            }
            Op::SeekText(text) => {
                let _ = session.seek_to_str(&text);
            }
            Op::Speed(speed) => {
                session.set_speed(speed);
            }
        }

        let cursor = session.cursor();
        assert!(cursor <= session.store().len(), "cursor past end");
        let (reveal, progress) = session.timers_active();
        assert_eq!(reveal, session.state() == PlaybackState::Playing);
        assert_eq!(progress, reveal);
        let speed = session.speed();
        assert!(speed.is_finite() && speed > 0.0, "speed escaped its range");

        let visible = session.renderer().visible();
        assert!(visible.len() <= cursor, "more visible than revealed");
        assert_eq!(visible, &session.store().events()[cursor - visible.len()..cursor]);
    }
});
