#![forbid(unsafe_code)]

//! Property-based invariant tests for the replay session.
//!
//! ## Invariants
//!
//! 1. Monotonic reveal: revealed events are exactly `events[..cursor]`, in
//!    order, with no repeats or gaps, for any tick trajectory.
//! 2. No early reveal: every revealed offset is <= elapsed at reveal time.
//! 3. Pause/resume preserves cursor and elapsed.
//! 4. Seek lands on the lower bound for the target.
//! 5. Progress fraction is within [0, 1] for every elapsed value.
//! 6. Rejected seeks never mutate state.

use chatreplay_core::{
    ChatEvent, EventStore, ManualClock, PlaybackState, Progress, RecordingRenderer, RenderCall,
    ReplaySession,
};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_offsets(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..60_000, 0..max_len).prop_map(|mut v| {
        v.sort_unstable();
        v
    })
}

fn arb_ticks(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    // Mostly small steps with the occasional multi-second stall.
    prop::collection::vec(
        prop_oneof![8 => 0u64..150, 2 => 1_000u64..20_000],
        1..max_len,
    )
}

#[derive(Debug, Clone)]
enum Op {
    Advance(u64),
    Pump,
    Play,
    Pause,
    Toggle,
    Restart,
    Seek(u64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..3_000).prop_map(Op::Advance),
        6 => Just(Op::Pump),
        2 => Just(Op::Play),
        1 => Just(Op::Pause),
        1 => Just(Op::Toggle),
        1 => Just(Op::Restart),
        2 => (0u64..70_000).prop_map(Op::Seek),
    ]
}

fn build(offsets: &[u64]) -> (ReplaySession<ManualClock, RecordingRenderer>, ManualClock) {
    let store = EventStore::from_events(
        offsets
            .iter()
            .enumerate()
            .map(|(i, &o)| ChatEvent::new(o, format!("u{i}"), format!("m{i}"), ""))
            .collect(),
    );
    let clock = ManualClock::new();
    let session = ReplaySession::new(store, clock.clone(), RecordingRenderer::new());
    (session, clock)
}

fn reference_lower_bound(offsets: &[u64], target: u64) -> usize {
    let idx = offsets
        .iter()
        .position(|&o| o >= target)
        .unwrap_or(offsets.len());
    idx.min(offsets.len().saturating_sub(1))
}

// ── 1 & 2. Monotonic reveal, no early reveal ─────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn reveal_is_exact_prefix_in_order(offsets in arb_offsets(60), ticks in arb_ticks(80)) {
        let (mut session, clock) = build(&offsets);
        session.play();
        session.pump();

        for step in ticks {
            clock.advance_ms(step);
            session.pump();

            let elapsed = session.elapsed_ms();
            let cursor = session.cursor();
            let visible = session.renderer().visible();
            prop_assert_eq!(visible.len(), cursor);
            prop_assert_eq!(visible, &session.store().events()[..cursor]);
            prop_assert!(visible.iter().all(|e| e.offset_ms <= elapsed));
        }
    }

    #[test]
    fn reveal_pass_catches_up_completely(offsets in arb_offsets(60), jump in 0u64..120_000) {
        let (mut session, clock) = build(&offsets);
        session.play();
        clock.advance_ms(jump);
        session.reveal_pass();
        let due = offsets.iter().filter(|&&o| o <= jump).count();
        prop_assert_eq!(session.cursor(), due);
    }
}

// ── 3. Pause/resume preserves position ───────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn pause_resume_is_lossless(
        offsets in arb_offsets(40),
        before in 0u64..30_000,
        paused_for in 0u64..1_000_000,
    ) {
        let (mut session, clock) = build(&offsets);
        session.play();
        clock.advance_ms(before);
        session.pump();
        session.pause();

        let cursor = session.cursor();
        let elapsed = session.elapsed_ms();
        prop_assert_eq!(elapsed, before);

        clock.advance_ms(paused_for);
        prop_assert_eq!(session.pump().revealed, 0);
        session.play();
        prop_assert_eq!(session.cursor(), cursor);
        prop_assert_eq!(session.elapsed_ms(), elapsed);
    }
}

// ── 4. Seek lands on the lower bound ─────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn seek_cursor_is_lower_bound(offsets in arb_offsets(60), raw_target in 0u64..60_000) {
        let (mut session, _clock) = build(&offsets);
        let max = session.store().max_offset_ms();
        let target = raw_target.min(max);
        session.seek(target).unwrap();
        prop_assert_eq!(session.cursor(), reference_lower_bound(&offsets, target));
        prop_assert_eq!(session.state(), PlaybackState::Playing);

        session.pump();
        let visible = session.renderer().visible();
        prop_assert!(visible.iter().all(|e| e.offset_ms == target));
    }
}

// ── 5. Progress bounds ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn progress_fraction_is_bounded(elapsed in any::<u64>(), total in any::<u64>()) {
        let p = Progress::new(elapsed, total);
        prop_assert!((0.0..=1.0).contains(&p.fraction));
        if total == 0 {
            prop_assert_eq!(p.fraction, 0.0);
        }
    }
}

// ── 6. Arbitrary operation sequences ─────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn arbitrary_ops_preserve_invariants(
        offsets in arb_offsets(30),
        ops in prop::collection::vec(arb_op(), 1..60),
    ) {
        let (mut session, clock) = build(&offsets);
        let max = session.store().max_offset_ms();

        for op in ops {
            match op {
                Op::Advance(ms) => clock.advance_ms(ms),
                Op::Pump => { session.pump(); }
                Op::Play => session.play(),
                Op::Pause => session.pause(),
                Op::Toggle => session.toggle(),
                Op::Restart => {
                    session.restart();
                    prop_assert_eq!(session.elapsed_ms(), 0);
                    prop_assert_eq!(session.cursor(), 0);
                    prop_assert_eq!(session.state(), PlaybackState::Stopped);
                }
                Op::Seek(target) => {
                    let before = session.status();
                    let calls = session.renderer().calls().len();
                    let result = session.seek(target);
                    if target > max {
                        prop_assert!(result.is_err());
                        prop_assert_eq!(session.status(), before);
                        prop_assert_eq!(session.renderer().calls().len(), calls + 1);
                        prop_assert!(matches!(
                            session.renderer().calls().last(),
                            Some(RenderCall::ValidationError(_))
                        ));
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
            }

            let cursor = session.cursor();
            prop_assert!(cursor <= session.store().len());
            let (reveal_active, progress_active) = session.timers_active();
            prop_assert_eq!(reveal_active, session.is_playing());
            prop_assert_eq!(progress_active, session.is_playing());

            // Since the last clear, reveals form a contiguous, increasing run
            // that ends right before the cursor.
            let visible = session.renderer().visible();
            let start = cursor - visible.len();
            prop_assert_eq!(visible, &session.store().events()[start..cursor]);
        }
    }
}
