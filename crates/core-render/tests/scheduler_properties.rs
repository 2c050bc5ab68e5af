//! Property-based tests for trailing-edge debounce semantics.

use core_render::Debouncer;
use proptest::prelude::*;
use std::time::{Duration, Instant};

proptest! {
    // A burst whose gaps are all shorter than the window fires exactly once,
    // one window after the last event, carrying the last payload.
    #[test]
    fn burst_coalesces_to_last_event(
        window in 50u64..1000,
        gaps in proptest::collection::vec(0u64..50, 1..20),
    ) {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(window));
        let mut at = 0u64;
        let mut fired = Vec::new();
        for (i, gap) in gaps.iter().enumerate() {
            at += (*gap).min(window - 1);
            let now = t0 + Duration::from_millis(at);
            if let Some(p) = d.poll(now) { fired.push(p); }
            d.submit(i, now);
        }
        prop_assert!(fired.is_empty());
        let due = t0 + Duration::from_millis(at + window);
        prop_assert_eq!(d.deadline(), Some(due));
        prop_assert_eq!(d.poll(due - Duration::from_millis(1)), None);
        prop_assert_eq!(d.poll(due), Some(gaps.len() - 1));
        prop_assert_eq!(d.metrics().snapshot().fired, 1);
    }

    // Events separated by at least the window each fire on their own.
    #[test]
    fn quiet_gaps_fire_each_event(window in 10u64..500, count in 1usize..10) {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(window));
        let mut fired = 0;
        for i in 0..count {
            let now = t0 + Duration::from_millis(i as u64 * window);
            if d.poll(now).is_some() { fired += 1; }
            d.submit(i, now);
        }
        if d.poll(t0 + Duration::from_millis(count as u64 * window)).is_some() { fired += 1; }
        prop_assert_eq!(fired, count);
    }
}

#[test]
fn playground_timeline() {
    let t0 = Instant::now();
    let mut d = Debouncer::from_millis(500);
    let mut fires = Vec::new();
    for (at, text) in [(0u64, "s"), (100, "so"), (150, "som"), (480, "somm")] {
        let now = t0 + Duration::from_millis(at);
        fires.extend(d.poll(now).map(|p| (at, p)));
        d.submit(text, now);
    }
    for at in (500..=1500).step_by(10) {
        fires.extend(d.poll(t0 + Duration::from_millis(at)).map(|p| (at, p)));
    }
    assert_eq!(fires, vec![(980, "somm")]);
}
