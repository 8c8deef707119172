#![forbid(unsafe_code)]

//! Property-based invariant tests for the notification queue.
//!
//! Random enqueue schedules and host timings are replayed through a
//! [`QueueSimulator`]; the resulting timeline must satisfy:
//!
//! ## Invariants
//!
//! 1. FIFO: items mount in enqueue order.
//! 2. Exclusion: no item mounts before the previous one is detached.
//! 3. Minimum hold: hide is never earlier than mount + toast_duration.
//! 4. Minimum gap: mount is never earlier than previous detach + queue_delay.
//! 5. Completion: with a live exit signal every item is eventually shown.
//! 6. Stats agree with the timeline.

use std::time::Duration;

use proptest::prelude::*;
use toastline::{Category, ItemId, QueueConfig, QueueSimulator, RecordedOp, SurfaceOp};

// ── Strategies ────────────────────────────────────────────────────────────

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

/// Gaps (ms) between successive enqueues, with a category each.
fn arb_schedule() -> impl Strategy<Value = Vec<(u64, Category)>> {
    prop::collection::vec((0u64..600, arb_category()), 1..12)
}

fn arb_config() -> impl Strategy<Value = QueueConfig> {
    (1u64..500, 0u64..200, prop::option::of(0u64..400)).prop_map(|(hold, gap, settle)| {
        QueueConfig::new()
            .toast_duration(Duration::from_millis(hold))
            .queue_delay(Duration::from_millis(gap))
            .settle_timeout(settle.map(Duration::from_millis))
    })
}

fn arb_host() -> impl Strategy<Value = (u64, u64, bool)> {
    (0u64..700, 0u64..700, any::<bool>())
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn run(
    config: QueueConfig,
    (frame, exit, exit_signal): (u64, u64, bool),
    schedule: &[(u64, Category)],
) -> (QueueSimulator, Vec<ItemId>) {
    let mut sim = QueueSimulator::new(config)
        .frame_interval(Duration::from_millis(frame))
        .exit_transition(Duration::from_millis(exit))
        .exit_signal(exit_signal);
    let mut ids = Vec::new();
    for (gap, category) in schedule {
        sim.advance_to(sim.now() + Duration::from_millis(*gap));
        ids.push(sim.enqueue(format!("item {}", ids.len()), *category));
    }
    sim.run_until_idle(Duration::from_secs(3_600));
    (sim, ids)
}

fn mounts(timeline: &[RecordedOp]) -> Vec<(ItemId, Duration)> {
    timeline
        .iter()
        .filter_map(|r| match r.op {
            SurfaceOp::Mount { id, .. } => Some((id, r.at)),
            _ => None,
        })
        .collect()
}

fn find(timeline: &[RecordedOp], id: ItemId, name: &str) -> Option<Duration> {
    timeline
        .iter()
        .find(|r| r.op.id() == id && r.op.name() == name)
        .map(|r| r.at)
}

// ── 1-2. Ordering and exclusion ───────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn mounts_follow_enqueue_order(
        config in arb_config(),
        host in arb_host(),
        schedule in arb_schedule(),
    ) {
        let (sim, ids) = run(config, host, &schedule);
        let mounted: Vec<ItemId> = mounts(sim.timeline()).into_iter().map(|(id, _)| id).collect();
        prop_assert_eq!(&ids[..mounted.len()], &mounted[..]);
    }

    #[test]
    fn at_most_one_item_attached(
        config in arb_config(),
        host in arb_host(),
        schedule in arb_schedule(),
    ) {
        let (sim, _) = run(config, host, &schedule);
        let mut attached: Option<ItemId> = None;
        for record in sim.timeline() {
            match record.op {
                SurfaceOp::Mount { id, .. } => {
                    prop_assert!(attached.is_none(), "{} mounted over {:?}", id, attached);
                    attached = Some(id);
                }
                SurfaceOp::Detach(id) => {
                    prop_assert_eq!(attached, Some(id));
                    attached = None;
                }
                SurfaceOp::Show(id) | SurfaceOp::Hide(id) => {
                    prop_assert_eq!(attached, Some(id));
                }
            }
        }
    }
}

// ── 3-4. Timing ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn hold_is_never_shortened(
        config in arb_config(),
        host in arb_host(),
        schedule in arb_schedule(),
    ) {
        let (sim, _) = run(config, host, &schedule);
        let timeline = sim.timeline();
        for (id, mounted_at) in mounts(timeline) {
            if let Some(hidden_at) = find(timeline, id, "hide") {
                prop_assert!(
                    hidden_at >= mounted_at + config.toast_duration,
                    "{} hidden at {:?}, mounted at {:?}", id, hidden_at, mounted_at
                );
            }
        }
    }

    #[test]
    fn gap_is_never_shortened(
        config in arb_config(),
        host in arb_host(),
        schedule in arb_schedule(),
    ) {
        let (sim, _) = run(config, host, &schedule);
        let timeline = sim.timeline();
        let mounted = mounts(timeline);
        for pair in mounted.windows(2) {
            let (prev, _) = pair[0];
            let (_, next_at) = pair[1];
            let detached_at = find(timeline, prev, "detach");
            prop_assert!(detached_at.is_some(), "{} never detached", prev);
            if let Some(detached_at) = detached_at {
                prop_assert!(next_at >= detached_at + config.queue_delay);
            }
        }
    }
}

// ── 5-6. Completion and accounting ────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn live_host_shows_everything(
        config in arb_config(),
        (frame, exit) in (0u64..700, 0u64..700),
        schedule in arb_schedule(),
    ) {
        let (sim, ids) = run(config, (frame, exit, true), &schedule);
        prop_assert!(!sim.queue().is_active());
        prop_assert_eq!(mounts(sim.timeline()).len(), ids.len());
    }

    #[test]
    fn stats_match_timeline(
        config in arb_config(),
        host in arb_host(),
        schedule in arb_schedule(),
    ) {
        let (sim, ids) = run(config, host, &schedule);
        let stats = sim.queue().stats();
        let detached = sim
            .timeline()
            .iter()
            .filter(|r| matches!(r.op, SurfaceOp::Detach(_)))
            .count() as u64;

        prop_assert_eq!(stats.total_enqueued, ids.len() as u64);
        prop_assert_eq!(stats.displayed, mounts(sim.timeline()).len() as u64);
        prop_assert_eq!(stats.settled_by_signal + stats.settled_by_fallback, detached);
        prop_assert_eq!(stats.surface_errors, 0);
    }
}
