#![forbid(unsafe_code)]

//! The display cycle as an explicit state machine.
//!
//! [`DisplayCycle`] owns the pending FIFO and the single active slot. It is
//! pure: it never reads a clock or touches a surface. Callers feed it
//! [`CycleEvent`]s stamped with a monotonic `now` and act on the returned
//! [`Effect`]s.
//!
//! ```text
//! Idle ──enqueue──▶ Mounting ──frame──▶ Holding ──hold elapsed──▶ Dismissing
//!  ▲                   │                                            │
//!  │                   └──────────hold elapsed (no frame)───────────┤
//!  │                                                                │ exit complete
//!  │                                                                │ or fallback
//!  └──empty── Cooldown ◀──────────── Settling (detach) ◀────────────┘
//!                │
//!                └──pending──▶ Mounting
//! ```
//!
//! # Invariants
//!
//! 1. At most one item is outside `pending` at any time.
//! 2. Items leave `pending` strictly in arrival order.
//! 3. An item's dismissal is never triggered before `mount + toast_duration`.
//! 4. The next mount is never earlier than `detach + queue_delay`.
//! 5. Observed time never runs backwards; an earlier `now` is clamped.
//!
//! `Settling` is transient: detachment happens inside the transition that
//! enters it, so it only ever appears in the [`Transition`] log.

use core::time::Duration;
use std::collections::VecDeque;
use std::fmt;

use toastline_core::{ItemId, QueueConfig, QueueItem};

/// Observable phase of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Nothing displayed, nothing pending.
    Idle,
    /// Element attached, waiting for a rendering opportunity.
    Mounting,
    /// Entry animation started, waiting for the hold deadline.
    Holding,
    /// Exit animation started, waiting for its completion signal.
    Dismissing,
    /// Element being detached.
    Settling,
    /// Waiting out the gap before the next item.
    Cooldown,
}

impl PhaseKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Mounting => "mounting",
            Self::Holding => "holding",
            Self::Dismissing => "dismissing",
            Self::Settling => "settling",
            Self::Cooldown => "cooldown",
        }
    }

    /// True for the phases during which an item is on screen.
    #[must_use]
    pub const fn is_displaying(self) -> bool {
        matches!(
            self,
            Self::Mounting | Self::Holding | Self::Dismissing | Self::Settling
        )
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`DisplayCycle::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// A new item was accepted.
    Enqueued(QueueItem),
    /// The host reached a rendering opportunity.
    Frame,
    /// The exit animation of this item finished.
    ExitComplete(ItemId),
    /// Time moved; process every deadline that has passed.
    Elapsed,
}

impl CycleEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Enqueued(_) => "enqueued",
            Self::Frame => "frame",
            Self::ExitComplete(_) => "exit_complete",
            Self::Elapsed => "elapsed",
        }
    }
}

/// Why an item was detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleCause {
    /// The exit-complete signal arrived.
    Signal,
    /// The settle timeout expired first.
    Fallback,
}

/// Work the host must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create and attach an element for this item.
    Mount(QueueItem),
    /// Start the entry animation.
    Show(ItemId),
    /// Start the exit animation and watch for its completion.
    Hide(ItemId),
    /// Remove the element.
    Detach { id: ItemId, cause: SettleCause },
}

/// A signal that arrived when the cycle could not use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredSignal {
    /// Frame outside `Mounting`.
    Frame,
    /// Exit-complete for an item that is not currently dismissing.
    Exit(ItemId),
}

/// One recorded phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Item the change concerns; for `Cooldown -> Idle` the item that
    /// was shown last.
    pub item: ItemId,
    pub from: PhaseKind,
    pub to: PhaseKind,
    /// Monotonic time of the change.
    pub at: Duration,
}

/// Result of handling one event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Step {
    pub effects: Vec<Effect>,
    pub transitions: Vec<Transition>,
    pub ignored: Option<IgnoredSignal>,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Mounting {
        item: QueueItem,
        hold_until: Duration,
    },
    Holding {
        item: QueueItem,
        hold_until: Duration,
    },
    Dismissing {
        item: QueueItem,
        fallback_at: Option<Duration>,
    },
    Cooldown {
        after: ItemId,
        until: Duration,
    },
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::Mounting { .. } => PhaseKind::Mounting,
            Self::Holding { .. } => PhaseKind::Holding,
            Self::Dismissing { .. } => PhaseKind::Dismissing,
            Self::Cooldown { .. } => PhaseKind::Cooldown,
        }
    }
}

/// Deadline-driven work that is ready at a given instant.
#[derive(Debug, Clone, Copy)]
enum Due {
    Dismiss,
    Fallback,
    Advance,
}

/// FIFO notification state machine.
#[derive(Debug, Clone)]
pub struct DisplayCycle {
    config: QueueConfig,
    pending: VecDeque<QueueItem>,
    phase: Phase,
    last_now: Duration,
}

impl DisplayCycle {
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            phase: Phase::Idle,
            last_now: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// True from the start of a display cycle until the queue is idle again.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending items, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &QueueItem> {
        self.pending.iter()
    }

    /// The item currently on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<&QueueItem> {
        match &self.phase {
            Phase::Mounting { item, .. }
            | Phase::Holding { item, .. }
            | Phase::Dismissing { item, .. } => Some(item),
            Phase::Idle | Phase::Cooldown { .. } => None,
        }
    }

    /// True while the cycle is waiting for a rendering opportunity.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        matches!(self.phase, Phase::Mounting { .. })
    }

    /// Earliest time at which [`CycleEvent::Elapsed`] would make progress.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Mounting { hold_until, .. } | Phase::Holding { hold_until, .. } => {
                Some(*hold_until)
            }
            Phase::Dismissing { fallback_at, .. } => *fallback_at,
            Phase::Cooldown { until, .. } => Some(*until),
        }
    }

    /// Apply one event at monotonic time `now`.
    pub fn handle(&mut self, event: CycleEvent, now: Duration) -> Step {
        let now = self.observe(now);
        let mut step = Step::default();

        match event {
            CycleEvent::Enqueued(item) => {
                self.pending.push_back(item);
                if matches!(self.phase, Phase::Idle) {
                    self.try_advance(now, &mut step);
                }
            }
            CycleEvent::Frame => self.on_frame(now, &mut step),
            CycleEvent::ExitComplete(id) => self.on_exit_complete(id, now, &mut step),
            CycleEvent::Elapsed => self.on_elapsed(now, &mut step),
        }

        step
    }

    fn observe(&mut self, now: Duration) -> Duration {
        self.last_now = self.last_now.max(now);
        self.last_now
    }

    fn on_frame(&mut self, now: Duration, step: &mut Step) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Mounting { item, hold_until } => {
                let id = item.id;
                self.phase = Phase::Holding { item, hold_until };
                record(step, id, PhaseKind::Mounting, PhaseKind::Holding, now);
                step.effects.push(Effect::Show(id));
            }
            other => {
                self.phase = other;
                step.ignored = Some(IgnoredSignal::Frame);
            }
        }
    }

    fn on_exit_complete(&mut self, id: ItemId, now: Duration, step: &mut Step) {
        let dismissing = matches!(&self.phase, Phase::Dismissing { item, .. } if item.id == id);
        if dismissing {
            self.settle(now, SettleCause::Signal, step);
        } else {
            step.ignored = Some(IgnoredSignal::Exit(id));
        }
    }

    fn on_elapsed(&mut self, now: Duration, step: &mut Step) {
        // Zero-length delays can chain several phases in one observation.
        while let Some(due) = self.due(now) {
            match due {
                Due::Dismiss => self.dismiss(now, step),
                Due::Fallback => self.settle(now, SettleCause::Fallback, step),
                Due::Advance => self.try_advance(now, step),
            }
            if !self.is_active() {
                break;
            }
        }
    }

    fn due(&self, now: Duration) -> Option<Due> {
        match &self.phase {
            Phase::Mounting { hold_until, .. } | Phase::Holding { hold_until, .. }
                if now >= *hold_until =>
            {
                Some(Due::Dismiss)
            }
            Phase::Dismissing {
                fallback_at: Some(at),
                ..
            } if now >= *at => Some(Due::Fallback),
            Phase::Cooldown { until, .. } if now >= *until => Some(Due::Advance),
            _ => None,
        }
    }

    fn dismiss(&mut self, now: Duration, step: &mut Step) {
        let (item, from) = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Mounting { item, .. } => (item, PhaseKind::Mounting),
            Phase::Holding { item, .. } => (item, PhaseKind::Holding),
            other => {
                self.phase = other;
                return;
            }
        };
        let id = item.id;
        let fallback_at = self.config.settle_timeout.map(|t| now.saturating_add(t));
        self.phase = Phase::Dismissing { item, fallback_at };
        record(step, id, from, PhaseKind::Dismissing, now);
        step.effects.push(Effect::Hide(id));
    }

    fn settle(&mut self, now: Duration, cause: SettleCause, step: &mut Step) {
        let Phase::Dismissing { item, .. } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return;
        };
        let id = item.id;
        record(step, id, PhaseKind::Dismissing, PhaseKind::Settling, now);
        step.effects.push(Effect::Detach { id, cause });
        self.phase = Phase::Cooldown {
            after: id,
            until: now.saturating_add(self.config.queue_delay),
        };
        record(step, id, PhaseKind::Settling, PhaseKind::Cooldown, now);
    }

    fn try_advance(&mut self, now: Duration, step: &mut Step) {
        let (from, previous) = match &self.phase {
            Phase::Cooldown { after, .. } => (PhaseKind::Cooldown, Some(*after)),
            _ => (self.phase.kind(), None),
        };

        match self.pending.pop_front() {
            Some(item) => {
                let id = item.id;
                let hold_until = now.saturating_add(self.config.toast_duration);
                self.phase = Phase::Mounting {
                    item: item.clone(),
                    hold_until,
                };
                record(step, id, from, PhaseKind::Mounting, now);
                step.effects.push(Effect::Mount(item));
            }
            None => {
                self.phase = Phase::Idle;
                if let Some(previous) = previous {
                    record(step, previous, from, PhaseKind::Idle, now);
                }
            }
        }
    }
}

fn record(step: &mut Step, item: ItemId, from: PhaseKind, to: PhaseKind, at: Duration) {
    step.transitions.push(Transition { item, from, to, at });
}

#[cfg(test)]
mod tests {
    use super::*;
    use toastline_core::Category;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn item(id: u64, msg: &str) -> QueueItem {
        QueueItem::new(ItemId::new(id), msg, Category::Info)
    }

    fn config() -> QueueConfig {
        QueueConfig::new()
            .toast_duration(ms(100))
            .queue_delay(ms(50))
            .settle_timeout(Some(ms(400)))
    }

    #[test]
    fn new_cycle_is_idle() {
        let cycle = DisplayCycle::new(config());
        assert_eq!(cycle.phase(), PhaseKind::Idle);
        assert!(!cycle.is_active());
        assert_eq!(cycle.next_deadline(), None);
        assert!(cycle.current().is_none());
    }

    #[test]
    fn enqueue_on_idle_mounts_immediately() {
        let mut cycle = DisplayCycle::new(config());
        let step = cycle.handle(CycleEvent::Enqueued(item(1, "Saved")), ms(0));

        assert_eq!(step.effects, vec![Effect::Mount(item(1, "Saved"))]);
        assert_eq!(cycle.phase(), PhaseKind::Mounting);
        assert!(cycle.wants_frame());
        assert_eq!(cycle.next_deadline(), Some(ms(100)));
        assert_eq!(cycle.pending_count(), 0);
    }

    #[test]
    fn enqueue_while_active_waits() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        let step = cycle.handle(CycleEvent::Enqueued(item(2, "B")), ms(1));

        assert!(step.effects.is_empty());
        assert_eq!(cycle.pending_count(), 1);
        assert_eq!(cycle.current().map(|i| i.id), Some(ItemId::new(1)));
    }

    #[test]
    fn frame_starts_entry_animation() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        let step = cycle.handle(CycleEvent::Frame, ms(16));

        assert_eq!(step.effects, vec![Effect::Show(ItemId::new(1))]);
        assert_eq!(cycle.phase(), PhaseKind::Holding);
        assert!(!cycle.wants_frame());
        // Hold is measured from mount, not from the frame.
        assert_eq!(cycle.next_deadline(), Some(ms(100)));
    }

    #[test]
    fn frame_outside_mounting_is_ignored() {
        let mut cycle = DisplayCycle::new(config());
        let step = cycle.handle(CycleEvent::Frame, ms(0));
        assert_eq!(step.ignored, Some(IgnoredSignal::Frame));
        assert_eq!(cycle.phase(), PhaseKind::Idle);
    }

    #[test]
    fn hold_does_not_end_early() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));

        let step = cycle.handle(CycleEvent::Elapsed, ms(99));
        assert!(step.effects.is_empty());
        assert_eq!(cycle.phase(), PhaseKind::Holding);

        let step = cycle.handle(CycleEvent::Elapsed, ms(100));
        assert_eq!(step.effects, vec![Effect::Hide(ItemId::new(1))]);
        assert_eq!(cycle.phase(), PhaseKind::Dismissing);
        assert_eq!(cycle.next_deadline(), Some(ms(500)));
    }

    #[test]
    fn exit_signal_detaches_then_cools_down() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));
        cycle.handle(CycleEvent::Elapsed, ms(100));

        let step = cycle.handle(CycleEvent::ExitComplete(ItemId::new(1)), ms(400));
        assert_eq!(
            step.effects,
            vec![Effect::Detach {
                id: ItemId::new(1),
                cause: SettleCause::Signal
            }]
        );
        let kinds: Vec<_> = step.transitions.iter().map(|t| (t.from, t.to)).collect();
        assert_eq!(
            kinds,
            vec![
                (PhaseKind::Dismissing, PhaseKind::Settling),
                (PhaseKind::Settling, PhaseKind::Cooldown)
            ]
        );
        assert_eq!(cycle.phase(), PhaseKind::Cooldown);
        assert_eq!(cycle.next_deadline(), Some(ms(450)));
        assert!(cycle.is_active());
    }

    #[test]
    fn cooldown_with_empty_queue_returns_to_idle() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));
        cycle.handle(CycleEvent::Elapsed, ms(100));
        cycle.handle(CycleEvent::ExitComplete(ItemId::new(1)), ms(400));

        assert!(cycle.handle(CycleEvent::Elapsed, ms(449)).transitions.is_empty());
        let step = cycle.handle(CycleEvent::Elapsed, ms(450));
        assert_eq!(
            step.transitions,
            vec![Transition {
                item: ItemId::new(1),
                from: PhaseKind::Cooldown,
                to: PhaseKind::Idle,
                at: ms(450),
            }]
        );
        assert!(!cycle.is_active());
    }

    #[test]
    fn cooldown_mounts_next_in_fifo_order() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Enqueued(item(2, "B")), ms(0));
        cycle.handle(CycleEvent::Enqueued(item(3, "C")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));
        cycle.handle(CycleEvent::Elapsed, ms(100));
        cycle.handle(CycleEvent::ExitComplete(ItemId::new(1)), ms(300));

        let step = cycle.handle(CycleEvent::Elapsed, ms(350));
        assert_eq!(step.effects, vec![Effect::Mount(item(2, "B"))]);
        assert_eq!(cycle.next_deadline(), Some(ms(450)));
        let rest: Vec<_> = cycle.pending().map(|i| i.message.as_str()).collect();
        assert_eq!(rest, vec!["C"]);
    }

    #[test]
    fn stale_exit_signal_is_ignored() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));

        // Before dismissal.
        let step = cycle.handle(CycleEvent::ExitComplete(ItemId::new(1)), ms(20));
        assert_eq!(step.ignored, Some(IgnoredSignal::Exit(ItemId::new(1))));
        assert_eq!(cycle.phase(), PhaseKind::Holding);

        // Wrong item while dismissing.
        cycle.handle(CycleEvent::Elapsed, ms(100));
        let step = cycle.handle(CycleEvent::ExitComplete(ItemId::new(9)), ms(120));
        assert_eq!(step.ignored, Some(IgnoredSignal::Exit(ItemId::new(9))));
        assert_eq!(cycle.phase(), PhaseKind::Dismissing);
    }

    #[test]
    fn fallback_settles_missing_exit_signal() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));
        cycle.handle(CycleEvent::Elapsed, ms(100));

        let step = cycle.handle(CycleEvent::Elapsed, ms(500));
        assert_eq!(
            step.effects,
            vec![Effect::Detach {
                id: ItemId::new(1),
                cause: SettleCause::Fallback
            }]
        );

        // A late signal for the same item no longer applies.
        let step = cycle.handle(CycleEvent::ExitComplete(ItemId::new(1)), ms(510));
        assert_eq!(step.ignored, Some(IgnoredSignal::Exit(ItemId::new(1))));
    }

    #[test]
    fn without_fallback_the_cycle_waits_forever() {
        let mut cycle = DisplayCycle::new(config().settle_timeout(None));
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Enqueued(item(2, "B")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));
        cycle.handle(CycleEvent::Elapsed, ms(100));

        assert_eq!(cycle.next_deadline(), None);
        let step = cycle.handle(CycleEvent::Elapsed, ms(3_600_000));
        assert!(step.effects.is_empty());
        assert_eq!(cycle.phase(), PhaseKind::Dismissing);
        assert_eq!(cycle.pending_count(), 1);
    }

    #[test]
    fn missing_frame_still_dismisses_on_time() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));

        let step = cycle.handle(CycleEvent::Elapsed, ms(100));
        assert_eq!(step.effects, vec![Effect::Hide(ItemId::new(1))]);
        assert_eq!(step.transitions[0].from, PhaseKind::Mounting);
        assert_eq!(cycle.phase(), PhaseKind::Dismissing);
    }

    #[test]
    fn zero_delays_chain_in_one_observation() {
        let mut cycle = DisplayCycle::new(
            config()
                .queue_delay(Duration::ZERO)
                .settle_timeout(Some(Duration::ZERO)),
        );
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Enqueued(item(2, "B")), ms(0));

        // Hold elapsed: dismiss, fallback settles at once, zero cooldown
        // mounts B, whose own hold is still running.
        let step = cycle.handle(CycleEvent::Elapsed, ms(100));
        assert_eq!(
            step.effects,
            vec![
                Effect::Hide(ItemId::new(1)),
                Effect::Detach {
                    id: ItemId::new(1),
                    cause: SettleCause::Fallback
                },
                Effect::Mount(item(2, "B")),
            ]
        );
        assert_eq!(cycle.next_deadline(), Some(ms(200)));
    }

    #[test]
    fn time_never_runs_backwards() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(50));
        cycle.handle(CycleEvent::Enqueued(item(2, "B")), ms(10));
        // The earlier stamp is clamped and leaves the deadline alone.
        assert_eq!(cycle.next_deadline(), Some(ms(150)));
        let step = cycle.handle(CycleEvent::Frame, ms(0));
        assert_eq!(step.transitions[0].at, ms(50));
    }

    #[test]
    fn late_observation_never_shortens_next_hold() {
        let mut cycle = DisplayCycle::new(config());
        cycle.handle(CycleEvent::Enqueued(item(1, "A")), ms(0));
        cycle.handle(CycleEvent::Enqueued(item(2, "B")), ms(0));
        cycle.handle(CycleEvent::Frame, ms(16));
        cycle.handle(CycleEvent::Elapsed, ms(100));
        cycle.handle(CycleEvent::ExitComplete(ItemId::new(1)), ms(300));

        // Host wakes 1s after the cooldown deadline.
        cycle.handle(CycleEvent::Elapsed, ms(1_350));
        assert_eq!(cycle.next_deadline(), Some(ms(1_450)));
    }

    #[test]
    fn phase_kind_labels() {
        assert_eq!(PhaseKind::Settling.to_string(), "settling");
        assert!(PhaseKind::Dismissing.is_displaying());
        assert!(!PhaseKind::Cooldown.is_displaying());
        assert!(!PhaseKind::Idle.is_displaying());
        assert_eq!(CycleEvent::Frame.name(), "frame");
    }
}
