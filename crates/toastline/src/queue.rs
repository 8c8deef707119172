#![forbid(unsafe_code)]

//! Host-facing notification queue.
//!
//! [`NotificationQueue`] binds a [`DisplayCycle`] to a [`ToastSurface`], an
//! optional [`Announcer`] and a [`Clock`]. It is sans-IO: the host pushes
//! signals (`frame`, `exit_complete`, `tick`) and asks when to wake
//! (`next_deadline`, `wants_frame`).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use toastline::{NotificationQueue, PhaseKind, RecordingSurface};
//! use toastline_core::{Category, DeterministicClock, QueueConfig};
//!
//! let clock = DeterministicClock::new();
//! let mut queue = NotificationQueue::new(
//!     QueueConfig::default(),
//!     RecordingSurface::new(),
//!     clock.clone(),
//! );
//!
//! queue.enqueue("Saved", Category::Success);
//! assert_eq!(queue.phase(), PhaseKind::Mounting);
//!
//! clock.advance(Duration::from_millis(16));
//! queue.frame();
//! assert_eq!(queue.phase(), PhaseKind::Holding);
//! ```
//!
//! # Failure handling
//!
//! Surface errors never reach `enqueue` callers and never stop the cycle:
//! they are logged at `warn` and counted in [`QueueStats::surface_errors`].

use core::time::Duration;
use std::collections::VecDeque;
use std::fmt;

use toastline_core::logging::QUEUE_TARGET;
use toastline_core::{Category, Clock, ItemId, QueueConfig, QueueItem, SystemClock};
use tracing::{Span, debug, debug_span, trace, warn};

use crate::cycle::{
    CycleEvent, DisplayCycle, Effect, IgnoredSignal, PhaseKind, SettleCause, Step, Transition,
};
use crate::surface::{Announcer, ToastSurface};

/// Transitions kept for [`NotificationQueue::take_transitions`].
const HISTORY_LIMIT: usize = 256;

/// Counters over the queue's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items accepted by `enqueue`.
    pub total_enqueued: u64,
    /// Items mounted.
    pub displayed: u64,
    /// Items detached after their exit-complete signal.
    pub settled_by_signal: u64,
    /// Items detached by the settle fallback.
    pub settled_by_fallback: u64,
    /// Exit-complete signals that did not match the dismissing item.
    pub stale_signals: u64,
    /// Frame signals outside `Mounting`.
    pub ignored_frames: u64,
    /// Surface operations that returned an error.
    pub surface_errors: u64,
}

/// Sequential toast queue driven by a host.
pub struct NotificationQueue<S: ToastSurface, C: Clock = SystemClock> {
    cycle: DisplayCycle,
    surface: S,
    clock: C,
    announcer: Option<Box<dyn Announcer>>,
    next_id: u64,
    stats: QueueStats,
    history: VecDeque<Transition>,
    cycle_span: Option<Span>,
}

impl<S: ToastSurface, C: Clock> NotificationQueue<S, C> {
    #[must_use]
    pub fn new(config: QueueConfig, surface: S, clock: C) -> Self {
        Self {
            cycle: DisplayCycle::new(config),
            surface,
            clock,
            announcer: None,
            next_id: 1,
            stats: QueueStats::default(),
            history: VecDeque::new(),
            cycle_span: None,
        }
    }

    /// Mirror each displayed message to `announcer`.
    #[must_use]
    pub fn with_announcer(mut self, announcer: impl Announcer + 'static) -> Self {
        self.announcer = Some(Box::new(announcer));
        self
    }

    /// Accept a notification. If the queue is idle it is mounted before
    /// this call returns; otherwise it waits its turn.
    pub fn enqueue(&mut self, message: impl Into<String>, category: Category) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        self.stats.total_enqueued += 1;

        let item = QueueItem::new(id, message, category);
        debug!(
            target: QUEUE_TARGET,
            item = %id,
            category = %category,
            pending = self.cycle.pending_count(),
            "toast enqueued"
        );
        self.dispatch(CycleEvent::Enqueued(item));
        id
    }

    /// [`enqueue`](Self::enqueue) with the category parsed from a label.
    /// Unrecognised labels fall back to [`Category::Info`].
    pub fn enqueue_label(&mut self, message: impl Into<String>, label: &str) -> ItemId {
        self.enqueue(message, Category::from_label(label))
    }

    /// Deliver a rendering opportunity.
    pub fn frame(&mut self) {
        self.dispatch(CycleEvent::Frame);
    }

    /// Deliver the exit-animation-complete signal for `id`.
    pub fn exit_complete(&mut self, id: ItemId) {
        self.dispatch(CycleEvent::ExitComplete(id));
    }

    /// Process every deadline that has passed.
    pub fn tick(&mut self) {
        self.dispatch(CycleEvent::Elapsed);
    }

    /// Earliest monotonic time at which `tick` would make progress.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.cycle.next_deadline()
    }

    /// Time from now until [`next_deadline`](Self::next_deadline), zero if
    /// it has already passed.
    #[must_use]
    pub fn time_until_deadline(&self) -> Option<Duration> {
        let now = self.clock.now_mono();
        self.next_deadline().map(|at| at.saturating_sub(now))
    }

    #[must_use]
    pub fn wants_frame(&self) -> bool {
        self.cycle.wants_frame()
    }

    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.cycle.phase()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cycle.is_active()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.cycle.pending_count()
    }

    #[must_use]
    pub fn current(&self) -> Option<&QueueItem> {
        self.cycle.current()
    }

    #[must_use]
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Drain the recorded phase changes, oldest first.
    ///
    /// Only the most recent transitions are kept between drains.
    pub fn take_transitions(&mut self) -> Vec<Transition> {
        self.history.drain(..).collect()
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        self.cycle.config()
    }

    fn dispatch(&mut self, event: CycleEvent) {
        let now = self.clock.now_mono();
        let name = event.name();
        let parent = self.cycle_span.clone().unwrap_or_else(Span::none);
        let _parent = parent.enter();
        let span = debug_span!(
            target: QUEUE_TARGET,
            "toast.dispatch",
            event = name,
            phase = %self.cycle.phase(),
        );
        let _guard = span.enter();

        let step = self.cycle.handle(event, now);
        self.apply(step);
    }

    fn apply(&mut self, step: Step) {
        let Step {
            effects,
            transitions,
            ignored,
        } = step;

        match ignored {
            Some(IgnoredSignal::Frame) => {
                self.stats.ignored_frames += 1;
                trace!(target: QUEUE_TARGET, phase = %self.cycle.phase(), "frame ignored");
            }
            Some(IgnoredSignal::Exit(id)) => {
                self.stats.stale_signals += 1;
                trace!(
                    target: QUEUE_TARGET,
                    item = %id,
                    phase = %self.cycle.phase(),
                    "stale exit signal ignored"
                );
            }
            None => {}
        }

        for t in transitions {
            self.log_transition(t);
        }
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Mount(item) => {
                self.stats.displayed += 1;
                self.cycle_span = Some(debug_span!(
                    target: QUEUE_TARGET,
                    parent: None,
                    "toast.cycle",
                    item = %item.id,
                    category = %item.category,
                ));
                let result = self.surface.mount(&item);
                self.report("mount", item.id, result);
                if let Some(announcer) = self.announcer.as_mut() {
                    announcer.announce(&item.message, item.category.politeness());
                }
            }
            Effect::Show(id) => {
                let result = self.surface.show(id);
                self.report("show", id, result);
            }
            Effect::Hide(id) => {
                let result = self.surface.hide(id);
                self.report("hide", id, result);
            }
            Effect::Detach { id, cause } => {
                match cause {
                    SettleCause::Signal => self.stats.settled_by_signal += 1,
                    SettleCause::Fallback => {
                        self.stats.settled_by_fallback += 1;
                        warn!(
                            target: QUEUE_TARGET,
                            item = %id,
                            "exit signal missing, settled by fallback"
                        );
                    }
                }
                let result = self.surface.detach(id);
                self.report("detach", id, result);
                self.cycle_span = None;
            }
        }
    }

    fn report(&mut self, op: &'static str, id: ItemId, result: Result<(), S::Error>) {
        if let Err(err) = result {
            self.stats.surface_errors += 1;
            warn!(
                target: QUEUE_TARGET,
                op,
                item = %id,
                error = %err,
                "surface operation failed"
            );
        }
    }

    fn log_transition(&mut self, t: Transition) {
        debug!(
            target: QUEUE_TARGET,
            item = %t.item,
            from = t.from.as_str(),
            to = t.to.as_str(),
            at_ms = duration_ms(t.at),
            "phase transition"
        );
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(t);
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl<S, C> fmt::Debug for NotificationQueue<S, C>
where
    S: ToastSurface + fmt::Debug,
    C: Clock + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("cycle", &self.cycle)
            .field("surface", &self.surface)
            .field("clock", &self.clock)
            .field("has_announcer", &self.announcer.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
