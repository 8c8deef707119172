#![forbid(unsafe_code)]

//! Deterministic host model for tests and headless runs.
//!
//! [`QueueSimulator`] drives a [`NotificationQueue`] on virtual time the
//! way a browser would: a frame arrives `frame_interval` after each mount,
//! and the exit animation reports completion `exit_transition` after it
//! starts. Disabling the exit signal reproduces a host whose animation
//! never finishes.
//!
//! ```
//! use std::time::Duration;
//! use toastline::{Category, QueueConfig, QueueSimulator};
//!
//! let mut sim = QueueSimulator::new(QueueConfig::default());
//! sim.enqueue("Saved", Category::Success);
//! let timeline = sim.run_until_idle(Duration::from_secs(10));
//! assert_eq!(timeline.len(), 4);
//! assert!(!sim.queue().is_active());
//! ```

use core::time::Duration;

use toastline_core::{Category, Clock, DeterministicClock, ItemId, QueueConfig};

use crate::queue::NotificationQueue;
use crate::surface::{Announcer, RecordedOp, RecordingSurface, SurfaceOp};

/// Default delay between a mount and the next rendering opportunity.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Default exit animation length.
pub const DEFAULT_EXIT_TRANSITION: Duration = Duration::from_millis(300);

/// Virtual-time host around a recording queue.
#[derive(Debug)]
pub struct QueueSimulator {
    queue: NotificationQueue<RecordingSurface, DeterministicClock>,
    clock: DeterministicClock,
    frame_interval: Duration,
    exit_transition: Duration,
    exit_signal: bool,
    frame_due: Option<Duration>,
    exit_due: Option<(ItemId, Duration)>,
    observed: usize,
    reported: usize,
}

impl QueueSimulator {
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        let clock = DeterministicClock::new();
        let surface = RecordingSurface::new().with_clock(clock.clone());
        Self {
            queue: NotificationQueue::new(config, surface, clock.clone()),
            clock,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            exit_transition: DEFAULT_EXIT_TRANSITION,
            exit_signal: true,
            frame_due: None,
            exit_due: None,
            observed: 0,
            reported: 0,
        }
    }

    /// Delay between a mount and its frame signal. A frame still pending
    /// when the next item mounts is replaced by that item's frame, so with
    /// intervals longer than a full cycle earlier frames are never delivered.
    #[must_use]
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub fn exit_transition(mut self, duration: Duration) -> Self {
        self.exit_transition = duration;
        self
    }

    /// Whether the host ever reports exit completion.
    #[must_use]
    pub fn exit_signal(mut self, enabled: bool) -> Self {
        self.exit_signal = enabled;
        self
    }

    /// Attach an announcer to the simulated queue.
    #[must_use]
    pub fn with_announcer(mut self, announcer: impl Announcer + 'static) -> Self {
        self.queue = self.queue.with_announcer(announcer);
        self
    }

    #[must_use]
    pub fn queue(&self) -> &NotificationQueue<RecordingSurface, DeterministicClock> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut NotificationQueue<RecordingSurface, DeterministicClock> {
        &mut self.queue
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Every surface operation so far.
    #[must_use]
    pub fn timeline(&self) -> &[RecordedOp] {
        self.queue.surface().ops()
    }

    /// Enqueue at the current virtual time.
    pub fn enqueue(&mut self, message: impl Into<String>, category: Category) -> ItemId {
        let id = self.queue.enqueue(message, category);
        self.observe();
        id
    }

    /// Deliver every host event due up to `until`, then move the clock there.
    pub fn advance_to(&mut self, until: Duration) {
        while let Some(at) = self.next_event().filter(|at| *at <= until) {
            self.step_at(at);
        }
        self.clock.set(until);
    }

    /// Run until the queue is idle, it stalls, or `limit` of virtual time
    /// has passed. Returns every surface operation not returned by an
    /// earlier call, including mounts performed by [`Self::enqueue`].
    pub fn run_until_idle(&mut self, limit: Duration) -> Vec<RecordedOp> {
        let horizon = self.now().saturating_add(limit);
        while self.queue.is_active() {
            match self.next_event().filter(|at| *at <= horizon) {
                Some(at) => self.step_at(at),
                None => break,
            }
        }
        let end = self.timeline().len();
        let fresh = self.timeline()[self.reported.min(end)..].to_vec();
        self.reported = end;
        fresh
    }

    /// Earliest time at which the host or the queue has something to do.
    #[must_use]
    pub fn next_event(&self) -> Option<Duration> {
        [
            self.frame_due,
            self.exit_due.map(|(_, at)| at),
            self.queue.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn step_at(&mut self, at: Duration) {
        self.clock.set(at);
        if self.frame_due.is_some_and(|due| due <= at) {
            self.frame_due = None;
            self.queue.frame();
        }
        if let Some((id, _)) = self.exit_due.filter(|(_, due)| *due <= at) {
            self.exit_due = None;
            self.queue.exit_complete(id);
        }
        self.queue.tick();
        self.observe();
    }

    /// Schedule host signals for operations the queue just performed.
    fn observe(&mut self) {
        let ops = self.queue.surface().ops();
        for record in &ops[self.observed..] {
            match record.op {
                SurfaceOp::Mount { .. } => {
                    self.frame_due = Some(record.at.saturating_add(self.frame_interval));
                }
                SurfaceOp::Hide(id) if self.exit_signal => {
                    self.exit_due = Some((id, record.at.saturating_add(self.exit_transition)));
                }
                SurfaceOp::Detach(id) => {
                    if self.exit_due.is_some_and(|(due_id, _)| due_id == id) {
                        self.exit_due = None;
                    }
                }
                SurfaceOp::Show(_) | SurfaceOp::Hide(_) => {}
            }
        }
        self.observed = ops.len();
    }
}
