#![forbid(unsafe_code)]

//! Presentation seams.
//!
//! A [`ToastSurface`] turns cycle effects into something the user sees: DOM
//! nodes in a browser, captured operations in a test. An [`Announcer`]
//! mirrors each displayed message into an assistive-technology live region.
//!
//! [`RecordingSurface`] and [`RecordingAnnouncer`] capture what they are
//! asked to do, for headless hosts and tests.

use core::time::Duration;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use toastline_core::{Category, Clock, DeterministicClock, ItemId, Politeness, QueueItem};

/// Output half of the queue: element lifecycle for one toast at a time.
///
/// Calls arrive in the order `mount`, `show` (may be skipped when the host
/// never rendered), `hide`, `detach`, and never for two items at once.
pub trait ToastSurface {
    /// Platform-specific error type.
    type Error: fmt::Debug + fmt::Display;

    /// Create and attach an element for `item`, text content exactly
    /// `item.message`, before its entry animation.
    fn mount(&mut self, item: &QueueItem) -> Result<(), Self::Error>;

    /// Start the entry animation.
    fn show(&mut self, id: ItemId) -> Result<(), Self::Error>;

    /// Start the exit animation. The host reports its completion through
    /// `NotificationQueue::exit_complete`.
    fn hide(&mut self, id: ItemId) -> Result<(), Self::Error>;

    /// Remove the element.
    fn detach(&mut self, id: ItemId) -> Result<(), Self::Error>;
}

/// Live-region mirror for assistive technology.
pub trait Announcer {
    /// Replace the region's text with `message`.
    fn announce(&mut self, message: &str, politeness: Politeness);
}

impl<F> Announcer for F
where
    F: FnMut(&str, Politeness),
{
    fn announce(&mut self, message: &str, politeness: Politeness) {
        self(message, politeness);
    }
}

// ---------------------------------------------------------------------------
// Recording doubles
// ---------------------------------------------------------------------------

/// One operation captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Mount {
        id: ItemId,
        message: String,
        category: Category,
    },
    Show(ItemId),
    Hide(ItemId),
    Detach(ItemId),
}

impl SurfaceOp {
    #[must_use]
    pub fn id(&self) -> ItemId {
        match self {
            Self::Mount { id, .. } | Self::Show(id) | Self::Hide(id) | Self::Detach(id) => *id,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mount { .. } => "mount",
            Self::Show(_) => "show",
            Self::Hide(_) => "hide",
            Self::Detach(_) => "detach",
        }
    }
}

/// A captured operation with the time it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOp {
    pub at: Duration,
    pub op: SurfaceOp,
}

/// Failure injected into a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingError {
    pub op: &'static str,
    pub id: ItemId,
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "injected {} failure for {}", self.op, self.id)
    }
}

impl std::error::Error for RecordingError {}

/// Surface that records every call.
///
/// With a clock attached, each operation is stamped with the clock's time;
/// otherwise stamps are zero.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    ops: Vec<RecordedOp>,
    attached: Vec<ItemId>,
    clock: Option<DeterministicClock>,
    fail: Vec<&'static str>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp operations with `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: DeterministicClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Make every call of the named operation (`"mount"`, `"show"`,
    /// `"hide"`, `"detach"`) fail after recording it.
    #[must_use]
    pub fn failing(mut self, op: &'static str) -> Self {
        self.fail.push(op);
        self
    }

    /// Captured operations in call order.
    #[must_use]
    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    /// Take captured operations, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<RecordedOp> {
        std::mem::take(&mut self.ops)
    }

    /// Elements mounted and not yet detached.
    #[must_use]
    pub fn attached(&self) -> &[ItemId] {
        &self.attached
    }

    /// Messages in the order they were mounted.
    #[must_use]
    pub fn mounted_messages(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|r| match &r.op {
                SurfaceOp::Mount { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, op: SurfaceOp) -> Result<(), RecordingError> {
        let at = self
            .clock
            .as_ref()
            .map_or(Duration::ZERO, Clock::now_mono);
        let name = op.name();
        let id = op.id();
        self.ops.push(RecordedOp { at, op });
        if self.fail.contains(&name) {
            Err(RecordingError { op: name, id })
        } else {
            Ok(())
        }
    }
}

impl ToastSurface for RecordingSurface {
    type Error = RecordingError;

    fn mount(&mut self, item: &QueueItem) -> Result<(), Self::Error> {
        self.attached.push(item.id);
        self.push(SurfaceOp::Mount {
            id: item.id,
            message: item.message.clone(),
            category: item.category,
        })
    }

    fn show(&mut self, id: ItemId) -> Result<(), Self::Error> {
        self.push(SurfaceOp::Show(id))
    }

    fn hide(&mut self, id: ItemId) -> Result<(), Self::Error> {
        self.push(SurfaceOp::Hide(id))
    }

    fn detach(&mut self, id: ItemId) -> Result<(), Self::Error> {
        self.attached.retain(|a| *a != id);
        self.push(SurfaceOp::Detach(id))
    }
}

/// Announcer handle that records announcements.
///
/// Clones share the same log, so a test can keep one handle while the
/// queue owns another.
#[derive(Debug, Default, Clone)]
pub struct RecordingAnnouncer {
    log: Rc<RefCell<Vec<(String, Politeness)>>>,
}

impl RecordingAnnouncer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Announcements so far, oldest first.
    #[must_use]
    pub fn announcements(&self) -> Vec<(String, Politeness)> {
        self.log.borrow().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&mut self, message: &str, politeness: Politeness) {
        self.log.borrow_mut().push((message.to_owned(), politeness));
    }
}
