#![forbid(unsafe_code)]

//! Sequential toast notification queue.
//!
//! # Role in toastline
//! This crate is the engine. Callers enqueue messages; the queue shows them
//! one at a time in arrival order, each held for a fixed duration and
//! followed by a fixed gap.
//!
//! # How it fits in the system
//! - [`cycle`]: the pure state machine ([`DisplayCycle`]).
//! - [`queue`]: [`NotificationQueue`], which hosts push signals into.
//! - [`surface`]: the [`ToastSurface`] and [`Announcer`] seams plus
//!   recording doubles.
//! - [`simulator`]: [`QueueSimulator`], an automatic host on virtual time.
//!
//! The browser host lives in `toastline-web`; data types and configuration
//! live in `toastline-core` and are re-exported here.

pub mod cycle;
pub mod queue;
pub mod simulator;
pub mod surface;

pub use cycle::{
    CycleEvent, DisplayCycle, Effect, IgnoredSignal, PhaseKind, SettleCause, Step, Transition,
};
pub use queue::{NotificationQueue, QueueStats};
pub use simulator::QueueSimulator;
pub use surface::{
    Announcer, RecordedOp, RecordingAnnouncer, RecordingError, RecordingSurface, SurfaceOp,
    ToastSurface,
};

pub use toastline_core::{
    Category, Clock, ConfigError, DeterministicClock, ItemId, Politeness, QueueConfig, QueueItem,
    SystemClock,
};
