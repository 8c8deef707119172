#![forbid(unsafe_code)]

//! Monotonic clock abstraction.
//!
//! The queue never calls `Instant::now()` directly; all deadlines flow
//! through [`Clock`]. Native and browser hosts use [`SystemClock`]
//! (`web-time` maps to `performance.now()` on wasm32). Tests and the
//! simulator use [`DeterministicClock`], which only moves when told to.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use web_time::Instant;

/// Monotonic time source.
pub trait Clock {
    /// Returns elapsed time since an unspecified epoch, monotonically increasing.
    fn now_mono(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_mono(&self) -> Duration {
        (**self).now_mono()
    }
}

/// Wall-clock backed monotonic time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Deterministic monotonic clock controlled by the host.
///
/// Clones share the same underlying time, so a test can keep one handle
/// while the queue owns another.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    nanos: Arc<AtomicU64>,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set current monotonic time.
    ///
    /// Moving backwards is ignored; the clock stays where it was.
    pub fn set(&self, now: Duration) {
        self.nanos.fetch_max(saturating_nanos(now), Ordering::AcqRel);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&self, dt: Duration) {
        let dt = saturating_nanos(dt);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |now| {
                Some(now.saturating_add(dt))
            });
    }
}

impl Clock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
