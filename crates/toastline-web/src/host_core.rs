#![forbid(unsafe_code)]

//! Platform-independent pieces of the browser host.
//!
//! Everything the wasm exports decide without touching a browser API lives
//! here so it can be unit tested natively: element markup, config parsing,
//! and the wake-up plan derived from queue state.

use core::time::Duration;

use toastline::{Clock, NotificationQueue, ToastSurface};
use toastline_core::{Category, QueueConfig};

use crate::error::DomError;

/// Base class of every toast element.
pub const TOAST_CLASS: &str = "toast-message";
/// Class that triggers the entry animation.
pub const SHOW_CLASS: &str = "show";
/// Element role of a toast.
pub const TOAST_ROLE: &str = "status";
/// Default id of the shared live region.
pub const LIVE_REGION_ID: &str = "toast-live-region";
/// Inline style that hides the live region visually but not from screen readers.
pub const VISUALLY_HIDDEN_STYLE: &str = "position:absolute;width:1px;height:1px;\
    margin:-1px;padding:0;border:0;overflow:hidden;clip:rect(0 0 0 0);white-space:nowrap";
/// Event that reports the end of the exit animation.
pub const EXIT_EVENT: &str = "transitionend";

/// `class` attribute for a toast of `category`.
#[must_use]
pub fn toast_class_name(category: Category) -> String {
    format!("{TOAST_CLASS} {}", category.as_class())
}

/// Parse the optional JSON config handed to the toaster constructor.
///
/// `None`, an empty string and whitespace mean "use defaults".
pub fn parse_config(json: Option<&str>) -> Result<QueueConfig, DomError> {
    match json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => Ok(QueueConfig::from_json_str(text)?),
        None => Ok(QueueConfig::default()),
    }
}

/// Millisecond argument for `setTimeout`, rounded up so the timer never
/// fires before the deadline.
#[must_use]
pub fn timeout_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_micros().div_ceil(1000)).unwrap_or(i32::MAX)
}

/// Browser callbacks the host needs after a queue call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakePlan {
    /// `setTimeout` delay, if any deadline is pending.
    pub timeout_ms: Option<i32>,
    /// Whether a `requestAnimationFrame` is wanted.
    pub frame: bool,
}

impl WakePlan {
    #[must_use]
    pub fn for_queue<S: ToastSurface, C: Clock>(queue: &NotificationQueue<S, C>) -> Self {
        Self {
            timeout_ms: queue.time_until_deadline().map(timeout_ms),
            frame: queue.wants_frame(),
        }
    }

    /// True when no callback needs to be scheduled.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timeout_ms.is_none() && !self.frame
    }
}
