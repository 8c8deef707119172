#![forbid(unsafe_code)]

//! Logging facade.
//!
//! Engine and host crates log through `tracing` under the targets below.
//! With `tracing-json` a JSON subscriber can be installed for production
//! log shipping:
//!
//! ```rust,ignore
//! toastline_core::logging::init_json_subscriber("toastline=debug")?;
//! ```
//!
//! `RUST_LOG`, when set, overrides the filter passed in.

/// Log target used by the queue engine.
pub const QUEUE_TARGET: &str = "toastline.queue";
/// Log target used by browser hosts.
pub const WEB_TARGET: &str = "toastline.web";

/// Install a global JSON-formatting subscriber.
///
/// Fails when a global subscriber is already installed or the filter
/// directive does not parse.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
}
