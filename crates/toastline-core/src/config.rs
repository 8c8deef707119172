#![forbid(unsafe_code)]

//! Timing configuration for the notification queue.
//!
//! [`QueueConfig`] carries the three timing parameters of the display
//! cycle. It can be built in code or, with the `config` feature, loaded
//! from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # toastline.toml
//! toast_duration_ms = 3000
//! queue_delay_ms = 250
//! settle_timeout_ms = 1000   # 0 disables the settle fallback
//! ```
//!
//! ```rust,ignore
//! let config = QueueConfig::from_toml_file("toastline.toml")?;
//! let config = QueueConfig::from_json_str(r#"{"toast_duration_ms": 2800}"#)?;
//! ```
//!
//! Missing keys take their defaults.

use core::time::Duration;
use std::fmt;
#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default time a toast stays visible, from mount to dismissal.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);
/// Default gap between one toast's detachment and the next mount.
pub const DEFAULT_QUEUE_DELAY: Duration = Duration::from_millis(250);
/// Default bound on how long the exit animation may take to report completion.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Upper bound accepted by [`QueueConfig::validate`] for any single duration.
const MAX_DURATION: Duration = Duration::from_secs(60 * 60);

/// Timing parameters of the display cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(from = "RawConfig", into = "RawConfig"))]
pub struct QueueConfig {
    /// How long a toast is held visible, measured from mount.
    pub toast_duration: Duration,
    /// Cooldown between detachment and the next mount.
    pub queue_delay: Duration,
    /// Fallback bound on the exit animation. `None` waits for the
    /// completion signal forever.
    pub settle_timeout: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            toast_duration: DEFAULT_TOAST_DURATION,
            queue_delay: DEFAULT_QUEUE_DELAY,
            settle_timeout: Some(DEFAULT_SETTLE_TIMEOUT),
        }
    }
}

impl QueueConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long each toast is held visible.
    #[must_use]
    pub fn toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    /// Set the cooldown between consecutive toasts.
    #[must_use]
    pub fn queue_delay(mut self, delay: Duration) -> Self {
        self.queue_delay = delay;
        self
    }

    /// Set (or disable with `None`) the settle fallback.
    #[must_use]
    pub fn settle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.toast_duration.is_zero() {
            errors.push("toast_duration must be > 0".into());
        }
        if self.toast_duration > MAX_DURATION {
            errors.push(format!(
                "toast_duration must be <= {}ms, got {}ms",
                MAX_DURATION.as_millis(),
                self.toast_duration.as_millis()
            ));
        }
        if self.queue_delay > MAX_DURATION {
            errors.push(format!(
                "queue_delay must be <= {}ms, got {}ms",
                MAX_DURATION.as_millis(),
                self.queue_delay.as_millis()
            ));
        }
        if let Some(timeout) = self.settle_timeout.filter(|t| *t > MAX_DURATION) {
            errors.push(format!(
                "settle_timeout must be <= {}ms, got {}ms",
                MAX_DURATION.as_millis(),
                timeout.as_millis()
            ));
        }

        errors
    }

    #[cfg_attr(not(feature = "config"), allow(dead_code))]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)
    }
}

/// On-disk shape: integer milliseconds, `0` meaning "no settle fallback".
#[cfg(feature = "config")]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
struct RawConfig {
    toast_duration_ms: u64,
    queue_delay_ms: u64,
    settle_timeout_ms: u64,
}

#[cfg(feature = "config")]
impl Default for RawConfig {
    fn default() -> Self {
        QueueConfig::default().into()
    }
}

#[cfg(feature = "config")]
impl From<RawConfig> for QueueConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            toast_duration: Duration::from_millis(raw.toast_duration_ms),
            queue_delay: Duration::from_millis(raw.queue_delay_ms),
            settle_timeout: (raw.settle_timeout_ms > 0)
                .then(|| Duration::from_millis(raw.settle_timeout_ms)),
        }
    }
}

#[cfg(feature = "config")]
impl From<QueueConfig> for RawConfig {
    fn from(config: QueueConfig) -> Self {
        Self {
            toast_duration_ms: millis(config.toast_duration),
            queue_delay_ms: millis(config.queue_delay),
            settle_timeout_ms: config.settle_timeout.map_or(0, millis),
        }
    }
}

#[cfg(feature = "config")]
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Error loading a [`QueueConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io(std::io::Error),
    /// TOML parse failure.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization failure.
    #[cfg(feature = "config")]
    TomlSerialize(toml::ser::Error),
    /// JSON parse failure.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Parsed values failed [`QueueConfig::validate`].
    Invalid(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "config TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSerialize(e) => write!(f, "config TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "config JSON parse error: {e}"),
            Self::Invalid(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSerialize(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}
