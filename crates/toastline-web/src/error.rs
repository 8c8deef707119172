#![forbid(unsafe_code)]

//! Browser host errors.

use std::fmt;

use toastline::ItemId;
use toastline_core::ConfigError;

/// Failure talking to the DOM or setting up the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// No global `window` (not running in a browser main thread).
    NoWindow,
    /// `window.document` is missing.
    NoDocument,
    /// `document.body` is missing.
    NoBody,
    /// A surface call named an item that is not mounted.
    NotMounted(ItemId),
    /// The host configuration did not load.
    Config(String),
    /// A JavaScript exception, stringified.
    Js(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::NoBody => write!(f, "document has no body"),
            Self::NotMounted(id) => write!(f, "toast {id} is not mounted"),
            Self::Config(msg) => write!(f, "toaster config: {msg}"),
            Self::Js(msg) => write!(f, "javascript error: {msg}"),
        }
    }
}

impl std::error::Error for DomError {}

impl From<ConfigError> for DomError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for DomError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<DomError> for wasm_bindgen::JsValue {
    fn from(err: DomError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
