#![forbid(unsafe_code)]

//! Browser host for toastline.
//!
//! This crate binds [`toastline::NotificationQueue`] to the DOM:
//!
//! - `DomSurface` mounts one `div.toast-message` per toast on
//!   `document.body`, toggles the `show` class and reports
//!   `transitionend` back to the queue.
//! - `LiveRegion` mirrors each message into a visually hidden
//!   `aria-live` element.
//! - `WebToaster` is the `wasm-bindgen` export that JavaScript calls.
//!
//! The browser-facing types are only compiled on `wasm32`. Markup
//! constants, config parsing and the wake-up plan live in [`host_core`]
//! and are available (and tested) on every target.

pub mod error;
pub mod host_core;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use error::DomError;
pub use host_core::WakePlan;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomSurface, LiveRegion, document};
#[cfg(target_arch = "wasm32")]
pub use wasm::WebToaster;
