#![forbid(unsafe_code)]

//! Core: data model, time, and configuration for toastline.
//!
//! # Role in toastline
//! `toastline-core` holds everything the notification queue needs that is
//! not the state machine itself: the [`QueueItem`] a caller enqueues, the
//! [`Category`] that drives styling and assistive-technology urgency, the
//! monotonic [`Clock`] all deadlines are measured against, and the
//! [`QueueConfig`] timing parameters.
//!
//! # How it fits in the system
//! The engine crate (`toastline`) consumes these types and drives the
//! display cycle; hosts (`toastline-web`, or a test harness) provide a
//! clock and deliver signals. Nothing here touches a DOM or a timer.

pub mod category;
pub mod clock;
pub mod config;
pub mod item;
pub mod logging;

pub use category::{Category, Politeness};
pub use clock::{Clock, DeterministicClock, SystemClock};
pub use config::{ConfigError, QueueConfig};
pub use item::{ItemId, QueueItem};
