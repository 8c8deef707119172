#![forbid(unsafe_code)]

//! Queue items.

use std::fmt;

use crate::category::Category;

/// Identifier of an enqueued notification.
///
/// Assigned by the queue at enqueue time, strictly increasing from 1.
/// Hosts use it to correlate frame and exit-complete signals with the
/// element they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    /// Create an identifier from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One pending notification.
///
/// `message` is plain text. Surfaces must render it as text content and
/// never interpret it as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub id: ItemId,
    pub message: String,
    pub category: Category,
}

impl QueueItem {
    #[must_use]
    pub fn new(id: ItemId, message: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            message: message.into(),
            category,
        }
    }
}
