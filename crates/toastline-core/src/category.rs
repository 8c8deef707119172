#![forbid(unsafe_code)]

//! Notification categories and their assistive-technology urgency.

use std::fmt;

/// Visual and semantic category of a notification.
///
/// The category selects the styling class of the toast element and the
/// urgency with which assistive technology announces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Neutral information (default).
    #[default]
    Info,
    /// A completed action.
    Success,
    /// Something the user should look at.
    Warning,
    /// A failed action.
    Error,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 4] = [
        Category::Info,
        Category::Success,
        Category::Warning,
        Category::Error,
    ];

    /// Parse a caller-supplied label.
    ///
    /// Matching is ASCII case-insensitive and ignores surrounding
    /// whitespace. Unrecognized labels (including the empty string) fall
    /// back to [`Category::Info`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_class().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }

    /// Lowercase label, also used as the toast's styling class.
    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Announcement urgency for this category.
    ///
    /// Errors interrupt; everything else waits for the user to be idle.
    #[must_use]
    pub const fn politeness(self) -> Politeness {
        match self {
            Self::Error => Politeness::Assertive,
            Self::Info | Self::Success | Self::Warning => Politeness::Polite,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_class())
    }
}

/// Live-region politeness level (`aria-live`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Politeness {
    /// Announced when the user is idle.
    Polite,
    /// Announced immediately, interrupting current speech.
    Assertive,
}

impl Politeness {
    /// Attribute value for `aria-live`.
    #[must_use]
    pub const fn as_aria_live(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

impl fmt::Display for Politeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_aria_live())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_info() {
        assert_eq!(Category::default(), Category::Info);
    }

    #[test]
    fn from_label_known_values() {
        assert_eq!(Category::from_label("info"), Category::Info);
        assert_eq!(Category::from_label("success"), Category::Success);
        assert_eq!(Category::from_label("warning"), Category::Warning);
        assert_eq!(Category::from_label("error"), Category::Error);
    }

    #[test]
    fn from_label_is_case_insensitive_and_trims() {
        assert_eq!(Category::from_label("  ERROR "), Category::Error);
        assert_eq!(Category::from_label("Success"), Category::Success);
    }

    #[test]
    fn from_label_unrecognized_falls_back_to_info() {
        assert_eq!(Category::from_label(""), Category::Info);
        assert_eq!(Category::from_label("danger"), Category::Info);
        assert_eq!(Category::from_label("warn"), Category::Info);
    }

    #[test]
    fn class_round_trips_through_label() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.as_class()), category);
        }
    }

    #[test]
    fn only_errors_are_assertive() {
        assert_eq!(Category::Error.politeness(), Politeness::Assertive);
        assert_eq!(Category::Info.politeness(), Politeness::Polite);
        assert_eq!(Category::Success.politeness(), Politeness::Polite);
        assert_eq!(Category::Warning.politeness(), Politeness::Polite);
    }

    #[test]
    fn display_matches_attribute_values() {
        assert_eq!(Category::Warning.to_string(), "warning");
        assert_eq!(Politeness::Assertive.to_string(), "assertive");
        assert_eq!(Politeness::Polite.as_aria_live(), "polite");
    }
}
