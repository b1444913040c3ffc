//! Glyphs used by the Tasks syntax, and the semantic role each one carries.
//!
//! Every component looks glyphs up here so the selector, the locator and the
//! transformer can never disagree on what a marker looks like.
use serde::Deserialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Delimiter wrapped around a highlighted date, on both sides.
pub const HIGHLIGHT_DELIMITER: &str = "==";

/// Priority of a task. `Normal` is the absence of any priority glyph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Lowest,
    Low,
    Normal,
    Medium,
    High,
    Highest,
}

impl Priority {
    #[must_use]
    pub const fn glyph(self) -> Option<&'static str> {
        match self {
            Self::Lowest => Some("⏬"),
            Self::Low => Some("🔽"),
            Self::Normal => None,
            Self::Medium => Some("🔼"),
            Self::High => Some("⏫"),
            Self::Highest => Some("🔺"),
        }
    }

    /// Every glyph that marks a non-normal priority.
    pub fn glyphs() -> impl Iterator<Item = &'static str> {
        Self::iter().filter_map(Self::glyph)
    }
}

/// Attribute glyphs a task line may carry, used by the exact-match filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    Recurring,
    DueDate,
    ScheduledDate,
    StartDate,
}

impl Attribute {
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Recurring => "🔁",
            Self::DueDate => "📅",
            Self::ScheduledDate => "⏳",
            Self::StartDate => "🛫",
        }
    }
}

/// Which glyph-prefixed dates an operation looks at.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DateRole {
    /// Any date-shaped text, with or without a glyph.
    #[default]
    Both,
    Due,
    Scheduled,
}

impl DateRole {
    /// Glyph placed in front of a date of this role. `Both` has none.
    #[must_use]
    pub const fn glyph(self) -> Option<&'static str> {
        match self {
            Self::Both => None,
            Self::Due => Some("📅"),
            Self::Scheduled => Some("⏳"),
        }
    }

    /// Roles that own a glyph, in lookup order.
    pub fn glyph_roles() -> impl Iterator<Item = Self> {
        Self::iter().filter(|r| r.glyph().is_some())
    }

    /// Reverse lookup from a glyph found in front of a date.
    #[must_use]
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        Self::glyph_roles().find(|r| r.glyph() == Some(glyph))
    }
}
