use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDate};
use color_eyre::{Report, Result, eyre::eyre};

/// A `YYYY-MM-DD` literal as found in a document.
///
/// The locator only validates digit ranges, so `2021-02-31` is a valid literal
/// even though it is not a calendar date. Ordering is chronological on the
/// `(year, month, day)` components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateLiteral {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl DateLiteral {
    /// Reads a literal the locator already matched, so the layout is known.
    pub(crate) fn from_matched(literal: &str) -> Option<Self> {
        let mut parts = literal.splitn(3, '-');
        Some(Self {
            year: parts.next()?.parse().ok()?,
            month: parts.next()?.parse().ok()?,
            day: parts.next()?.parse().ok()?,
        })
    }
}

impl Display for DateLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Pivot date past/future comparisons are made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate(NaiveDate);

impl ReferenceDate {
    /// Local date of the invocation.
    #[must_use]
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn literal(&self) -> DateLiteral {
        DateLiteral {
            year: u16::try_from(self.0.year()).unwrap_or(u16::MAX),
            month: u8::try_from(self.0.month()).unwrap_or(u8::MAX),
            day: u8::try_from(self.0.day()).unwrap_or(u8::MAX),
        }
    }
}

impl Default for ReferenceDate {
    fn default() -> Self {
        Self::today()
    }
}

impl From<NaiveDate> for ReferenceDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for ReferenceDate {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| eyre!("Invalid reference date `{s}` (expected YYYY-MM-DD): {e}"))
    }
}

impl Display for ReferenceDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
