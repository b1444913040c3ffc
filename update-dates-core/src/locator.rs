use std::ops::Range;

use color_eyre::Result;
use regex::{Captures, Regex};

use crate::{
    date::DateLiteral,
    markers::DateRole,
    parser::patterns::{
        self, GROUP_CLOSE, GROUP_DATE, GROUP_GLYPH, GROUP_HIGHLIGHTED_GLYPH, GROUP_OPEN, Shape,
    },
};

/// A date found on a line, with everything around it the transformer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken {
    pub date: DateLiteral,
    /// Role of the glyph right before the date, if any.
    pub role: Option<DateRole>,
    /// The date literal is wrapped in highlight delimiters.
    pub highlighted: bool,
    /// Byte range of the whole match: glyph, delimiters and literal.
    pub span: Range<usize>,
    /// Byte range of the literal alone.
    pub date_span: Range<usize>,
}

/// Finds the dates of a given role on task lines.
#[derive(Debug, Clone)]
pub struct DateLocator {
    shape: Shape,
    matcher: Regex,
}

impl DateLocator {
    /// # Errors
    ///
    /// Will return an error if the underlying pattern can't be built.
    pub fn new(role: DateRole, shape: Shape) -> Result<Self> {
        Ok(Self {
            shape,
            matcher: patterns::build(role, shape)?,
        })
    }

    /// Lazily yields the dates of `line`, left to right.
    pub fn locate<'a>(&'a self, line: &'a str) -> impl Iterator<Item = DateToken> + 'a {
        self.matcher
            .captures_iter(line)
            .filter_map(move |caps| self.token(&caps))
    }

    fn token(&self, caps: &Captures<'_>) -> Option<DateToken> {
        let whole = caps.get(0)?;
        let date = caps.name(GROUP_DATE)?;
        let plain_glyph = caps.name(GROUP_GLYPH);
        let highlighted_glyph = caps.name(GROUP_HIGHLIGHTED_GLYPH);
        let role = plain_glyph
            .or(highlighted_glyph)
            .and_then(|g| DateRole::from_glyph(g.as_str()));

        let highlighted = match self.shape {
            Shape::Highlighted => true,
            Shape::Plain => caps.name(GROUP_OPEN).is_some() && caps.name(GROUP_CLOSE).is_some(),
        };

        Some(DateToken {
            date: DateLiteral::from_matched(date.as_str())?,
            role,
            highlighted,
            span: whole.range(),
            date_span: date.range(),
        })
    }
}
