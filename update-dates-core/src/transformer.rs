use std::borrow::Cow;

use color_eyre::Result;
use strum::Display;

use crate::{
    date::{DateLiteral, ReferenceDate},
    filter::TaskFilter,
    locator::{DateLocator, DateToken},
    markers::{DateRole, HIGHLIGHT_DELIMITER},
    parser::patterns::Shape,
};

/// Rewrite applied to each located date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    /// Wrap dates strictly before the reference date.
    Highlight,
    /// Strip the delimiters of every highlighted date.
    Unhighlight,
    /// Replace dates on or before the reference date with it.
    Update,
}

impl Operation {
    /// Shape of the literals this operation looks for.
    #[must_use]
    pub const fn shape(self) -> Shape {
        match self {
            Self::Unhighlight => Shape::Highlighted,
            Self::Highlight | Self::Update => Shape::Plain,
        }
    }

    /// Replacement for the text under `token.span`, or `None` to keep it.
    fn rewrite(self, line: &str, token: &DateToken, reference: DateLiteral) -> Option<String> {
        let before = &line[token.span.start..token.date_span.start];
        let literal = &line[token.date_span.clone()];
        let after = &line[token.date_span.end..token.span.end];
        match self {
            Self::Highlight => (!token.highlighted && token.date < reference).then(|| {
                format!("{before}{HIGHLIGHT_DELIMITER}{literal}{HIGHLIGHT_DELIMITER}{after}")
            }),
            Self::Update => (token.date <= reference).then(|| format!("{before}{reference}{after}")),
            Self::Unhighlight => Some(match token.role.and_then(DateRole::glyph) {
                Some(glyph) => format!("{glyph} {literal}"),
                None => literal.to_owned(),
            }),
        }
    }
}

/// Result of transforming a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub content: String,
    pub changed_lines: usize,
}

impl Transformed {
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changed_lines > 0
    }
}

/// Applies one operation, for one date role and reference date, to the lines
/// a [`TaskFilter`] selects.
#[derive(Debug, Clone)]
pub struct DateTransformer {
    operation: Operation,
    reference: ReferenceDate,
    filter: TaskFilter,
    locator: DateLocator,
}

impl DateTransformer {
    /// # Errors
    ///
    /// Will return an error if the date matcher can't be built.
    pub fn new(
        operation: Operation,
        role: DateRole,
        reference: ReferenceDate,
        filter: TaskFilter,
    ) -> Result<Self> {
        Ok(Self {
            operation,
            reference,
            filter,
            locator: DateLocator::new(role, operation.shape())?,
        })
    }

    /// Rewrites the dates of a single line, whether the filter selects it or not.
    #[must_use]
    pub fn transform_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let reference = self.reference.literal();
        let mut res = String::new();
        let mut cursor = 0;
        for token in self.locator.locate(line) {
            if let Some(replacement) = self.operation.rewrite(line, &token, reference) {
                res.push_str(&line[cursor..token.span.start]);
                res.push_str(&replacement);
                cursor = token.span.end;
            }
        }
        if cursor == 0 {
            return Cow::Borrowed(line);
        }
        res.push_str(&line[cursor..]);
        Cow::Owned(res)
    }

    /// Rewrites every selected line of a document, keeping line endings as they are.
    #[must_use]
    pub fn transform_content(&self, content: &str) -> Transformed {
        let mut res = String::with_capacity(content.len());
        let mut changed_lines = 0;
        for chunk in content.split_inclusive('\n') {
            let (line, ending) = split_line_ending(chunk);
            if self.filter.selects(line) {
                let new_line = self.transform_line(line);
                if new_line != line {
                    changed_lines += 1;
                }
                res.push_str(&new_line);
            } else {
                res.push_str(line);
            }
            res.push_str(ending);
        }
        Transformed {
            content: res,
            changed_lines,
        }
    }
}

fn split_line_ending(chunk: &str) -> (&str, &str) {
    let body = chunk
        .strip_suffix("\r\n")
        .or_else(|| chunk.strip_suffix('\n'))
        .unwrap_or(chunk);
    (body, &chunk[body.len()..])
}
