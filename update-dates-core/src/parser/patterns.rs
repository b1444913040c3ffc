use color_eyre::Result;
use regex::Regex;
use tracing::debug;

use crate::markers::{DateRole, HIGHLIGHT_DELIMITER};

/// `YYYY-MM-DD` with years 1900-2099. Days are checked by range only.
const DATE: &str = r"(?:19|20)[0-9]{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])";

/// Word boundary over ASCII word characters only, so letters such as `é` or
/// `会` next to a date don't hide it.
const ASCII_BOUNDARY: &str = r"(?-u:\b)";

pub(crate) const GROUP_DATE: &str = "date";
pub(crate) const GROUP_GLYPH: &str = "glyph";
pub(crate) const GROUP_HIGHLIGHTED_GLYPH: &str = "hglyph";
pub(crate) const GROUP_OPEN: &str = "open";
pub(crate) const GROUP_CLOSE: &str = "close";

/// What the date literal has to look like to be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Bare literal. Surrounding delimiters are captured so callers can tell
    /// an already highlighted date apart.
    Plain,
    /// Literal wrapped in the highlight delimiter on both sides.
    Highlighted,
}

/// Glyph alternatives for `role`: its own glyph, or every role glyph for `Both`.
fn glyph_alternatives(role: DateRole) -> String {
    match role.glyph() {
        Some(glyph) => regex::escape(glyph),
        None => DateRole::glyph_roles()
            .filter_map(DateRole::glyph)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|"),
    }
}

/// Builds the matcher for a date role and literal shape.
///
/// A role with a glyph requires `<glyph> ` right before the literal. `Both`
/// accepts the literal anywhere but still captures a role glyph when one
/// precedes it.
///
/// # Errors
///
/// Will return an error if the pattern fails to compile.
pub fn build(role: DateRole, shape: Shape) -> Result<Regex> {
    let delimiter = regex::escape(HIGHLIGHT_DELIMITER);
    let glyphs = glyph_alternatives(role);

    let prefix = match shape {
        Shape::Plain => format!("(?P<{GROUP_GLYPH}>{glyphs}) "),
        Shape::Highlighted => format!(
            "(?:{delimiter}(?P<{GROUP_HIGHLIGHTED_GLYPH}>{glyphs}){delimiter}|(?P<{GROUP_GLYPH}>{glyphs})) "
        ),
    };
    let prefix = if role.glyph().is_some() {
        prefix
    } else {
        format!("(?:{prefix})?")
    };

    let literal = match shape {
        Shape::Plain => format!(
            r"(?P<{GROUP_OPEN}>{delimiter})?{ASCII_BOUNDARY}(?P<{GROUP_DATE}>{DATE}){ASCII_BOUNDARY}(?P<{GROUP_CLOSE}>{delimiter})?"
        ),
        Shape::Highlighted => format!("{delimiter}(?P<{GROUP_DATE}>{DATE}){delimiter}"),
    };

    let pattern = format!("{prefix}{literal}");
    debug!("Built {shape:?} date pattern for role {role}: {pattern}");
    Ok(Regex::new(&pattern)?)
}

#[cfg(test)]
mod tests {
    use crate::markers::DateRole;

    use super::{GROUP_DATE, GROUP_GLYPH, GROUP_HIGHLIGHTED_GLYPH, Shape, build};

    fn dates(role: DateRole, shape: Shape, line: &str) -> Vec<String> {
        build(role, shape)
            .unwrap()
            .captures_iter(line)
            .map(|c| c[GROUP_DATE].to_owned())
            .collect()
    }

    #[test]
    fn both_matches_bare_and_prefixed_dates() {
        let line = "- [ ] Mixed dates ⏳ 2020-01-12 and also 2020-01-18 📅 2020-01-19";
        assert_eq!(
            dates(DateRole::Both, Shape::Plain, line),
            vec!["2020-01-12", "2020-01-18", "2020-01-19"]
        );
    }

    #[test]
    fn role_patterns_require_their_glyph_and_a_single_space() {
        let line = "- [ ] Task 📅 2020-01-15 ⏳ 2020-01-20 📅2020-01-21 2020-01-22";
        assert_eq!(dates(DateRole::Due, Shape::Plain, line), vec!["2020-01-15"]);
        assert_eq!(
            dates(DateRole::Scheduled, Shape::Plain, line),
            vec!["2020-01-20"]
        );
    }

    #[test]
    fn out_of_range_digits_are_not_dates() {
        let line = "1899-01-01 2100-01-01 2020-13-01 2020-00-10 2020-01-32 2020-01-00 x2020-01-01";
        assert!(dates(DateRole::Both, Shape::Plain, line).is_empty());
    }

    #[test]
    fn non_ascii_letters_do_not_hide_a_date() {
        assert_eq!(
            dates(DateRole::Both, Shape::Plain, "- [ ] 会議2020-01-15まで réunion é2020-01-16"),
            vec!["2020-01-15", "2020-01-16"]
        );
    }

    #[test]
    fn highlighted_shape_requires_both_delimiters() {
        let line = "==2020-01-10== ==2020-01-11 2020-01-12== 2020-01-13";
        assert_eq!(
            dates(DateRole::Both, Shape::Highlighted, line),
            vec!["2020-01-10"]
        );
    }

    #[test]
    fn highlighted_glyph_is_captured_separately() {
        let re = build(DateRole::Due, Shape::Highlighted).unwrap();
        let caps = re.captures("- [ ] Task ==📅== ==2020-01-15==").unwrap();
        assert_eq!(&caps[GROUP_HIGHLIGHTED_GLYPH], "📅");
        assert!(caps.name(GROUP_GLYPH).is_none());

        let caps = re.captures("- [ ] Task 📅 ==2020-01-15==").unwrap();
        assert_eq!(&caps[GROUP_GLYPH], "📅");
    }
}
