use std::collections::BTreeSet;

use serde::Deserialize;
use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
    markers::{Attribute, Priority},
    parser::parser_state::task_state,
};

/// Completion state read from a task line's box marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Unfinished,
    Completed,
}

/// Which completion states a filter accepts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Unfinished,
    Completed,
    All,
}

impl TaskStatus {
    #[must_use]
    pub const fn accepts(self, state: TaskState) -> bool {
        matches!(
            (self, state),
            (Self::All, _)
                | (Self::Unfinished, TaskState::Unfinished)
                | (Self::Completed, TaskState::Completed)
        )
    }
}

/// Presence of each attribute glyph on a line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct AttributeFlags {
    #[serde(default)]
    pub has_recurring: bool,
    #[serde(default)]
    pub has_due_date: bool,
    #[serde(default)]
    pub has_scheduled_date: bool,
    #[serde(default)]
    pub has_start_date: bool,
}

impl AttributeFlags {
    /// Reads the flags of a line from glyph presence.
    #[must_use]
    pub fn of_line(line: &str) -> Self {
        let has = |attribute: Attribute| line.contains(attribute.glyph());
        Self {
            has_recurring: has(Attribute::Recurring),
            has_due_date: has(Attribute::DueDate),
            has_scheduled_date: has(Attribute::ScheduledDate),
            has_start_date: has(Attribute::StartDate),
        }
    }

    /// Whether at least one flag is set, which turns exact matching on.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.has_recurring || self.has_due_date || self.has_scheduled_date || self.has_start_date
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error(
        "Conflicting priority filter {0:?}: select a single priority glyph, or `normal` alone"
    )]
    ConflictingPriorities(Vec<Priority>),
}

/// What a batch does when its filter asks for conflicting priorities.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum InvalidFilterPolicy {
    /// Fail with [`FilterError::ConflictingPriorities`].
    #[default]
    Reject,
    /// Touch nothing and report success, like earlier plugin releases did.
    Ignore,
}

/// Selects the task lines an operation applies to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: TaskStatus,
    /// Empty means every priority passes.
    pub priorities: BTreeSet<Priority>,
    pub attributes: AttributeFlags,
}

impl TaskFilter {
    /// A filter selecting every task line, whatever its state.
    #[must_use]
    pub fn any_task() -> Self {
        Self {
            status: TaskStatus::All,
            ..Default::default()
        }
    }

    /// Checks the priority selection.
    ///
    /// # Errors
    ///
    /// Fails when more than one glyph priority is requested, or when `normal`
    /// is requested together with a glyph priority.
    pub fn validate(&self) -> Result<(), FilterError> {
        let glyph_priorities = self
            .priorities
            .iter()
            .filter(|p| p.glyph().is_some())
            .count();
        let with_normal = self.priorities.contains(&Priority::Normal);
        if glyph_priorities > 1 || (with_normal && glyph_priorities > 0) {
            return Err(FilterError::ConflictingPriorities(
                self.priorities.iter().copied().collect(),
            ));
        }
        Ok(())
    }

    /// Whether `line` is a task line this filter keeps.
    #[must_use]
    pub fn selects(&self, line: &str) -> bool {
        task_state(line).is_some_and(|state| self.status.accepts(state))
            && self.priority_matches(line)
            && self.attributes_match(line)
    }

    fn priority_matches(&self, line: &str) -> bool {
        if self.priorities.is_empty() {
            return true;
        }
        self.priorities.iter().any(|priority| match priority.glyph() {
            Some(glyph) => line.contains(glyph),
            None => !Priority::glyphs().any(|g| line.contains(g)),
        })
    }

    fn attributes_match(&self, line: &str) -> bool {
        !self.attributes.any() || AttributeFlags::of_line(line) == self.attributes
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{AttributeFlags, FilterError, TaskFilter, TaskStatus};
    use crate::markers::Priority;

    fn with_priorities(priorities: &[Priority]) -> TaskFilter {
        TaskFilter {
            priorities: priorities.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn status_filter() {
        let unfinished = "- [ ] Task 📅 2020-01-15";
        let completed = "- [x] Task 📅 2020-01-15";
        let filter = TaskFilter::default();
        assert!(filter.selects(unfinished));
        assert!(!filter.selects(completed));

        let filter = TaskFilter {
            status: TaskStatus::Completed,
            ..Default::default()
        };
        assert!(!filter.selects(unfinished));
        assert!(filter.selects(completed));

        let filter = TaskFilter::any_task();
        assert!(filter.selects(unfinished));
        assert!(filter.selects(completed));
        assert!(!filter.selects("Some text 📅 2020-01-15"));
    }

    #[test]
    fn normal_priority_means_no_glyph() {
        let filter = with_priorities(&[Priority::Normal]);
        assert!(filter.selects("- [ ] Normal task 📅 2020-01-01"));
        assert!(!filter.selects("- [ ] High priority task ⏫ 📅 2020-01-02"));
        assert!(!filter.selects("- [ ] Lowest ⏬"));
    }

    #[test]
    fn glyph_priority_matches_anywhere_in_line() {
        let filter = with_priorities(&[Priority::High]);
        assert!(filter.selects("- [ ] High priority task ⏫ 📅 2020-01-02"));
        assert!(filter.selects("- [ ] ⏫ first"));
        assert!(!filter.selects("- [ ] Low priority task 🔽 📅 2020-01-03"));
        assert!(!filter.selects("- [ ] Normal task 📅 2020-01-01"));
    }

    #[test]
    fn empty_priorities_accept_everything() {
        let filter = TaskFilter::default();
        assert!(filter.selects("- [ ] Normal task"));
        assert!(filter.selects("- [ ] Highest 🔺"));
    }

    #[test]
    fn conflicting_priorities_are_rejected() {
        assert_eq!(
            with_priorities(&[Priority::Normal, Priority::High]).validate(),
            Err(FilterError::ConflictingPriorities(vec![
                Priority::Normal,
                Priority::High
            ]))
        );
        assert!(
            with_priorities(&[Priority::High, Priority::Low])
                .validate()
                .is_err()
        );
        assert!(with_priorities(&[Priority::Normal]).validate().is_ok());
        assert!(with_priorities(&[Priority::Highest]).validate().is_ok());
        assert!(TaskFilter::default().validate().is_ok());
    }

    #[test]
    fn attribute_flags_from_glyphs() {
        let flags = AttributeFlags::of_line("- [ ] Task 🔁 every day 🛫 2020-01-01 📅 2020-01-15");
        assert_eq!(
            flags,
            AttributeFlags {
                has_recurring: true,
                has_due_date: true,
                has_scheduled_date: false,
                has_start_date: true,
            }
        );
        assert!(!AttributeFlags::default().any());
    }

    #[test]
    fn attribute_filter_requires_exact_match() {
        let filter = TaskFilter {
            attributes: AttributeFlags {
                has_due_date: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(filter.selects("- [ ] Due only 📅 2020-01-15"));
        // superset
        assert!(!filter.selects("- [ ] Due and scheduled 📅 2020-01-15 ⏳ 2020-01-16"));
        // subset
        assert!(!filter.selects("- [ ] No dates"));
        assert!(!filter.selects("- [ ] Recurring 🔁 every week 📅 2020-01-15"));
    }

    #[test]
    fn all_false_attributes_do_not_constrain() {
        let filter = TaskFilter::default();
        assert!(filter.selects("- [ ] Recurring 🔁 every week 📅 2020-01-15 ⏳ 2020-01-10"));
        assert!(filter.selects("- [ ] Nothing"));
    }
}
