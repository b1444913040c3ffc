use winnow::{
    Parser, Result,
    ascii::space0,
    combinator::{delimited, preceded},
    token::any,
};

use crate::filter::TaskState;

/// Parses the box marker of a task line, skipping indentation.
///
/// `- [ ]` is unfinished, `- [x]` and `- [X]` are completed. Other markers
/// (`- [/]`, `- [-]`, ...) are not tasks this tool acts on.
pub fn parse_task_state(input: &mut &str) -> Result<TaskState> {
    preceded(
        (space0, "- "),
        delimited(
            "[",
            any.verify_map(|c: char| match c {
                ' ' => Some(TaskState::Unfinished),
                'x' | 'X' => Some(TaskState::Completed),
                _ => None,
            }),
            "]",
        ),
    )
    .parse_next(input)
}

/// Completion state of `line`, or `None` when it is not a task line.
#[must_use]
pub fn task_state(line: &str) -> Option<TaskState> {
    let mut input = line;
    parse_task_state(&mut input).ok()
}
