use crate::{date::ReferenceDate, markers::DateRole, transformer::Operation};

/// A document a batch rewrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedDocument {
    pub path: String,
    pub changed_lines: usize,
}

/// Outcome of one batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub operation: Operation,
    pub role: DateRole,
    pub reference: ReferenceDate,
    /// Documents read, in traversal order.
    pub scanned: Vec<String>,
    /// Documents written back, in traversal order.
    pub modified: Vec<ModifiedDocument>,
    /// The filter asked for conflicting priorities and the batch did nothing.
    pub filter_rejected: bool,
}

impl RunReport {
    #[must_use]
    pub const fn new(operation: Operation, role: DateRole, reference: ReferenceDate) -> Self {
        Self {
            operation,
            role,
            reference,
            scanned: vec![],
            modified: vec![],
            filter_rejected: false,
        }
    }

    #[must_use]
    pub fn changed_lines(&self) -> usize {
        self.modified.iter().map(|m| m.changed_lines).sum()
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.modified.is_empty()
    }
}
