use color_eyre::Result;
use tracing::{debug, info, warn};

use date::ReferenceDate;
use filter::{InvalidFilterPolicy, TaskFilter};
use markers::DateRole;
use report::{ModifiedDocument, RunReport};
use transformer::{DateTransformer, Operation};
use vault::{Vault, VaultNode};
use walker::{Exclusions, resolve_folder, walk};

pub mod config;
pub mod date;
pub mod filter;
pub mod locator;
pub mod logging;
pub mod markers;
pub mod parser;
pub mod report;
pub mod transformer;
pub mod vault;
pub mod walker;

// Re-export logging functions for easier access
pub use logging::init as init_logging;

/// Documents an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The active document, if there is one.
    Document(Option<String>),
    /// Every Markdown document below a folder.
    Folder(String),
}

/// Runs date operations against a [`Vault`].
pub struct DateUpdater<V: Vault> {
    vault: V,
    invalid_filter_policy: InvalidFilterPolicy,
}

impl<V: Vault> DateUpdater<V> {
    pub fn new(vault: V) -> Self {
        Self {
            vault,
            invalid_filter_policy: InvalidFilterPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_invalid_filter_policy(mut self, policy: InvalidFilterPolicy) -> Self {
        self.invalid_filter_policy = policy;
        self
    }

    pub const fn vault(&self) -> &V {
        &self.vault
    }

    /// Highlights dates strictly before `reference` (today by default).
    ///
    /// # Errors
    ///
    /// Will return an error if the folder can't be resolved, if a document
    /// can't be read or written, or if the filter is rejected.
    pub fn highlight_past_dates(
        &mut self,
        scope: &Scope,
        excluded: &[String],
        reference: Option<ReferenceDate>,
        role: DateRole,
        filter: Option<&TaskFilter>,
    ) -> Result<RunReport> {
        self.run(
            Operation::Highlight,
            scope,
            excluded,
            reference.unwrap_or_default(),
            role,
            filter.cloned().unwrap_or_default(),
        )
    }

    /// Removes the highlight of every date of `role` on task lines, whatever
    /// the date. `reference` is only recorded in the report.
    ///
    /// # Errors
    ///
    /// Will return an error if the folder can't be resolved or if a document
    /// can't be read or written.
    pub fn unhighlight_past_dates(
        &mut self,
        scope: &Scope,
        excluded: &[String],
        reference: Option<ReferenceDate>,
        role: DateRole,
    ) -> Result<RunReport> {
        self.run(
            Operation::Unhighlight,
            scope,
            excluded,
            reference.unwrap_or_default(),
            role,
            TaskFilter::any_task(),
        )
    }

    /// Replaces dates on or before `reference` (today by default) with it.
    ///
    /// # Errors
    ///
    /// Will return an error if the folder can't be resolved, if a document
    /// can't be read or written, or if the filter is rejected.
    pub fn update_past_dates_to_reference(
        &mut self,
        scope: &Scope,
        excluded: &[String],
        reference: Option<ReferenceDate>,
        role: DateRole,
        filter: Option<&TaskFilter>,
    ) -> Result<RunReport> {
        self.run(
            Operation::Update,
            scope,
            excluded,
            reference.unwrap_or_default(),
            role,
            filter.cloned().unwrap_or_default(),
        )
    }

    /// Highlights past dates of any role in a folder, with no exclusion.
    ///
    /// # Errors
    ///
    /// See [`Self::highlight_past_dates`].
    pub fn highlight_past_dates_in_folder(&mut self, folder: &str) -> Result<RunReport> {
        self.highlight_past_dates(
            &Scope::Folder(folder.to_owned()),
            &[],
            None,
            DateRole::Both,
            None,
        )
    }

    /// Rolls dates of any role in a folder forward to `reference`, with no exclusion.
    ///
    /// # Errors
    ///
    /// See [`Self::update_past_dates_to_reference`].
    pub fn update_past_dates_in_folder(
        &mut self,
        folder: &str,
        reference: Option<ReferenceDate>,
    ) -> Result<RunReport> {
        self.update_past_dates_to_reference(
            &Scope::Folder(folder.to_owned()),
            &[],
            reference,
            DateRole::Both,
            None,
        )
    }

    fn run(
        &mut self,
        operation: Operation,
        scope: &Scope,
        excluded: &[String],
        reference: ReferenceDate,
        role: DateRole,
        filter: TaskFilter,
    ) -> Result<RunReport> {
        let mut report = RunReport::new(operation, role, reference);

        if let Err(e) = filter.validate() {
            match self.invalid_filter_policy {
                InvalidFilterPolicy::Reject => return Err(e.into()),
                InvalidFilterPolicy::Ignore => {
                    warn!("{e}, nothing was changed");
                    report.filter_rejected = true;
                    return Ok(report);
                }
            }
        }

        let transformer = DateTransformer::new(operation, role, reference, filter)?;
        info!("Running {operation} on {role} dates against {reference} in {scope:?}");

        match scope {
            Scope::Document(None) => debug!("No active document, nothing to do"),
            Scope::Document(Some(path)) => {
                Self::process_document(&mut self.vault, &transformer, path, &mut report)?;
            }
            Scope::Folder(folder) => {
                let tree = resolve_folder(&self.vault, folder)?;
                let exclusions = Exclusions::new(excluded);
                let vault = &mut self.vault;
                walk(&tree, &exclusions, &mut |document: &VaultNode| {
                    Self::process_document(vault, &transformer, document.path(), &mut report)
                })?;
            }
        }

        info!(
            "{operation}: {} document(s) scanned, {} rewritten, {} line(s) changed",
            report.scanned.len(),
            report.modified.len(),
            report.changed_lines()
        );
        Ok(report)
    }

    fn process_document(
        vault: &mut V,
        transformer: &DateTransformer,
        path: &str,
        report: &mut RunReport,
    ) -> Result<()> {
        debug!("Processing {path:?}");
        let content = vault.read(path)?;
        report.scanned.push(path.to_owned());

        let transformed = transformer.transform_content(&content);
        if transformed.content == content {
            return Ok(());
        }

        vault.write(path, &transformed.content)?;
        info!(
            "Wrote {} changed line(s) to {path:?}",
            transformed.changed_lines
        );
        report.modified.push(ModifiedDocument {
            path: path.to_owned(),
            changed_lines: transformed.changed_lines,
        });
        Ok(())
    }
}
