use tabled::{builder::Builder, settings::Style};
use update_dates_core::{Scope, report::RunReport, transformer::Operation};

fn describe(scope: &Scope) -> String {
    match scope {
        Scope::Document(Some(path)) => format!("file: {path}"),
        Scope::Document(None) => "no file".to_owned(),
        Scope::Folder(folder) if folder.trim_matches('/').is_empty() => "folder: /".to_owned(),
        Scope::Folder(folder) => format!("folder: {folder}"),
    }
}

/// One-line summary of a finished run.
pub fn notice(scope: &Scope, report: &RunReport) -> String {
    if report.filter_rejected {
        return "Conflicting priorities selected, nothing was changed".to_owned();
    }
    let target = describe(scope);
    match report.operation {
        Operation::Highlight => {
            format!("Highlighted dates in {target} (before {})", report.reference)
        }
        Operation::Unhighlight => {
            format!("Unhighlighted dates in {target} ({} dates)", report.role)
        }
        Operation::Update => format!(
            "Updated dates in {target} to {} ({} dates)",
            report.reference, report.role
        ),
    }
}

/// Modified documents as a Markdown table.
pub fn table(report: &RunReport) -> String {
    if report.is_noop() {
        return format!("No document changed ({} scanned)", report.scanned.len());
    }
    let mut b = Builder::new();
    b.push_record(["Document".to_owned(), "Changed lines".to_owned()]);
    for document in &report.modified {
        b.push_record([document.path.clone(), document.changed_lines.to_string()]);
    }
    format!("{}", b.build().with(Style::markdown()))
}
