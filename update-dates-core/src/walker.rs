use color_eyre::{Result, eyre::bail};
use tracing::debug;

use crate::vault::{Vault, VaultNode, normalize_path};

/// Extension of the documents handed over to the transformer.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Folders and documents a walk must not enter.
///
/// An entry excludes a node when it equals the node's path, when the node's
/// path starts with the entry followed by `/`, or when it equals the node's
/// bare name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Exclusions(Vec<String>);

impl Exclusions {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|e| normalize_path(e.as_ref()).to_owned())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn excludes(&self, node: &VaultNode) -> bool {
        let path = node.path();
        self.0.iter().any(|excluded| {
            path == excluded
                || path
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
                || node.name() == excluded
        })
    }
}

/// Resolves `path` to a folder snapshot.
///
/// # Errors
///
/// Will return an error if nothing exists at `path`, if it is not a folder or
/// if it can't be listed.
pub fn resolve_folder<V: Vault + ?Sized>(vault: &V, path: &str) -> Result<VaultNode> {
    match vault.lookup(path)? {
        Some(node) if node.is_container() => Ok(node),
        Some(_) => bail!("Not a folder: {path:?}"),
        None => bail!("Folder not found: {path:?}"),
    }
}

/// Calls `per_document` on every Markdown document under `root`, depth-first,
/// skipping excluded subtrees.
///
/// # Errors
///
/// Stops at and returns the first error of `per_document`.
pub fn walk<F>(root: &VaultNode, excluded: &Exclusions, per_document: &mut F) -> Result<()>
where
    F: FnMut(&VaultNode) -> Result<()>,
{
    for child in root.children() {
        if excluded.excludes(child) {
            debug!("Ignoring {:?} (excluded)", child.path());
            continue;
        }
        if child.is_container() {
            walk(child, excluded, per_document)?;
        } else if child.has_extension(DOCUMENT_EXTENSION) {
            per_document(child)?;
        } else {
            debug!("Ignoring {:?} (not a .{DOCUMENT_EXTENSION} file)", child.path());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use color_eyre::{Result, eyre::bail};
    use pretty_assertions::assert_eq;

    use super::{Exclusions, resolve_folder, walk};
    use crate::vault::{MemoryVault, Vault, VaultNode};

    fn vault() -> MemoryVault {
        MemoryVault::new()
            .with_document("tasks/today.md", "")
            .with_document("tasks/archive/2019.md", "")
            .with_document("tasks/archive-notes.md", "")
            .with_document("tasks/projects/archive/old.md", "")
            .with_document("tasks/projects/plan.md", "")
            .with_document("tasks/image.png", "")
            .with_document("tasks/README.MD", "")
            .with_document("other/note.md", "")
    }

    fn visited(root: &str, excluded: &[&str]) -> Vec<String> {
        let vault = vault();
        let tree = resolve_folder(&vault, root).unwrap();
        let mut res = vec![];
        walk(&tree, &Exclusions::new(excluded), &mut |doc: &VaultNode| {
            res.push(doc.path().to_owned());
            Ok(())
        })
        .unwrap();
        res
    }

    #[test]
    fn walks_markdown_documents_depth_first() {
        assert_eq!(
            visited("tasks", &[]),
            vec![
                "tasks/README.MD",
                "tasks/archive/2019.md",
                "tasks/archive-notes.md",
                "tasks/projects/archive/old.md",
                "tasks/projects/plan.md",
                "tasks/today.md",
            ]
        );
    }

    #[test]
    fn exact_path_exclusion() {
        assert_eq!(
            visited("tasks", &["tasks/projects"]),
            vec![
                "tasks/README.MD",
                "tasks/archive/2019.md",
                "tasks/archive-notes.md",
                "tasks/today.md",
            ]
        );
    }

    #[test]
    fn prefix_exclusion_needs_a_separator() {
        // `tasks/archive` must not swallow `tasks/archive-notes.md`
        assert_eq!(
            visited("tasks", &["tasks/archive/"]),
            vec![
                "tasks/README.MD",
                "tasks/archive-notes.md",
                "tasks/projects/archive/old.md",
                "tasks/projects/plan.md",
                "tasks/today.md",
            ]
        );
    }

    #[test]
    fn bare_name_exclusion_applies_at_any_depth() {
        assert_eq!(
            visited("tasks", &[" archive ", ""]),
            vec![
                "tasks/README.MD",
                "tasks/archive-notes.md",
                "tasks/projects/plan.md",
                "tasks/today.md",
            ]
        );
    }

    #[test]
    fn whole_vault_walk() {
        assert_eq!(
            visited("/", &["tasks"]),
            vec!["other/note.md"]
        );
    }

    #[test]
    fn missing_or_non_folder_root_is_an_error() {
        let vault = vault();
        assert!(resolve_folder(&vault, "nope").is_err());
        assert!(resolve_folder(&vault, "tasks/today.md").is_err());
    }

    struct UnlistableVault;

    impl Vault for UnlistableVault {
        fn lookup(&self, path: &str) -> Result<Option<VaultNode>> {
            bail!("Failed to list {path}: permission denied")
        }

        fn read(&self, path: &str) -> Result<String> {
            bail!("unexpected read of {path}")
        }

        fn write(&mut self, path: &str, _content: &str) -> Result<()> {
            bail!("unexpected write of {path}")
        }
    }

    #[test]
    fn unlistable_root_is_an_error() {
        let err = resolve_folder(&UnlistableVault, "tasks").unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn errors_stop_the_walk() {
        let vault = vault();
        let tree = vault.lookup("tasks").unwrap().unwrap();
        let mut seen = 0;
        let res = walk(&tree, &Exclusions::default(), &mut |doc: &VaultNode| {
            seen += 1;
            if doc.path() == "tasks/archive-notes.md" {
                bail!("boom");
            }
            Ok(())
        });
        assert!(res.is_err());
        assert_eq!(seen, 3);
    }
}
