use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr, bail},
};
use tracing::{debug, warn};

/// Immutable snapshot of a vault entry.
///
/// Paths are relative to the vault root and use `/` as separator. The root
/// itself has an empty path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultNode {
    Folder {
        name: String,
        path: String,
        children: Vec<VaultNode>,
    },
    Document {
        name: String,
        path: String,
    },
}

impl VaultNode {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::Document { name, .. } => name,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Folder { path, .. } | Self::Document { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    #[must_use]
    pub fn children(&self) -> &[VaultNode] {
        match self {
            Self::Folder { children, .. } => children,
            Self::Document { .. } => &[],
        }
    }

    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        match self {
            Self::Folder { .. } => None,
            Self::Document { name, .. } => name.rsplit_once('.').map(|(_, ext)| ext),
        }
    }

    #[must_use]
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Host side of the engine: a tree of documents and a read/write primitive.
pub trait Vault {
    /// Snapshot of the folder or document at `path`, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Will return an error if the entry exists but can't be listed.
    fn lookup(&self, path: &str) -> Result<Option<VaultNode>>;

    /// # Errors
    ///
    /// Will return an error if the document can't be read.
    fn read(&self, path: &str) -> Result<String>;

    /// # Errors
    ///
    /// Will return an error if the document can't be written.
    fn write(&mut self, path: &str, content: &str) -> Result<()>;
}

/// Strips surrounding whitespace and slashes. `""` and `"/"` both mean the root.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.trim().trim_matches('/')
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A vault stored as a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    parse_dot_files: bool,
}

impl FsVault {
    /// # Errors
    ///
    /// Will return an error if `root` is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            bail!("Vault path is not a directory: {}", root.display());
        }
        Ok(Self {
            root,
            parse_dot_files: false,
        })
    }

    /// Also list entries whose name starts with a dot.
    #[must_use]
    pub const fn with_dot_files(mut self, parse_dot_files: bool) -> Self {
        self.parse_dot_files = parse_dot_files;
        self
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let path = normalize_path(path);
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    fn scan(&self, fs_path: &Path, path: &str) -> Result<VaultNode> {
        let mut entries = fs_path
            .read_dir()
            .wrap_err_with(|| format!("Failed to list {}", fs_path.display()))?
            .filter_map(Result::ok)
            .collect::<Vec<_>>();
        entries.sort_by_key(fs::DirEntry::file_name);

        let mut children = vec![];
        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.parse_dot_files && name.starts_with('.') {
                debug!("Ignoring {name:?} (dot file)");
                continue;
            }
            let child_path = join(path, &name);
            match entry.file_type() {
                Ok(t) if t.is_dir() => match self.scan(&entry.path(), &child_path) {
                    Ok(folder) => children.push(folder),
                    Err(e) => warn!("Skipping folder {child_path:?}: {e:#}"),
                },
                Ok(_) => children.push(VaultNode::Document {
                    name,
                    path: child_path,
                }),
                Err(e) => debug!("Ignoring {name:?} ({e})"),
            }
        }

        Ok(VaultNode::Folder {
            name: if path.is_empty() {
                self.root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            } else {
                last_segment(path).to_owned()
            },
            path: path.to_owned(),
            children,
        })
    }
}

impl Vault for FsVault {
    fn lookup(&self, path: &str) -> Result<Option<VaultNode>> {
        let path = normalize_path(path);
        let fs_path = self.full_path(path);
        if fs_path.is_dir() {
            self.scan(&fs_path, path).map(Some)
        } else if fs_path.is_file() {
            Ok(Some(VaultNode::Document {
                name: last_segment(path).to_owned(),
                path: path.to_owned(),
            }))
        } else {
            Ok(None)
        }
    }

    fn read(&self, path: &str) -> Result<String> {
        let fs_path = self.full_path(path);
        fs::read_to_string(&fs_path).wrap_err_with(|| format!("Failed to read {}", fs_path.display()))
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        let fs_path = self.full_path(path);
        fs::write(&fs_path, content).wrap_err_with(|| format!("Failed to write {}", fs_path.display()))
    }
}

/// A vault held in memory, keyed by path. Folders are implied by document paths.
///
/// Reads and writes are logged so callers can check what a batch touched.
#[derive(Debug, Default, Clone)]
pub struct MemoryVault {
    documents: BTreeMap<String, String>,
    folders: BTreeSet<String>,
    reads: RefCell<Vec<String>>,
    writes: Vec<String>,
}

impl MemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    #[must_use]
    pub fn with_folder(mut self, path: &str) -> Self {
        self.add_folder(path);
        self
    }

    pub fn insert(&mut self, path: &str, content: &str) {
        let path = normalize_path(path);
        if let Some((parent, _)) = path.rsplit_once('/') {
            self.add_folder(parent);
        }
        self.documents.insert(path.to_owned(), content.to_owned());
    }

    pub fn add_folder(&mut self, path: &str) {
        let mut current = String::new();
        for segment in normalize_path(path).split('/').filter(|s| !s.is_empty()) {
            current = join(&current, segment);
            self.folders.insert(current.clone());
        }
    }

    #[must_use]
    pub fn content(&self, path: &str) -> Option<&str> {
        self.documents.get(normalize_path(path)).map(String::as_str)
    }

    /// Paths read so far, in order.
    #[must_use]
    pub fn reads(&self) -> Vec<String> {
        self.reads.borrow().clone()
    }

    /// Paths written so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    fn is_folder(&self, path: &str) -> bool {
        path.is_empty() || self.folders.contains(path)
    }

    fn snapshot_folder(&self, path: &str) -> VaultNode {
        let direct_child = |key: &str| {
            let rest = if path.is_empty() {
                Some(key)
            } else {
                key.strip_prefix(path).and_then(|r| r.strip_prefix('/'))
            };
            rest.filter(|r| !r.is_empty() && !r.contains('/'))
                .map(|_| key.to_owned())
        };

        // name -> is_folder, sorted by path
        let mut listing = BTreeMap::new();
        for folder in self.folders.iter().filter_map(|k| direct_child(k.as_str())) {
            listing.insert(folder, true);
        }
        for document in self.documents.keys().filter_map(|k| direct_child(k.as_str())) {
            listing.entry(document).or_insert(false);
        }

        let children = listing
            .into_iter()
            .map(|(child, is_folder)| {
                if is_folder {
                    self.snapshot_folder(&child)
                } else {
                    VaultNode::Document {
                        name: last_segment(&child).to_owned(),
                        path: child,
                    }
                }
            })
            .collect();

        VaultNode::Folder {
            name: last_segment(path).to_owned(),
            path: path.to_owned(),
            children,
        }
    }
}

impl Vault for MemoryVault {
    fn lookup(&self, path: &str) -> Result<Option<VaultNode>> {
        let path = normalize_path(path);
        Ok(if self.documents.contains_key(path) {
            Some(VaultNode::Document {
                name: last_segment(path).to_owned(),
                path: path.to_owned(),
            })
        } else if self.is_folder(path) {
            Some(self.snapshot_folder(path))
        } else {
            None
        })
    }

    fn read(&self, path: &str) -> Result<String> {
        let path = normalize_path(path);
        self.reads.borrow_mut().push(path.to_owned());
        match self.documents.get(path) {
            Some(content) => Ok(content.clone()),
            None => bail!("No document at {path:?}"),
        }
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        let path = normalize_path(path);
        let Some(document) = self.documents.get_mut(path) else {
            bail!("No document at {path:?}");
        };
        content.clone_into(document);
        self.writes.push(path.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::{FsVault, MemoryVault, Vault, VaultNode};

    fn paths(node: &VaultNode) -> Vec<String> {
        let mut res = vec![node.path().to_owned()];
        for child in node.children() {
            res.extend(paths(child));
        }
        res
    }

    #[test]
    fn memory_vault_builds_sorted_snapshots() {
        let vault = MemoryVault::new()
            .with_document("tasks/b.md", "")
            .with_document("tasks/a.md", "")
            .with_document("tasks/archive/old.md", "")
            .with_document("root.md", "")
            .with_folder("empty");

        let root = vault.lookup("/").unwrap().unwrap();
        assert!(root.is_container());
        assert_eq!(
            paths(&root),
            vec![
                "",
                "empty",
                "root.md",
                "tasks",
                "tasks/a.md",
                "tasks/archive",
                "tasks/archive/old.md",
                "tasks/b.md",
            ]
        );

        let doc = vault.lookup("tasks/archive/old.md").unwrap().unwrap();
        assert!(!doc.is_container());
        assert_eq!(doc.name(), "old.md");
        assert_eq!(doc.extension(), Some("md"));
        assert!(vault.lookup("missing").unwrap().is_none());
    }

    #[test]
    fn memory_vault_logs_reads_and_writes() {
        let mut vault = MemoryVault::new().with_document("a.md", "one");
        assert_eq!(vault.read("a.md").unwrap(), "one");
        vault.write("/a.md", "two").unwrap();
        assert_eq!(vault.content("a.md"), Some("two"));
        assert_eq!(vault.reads(), vec!["a.md"]);
        assert_eq!(vault.writes(), ["a.md"]);
        assert!(vault.write("b.md", "nope").is_err());
        assert!(vault.read("b.md").is_err());
    }

    #[test]
    fn fs_vault_lists_directories_and_hides_dot_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tasks/archive")).unwrap();
        fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        fs::write(dir.path().join("tasks/today.md"), "- [ ] Task").unwrap();
        fs::write(dir.path().join("tasks/archive/old.md"), "").unwrap();
        fs::write(dir.path().join(".obsidian/app.json"), "{}").unwrap();

        let vault = FsVault::new(dir.path()).unwrap();
        let tasks = vault.lookup("tasks").unwrap().unwrap();
        assert_eq!(
            paths(&tasks),
            vec!["tasks", "tasks/archive", "tasks/archive/old.md", "tasks/today.md"]
        );
        let root = vault.lookup("").unwrap().unwrap();
        assert!(root.children().iter().all(|c| c.name() != ".obsidian"));

        let with_dots = FsVault::new(dir.path()).unwrap().with_dot_files(true);
        let root = with_dots.lookup("").unwrap().unwrap();
        assert!(root.children().iter().any(|c| c.name() == ".obsidian"));
    }

    #[test]
    fn fs_vault_unlistable_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path()).unwrap();
        assert!(vault.scan(&dir.path().join("gone"), "gone").is_err());
    }

    #[test]
    fn fs_vault_reads_and_writes_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("note.md"), "before").unwrap();
        let mut vault = FsVault::new(dir.path()).unwrap();
        assert_eq!(vault.read("note.md").unwrap(), "before");
        vault.write("note.md", "after").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("note.md")).unwrap(), "after");
        assert!(vault.read("missing.md").is_err());
    }

    #[test]
    fn fs_vault_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsVault::new(dir.path().join("nope")).is_err());
    }
}
