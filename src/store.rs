//! The file store: a vault directory that resolves link paths, reads bytes,
//! and renames files.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Error;
use crate::resolver;

/// Operations the transaction needs from whatever holds the attachments.
/// Paths are vault-relative and `/`-separated.
pub trait FileStore {
    /// True if anything exists at `path`, indexed or not.
    fn contains(&self, path: &str) -> bool;

    /// Read the full contents of a file.
    ///
    /// # Errors
    ///
    /// Returns the store's I/O error if the bytes cannot be read.
    fn read_bytes(&self, path: &str) -> std::io::Result<Vec<u8>>;

    /// Move a file to a new path. Must refuse to overwrite an existing file.
    ///
    /// # Errors
    ///
    /// Returns `Error::DestinationExists` if `to` is taken, `Error::NotInVault`
    /// if `from` is unknown, or `Error::Io` if the move fails.
    fn rename(&mut self, from: &str, to: &str) -> Result<(), Error>;

    /// Map a normalized link target, as written in the document at
    /// `relative_to`, to the path of a regular file. `None` if nothing matches.
    fn resolve_link_path(&self, link: &str, relative_to: &str) -> Option<String>;
}

/// A vault directory on disk with an in-memory index of its files.
///
/// The index holds every regular file under the root, skipping hidden
/// entries (`.obsidian/`, `.git/`, `.trash/`, dotfiles). It is built once
/// when the vault is opened and kept current across renames.
pub struct VaultStore {
    /// Sorted vault-relative paths of all indexed files.
    index: Vec<String>,
    /// Vault root directory.
    root: PathBuf,
}

impl VaultStore {
    /// Open a vault rooted at `root` and index its files.
    ///
    /// # Errors
    ///
    /// Returns `Error::VaultNotFound` if `root` is not a directory.
    pub fn open(root: &Path) -> Result<Self, Error> {
        if !root.is_dir() {
            return Err(Error::VaultNotFound { path: root.to_path_buf() });
        }

        let mut index: Vec<String> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| return e.depth() == 0 || !is_hidden(e))
            .filter_map(Result::ok)
            .filter(|e| return e.file_type().is_file())
            .filter_map(|e| return vault_relative(root, e.path()))
            .collect();
        index.sort();

        tracing::debug!(root = %root.display(), files = index.len(), "indexed vault");
        return Ok(Self { index, root: root.to_path_buf() });
    }

    /// Number of indexed files.
    pub fn file_count(&self) -> usize {
        return self.index.len();
    }

    /// Absolute filesystem path for a vault-relative path.
    pub fn path_on_disk(&self, path: &str) -> PathBuf {
        return self.root.join(path);
    }
}

impl FileStore for VaultStore {
    fn contains(&self, path: &str) -> bool {
        return std::fs::symlink_metadata(self.path_on_disk(path)).is_ok();
    }

    fn read_bytes(&self, path: &str) -> std::io::Result<Vec<u8>> {
        return std::fs::read(self.path_on_disk(path));
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), Error> {
        let Ok(slot) = self.index.binary_search_by(|p| return p.as_str().cmp(from)) else {
            return Err(Error::NotInVault { path: from.to_string() });
        };
        // std::fs::rename silently replaces an existing file on Unix.
        if self.contains(to) {
            return Err(Error::DestinationExists { path: to.to_string() });
        }

        std::fs::rename(self.path_on_disk(from), self.path_on_disk(to))?;

        self.index.remove(slot);
        let insert_at = self.index.binary_search_by(|p| return p.as_str().cmp(to)).unwrap_or_else(|i| return i);
        self.index.insert(insert_at, to.to_string());
        return Ok(());
    }

    fn resolve_link_path(&self, link: &str, relative_to: &str) -> Option<String> {
        return resolver::resolve_in_index(link, relative_to, &self.index).map(str::to_string);
    }
}

/// Dot-prefixed names are app state or trash, not vault content.
fn is_hidden(entry: &DirEntry) -> bool {
    return entry.file_name().to_str().is_some_and(|name| return name.starts_with('.'));
}

/// Vault-relative `/`-joined form of a path under `root`.
/// Returns `None` for paths outside the root or with non-UTF-8 names.
pub fn vault_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Option<Vec<&str>> = relative
        .components()
        .map(|c| {
            return match c {
                std::path::Component::Normal(s) => s.to_str(),
                _ => None,
            };
        })
        .collect();
    let segments = segments?;
    if segments.is_empty() {
        return None;
    }
    return Some(segments.join("/"));
}

#[cfg(test)]
pub mod memory {
    //! In-memory store for exercising the transaction without a filesystem.

    use std::collections::{BTreeMap, BTreeSet};

    use super::FileStore;
    use crate::error::Error;
    use crate::resolver;

    /// Files held in a map, with switches to inject failures.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        /// Paths whose reads fail.
        pub fail_reads: BTreeSet<String>,
        /// Paths whose renames fail.
        pub fail_renames: BTreeSet<String>,
        /// Vault-relative path to contents.
        pub files: BTreeMap<String, Vec<u8>>,
        /// Every rename request, in order, successful or not.
        pub rename_calls: Vec<(String, String)>,
        /// Number of reads served.
        pub reads: std::cell::Cell<usize>,
    }

    impl MemoryStore {
        /// Store holding the given files.
        pub fn with_files(files: &[(&str, &[u8])]) -> Self {
            let mut store = Self::default();
            for (path, bytes) in files {
                store.files.insert((*path).to_string(), bytes.to_vec());
            }
            return store;
        }

        /// Sorted file paths.
        pub fn paths(&self) -> Vec<String> {
            return self.files.keys().cloned().collect();
        }
    }

    impl FileStore for MemoryStore {
        fn contains(&self, path: &str) -> bool {
            return self.files.contains_key(path);
        }

        fn read_bytes(&self, path: &str) -> std::io::Result<Vec<u8>> {
            self.reads.set(self.reads.get().saturating_add(1));
            if self.fail_reads.contains(path) {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read refused"));
            }
            return self.files.get(path).cloned().ok_or_else(|| return std::io::ErrorKind::NotFound.into());
        }

        fn rename(&mut self, from: &str, to: &str) -> Result<(), Error> {
            self.rename_calls.push((from.to_string(), to.to_string()));
            if self.fail_renames.contains(from) {
                return Err(Error::Io(std::io::ErrorKind::PermissionDenied.into()));
            }
            if self.files.contains_key(to) {
                return Err(Error::DestinationExists { path: to.to_string() });
            }
            let bytes = self.files.remove(from).ok_or_else(|| return Error::NotInVault { path: from.to_string() })?;
            self.files.insert(to.to_string(), bytes);
            return Ok(());
        }

        fn resolve_link_path(&self, link: &str, relative_to: &str) -> Option<String> {
            let index = self.paths();
            return resolver::resolve_in_index(link, relative_to, &index).map(str::to_string);
        }
    }
}
