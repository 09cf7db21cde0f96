//! The document surface: where the text being rewritten comes from and goes back to.

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::store;

/// A text document the transaction reads once and writes at most once.
pub trait Document {
    /// Vault-relative path of the document, or `None` if there is no document.
    fn location(&self) -> Option<&str>;

    /// Replace the document's text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the text cannot be stored.
    fn set_text(&mut self, text: &str) -> Result<(), Error>;

    /// Current text of the document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the text cannot be read.
    fn text(&self) -> Result<String, Error>;
}

/// A markdown note on disk inside a vault.
pub struct NoteFile {
    /// Vault-relative path, `None` when the file does not exist.
    location: Option<String>,
    /// Absolute (or cwd-relative) path on disk.
    path: PathBuf,
}

impl NoteFile {
    /// Locate a note given as a path that is either absolute, relative to the
    /// vault, or relative to the current directory. A relative path is tried
    /// against the vault first.
    ///
    /// A missing file is not an error here: the note simply has no location,
    /// and the transaction reports `NoActiveDocument`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentOutsideVault` if the note exists but does not
    /// live under `vault`, or `Error::Io` if canonicalization fails.
    pub fn open(vault: &Path, note: &Path) -> Result<Self, Error> {
        let candidates = if note.is_absolute() {
            vec![note.to_path_buf()]
        } else {
            vec![vault.join(note), note.to_path_buf()]
        };
        let Some(path) = candidates.into_iter().find(|p| return p.is_file()) else {
            return Ok(Self { location: None, path: note.to_path_buf() });
        };

        let vault_abs = vault.canonicalize()?;
        let note_abs = path.canonicalize()?;
        let Some(location) = store::vault_relative(&vault_abs, &note_abs) else {
            return Err(Error::DocumentOutsideVault { path: note_abs, vault: vault_abs });
        };

        return Ok(Self { location: Some(location), path });
    }

    /// Path on disk as given.
    pub fn path(&self) -> &Path {
        return &self.path;
    }
}

impl Document for NoteFile {
    fn location(&self) -> Option<&str> {
        return self.location.as_deref();
    }

    fn set_text(&mut self, text: &str) -> Result<(), Error> {
        std::fs::write(&self.path, text)?;
        return Ok(());
    }

    fn text(&self) -> Result<String, Error> {
        return Ok(std::fs::read_to_string(&self.path)?);
    }
}
