//! Crate-level error types for hashattach diagnostics.
use std::path::PathBuf;

/// Errors that abort a whole invocation. Per-reference failures are not
/// errors; they are `RenameOutcome` values and never reach this type.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store refused to overwrite an existing file.
    #[error("destination exists: {path}")]
    DestinationExists {
        /// Vault-relative path that is already taken.
        path: String,
    },

    /// The named document lies outside the vault directory.
    #[error("document outside vault: {} (vault: {})", path.display(), vault.display())]
    DocumentOutsideVault {
        /// Path given for the document.
        path: PathBuf,
        /// Vault root directory.
        vault: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of a report failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// There is no document to operate on.
    #[error("no active document")]
    NoActiveDocument,

    /// A path inside the store is missing.
    #[error("not found in vault: {path}")]
    NotInVault {
        /// Vault-relative path that does not exist.
        path: String,
    },

    /// TOML deserialization of `.hashattach.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The vault root is missing or not a directory.
    #[error("vault not found: {}", path.display())]
    VaultNotFound {
        /// Path given as the vault root.
        path: PathBuf,
    },
}
