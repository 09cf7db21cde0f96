//! Core domain types for attachment references, fingerprints, and rename outcomes.
use std::ops::Range;

use serde::Serialize;

/// Which link syntax produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSyntax {
    /// Bracketed embed: `![[path]]` or `![[path|alias]]`.
    Embed,
    /// Markdown image: `![alt](path)`.
    MarkdownImage,
}

/// One attachment reference found in document text by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    /// Alias (embed) or alt text (markdown image), if the link carries any.
    pub display: Option<String>,
    /// The exact substring that matched, syntax decorations included.
    pub matched_text: String,
    /// Byte range of `matched_text` in the scanned text.
    pub span: Range<usize>,
    /// Link syntax of the occurrence.
    pub syntax: LinkSyntax,
    /// The raw link-path string with alias/display text stripped.
    pub target_path: String,
}

/// A reference bound to a concrete file in the store.
///
/// All paths are vault-relative and `/`-separated. `parent` is empty for
/// files at the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttachment {
    /// Extension without the leading dot, empty when the file has none.
    pub extension: String,
    /// Current file name, extension included.
    pub name: String,
    /// Vault-relative parent directory.
    pub parent: String,
    /// Vault-relative path; this is the file's identity in the store.
    pub store_path: String,
}

/// MD5 content fingerprint: 32 hex chars, always lowercase.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentFingerprint(
    /// The hex-encoded digest string.
    pub String,
);

impl std::fmt::Display for ContentFingerprint {
    /// Write the hex digest.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.write_str(&self.0);
    }
}

/// What to do with one attachment once its fingerprint is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    /// The attachment being renamed.
    pub attachment: ResolvedAttachment,
    /// Fingerprint of the attachment's bytes.
    pub fingerprint: ContentFingerprint,
    /// `fingerprint.extension`, or the bare fingerprint without extension.
    pub new_name: String,
    /// `parent/new_name`, with no doubled or leading separators.
    pub new_path: String,
}

impl RenamePlan {
    /// True when the attachment already carries its fingerprint name.
    pub fn is_noop(&self) -> bool {
        return self.new_name == self.attachment.name;
    }
}

/// Result of processing one reference. Per-reference failures are values,
/// never errors: the transaction keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenameOutcome {
    /// The file already exists under its fingerprint name with identical
    /// bytes; the reference now points there and the source file is left alone.
    Duplicate {
        /// Name of the existing fingerprint-named file.
        new_name: String,
    },
    /// The attachment is excluded by configuration.
    Excluded,
    /// The store could not return the attachment's bytes.
    ReadFailure {
        /// Description of the I/O failure.
        reason: String,
    },
    /// The store refused the rename; the reference is left untouched.
    RenameFailed {
        /// Name the attachment would have received.
        new_name: String,
        /// Why the rename was refused.
        reason: String,
    },
    /// The attachment was renamed.
    Renamed {
        /// The attachment's new file name.
        new_name: String,
    },
    /// The attachment already carries its fingerprint name.
    Unchanged,
    /// The link target does not resolve to a file in the store.
    Unresolved,
    /// Plan-only mode: the attachment would be renamed.
    WouldRename {
        /// Name the attachment would receive.
        new_name: String,
    },
}

impl RenameOutcome {
    /// Name the document reference should be rewritten to, if any.
    pub fn rewrite_target(&self) -> Option<&str> {
        return match self {
            Self::Duplicate { new_name } | Self::Renamed { new_name } => Some(new_name.as_str()),
            Self::Excluded
            | Self::ReadFailure { .. }
            | Self::RenameFailed { .. }
            | Self::Unchanged
            | Self::Unresolved
            | Self::WouldRename { .. } => None,
        };
    }

    /// True when the link points nowhere usable.
    pub const fn is_broken(&self) -> bool {
        return matches!(self, Self::Unresolved | Self::ReadFailure { .. });
    }

    /// True when the attachment still needs a rename or a rewrite.
    pub const fn is_pending(&self) -> bool {
        return matches!(
            self,
            Self::WouldRename { .. } | Self::Duplicate { .. } | Self::RenameFailed { .. }
        );
    }
}

/// Outcome of one scanned reference, as reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceReport {
    /// The exact matched link text.
    pub matched_text: String,
    /// What happened to the reference.
    #[serde(flatten)]
    pub outcome: RenameOutcome,
    /// Link syntax of the occurrence.
    pub syntax: LinkSyntax,
    /// Vault-relative path of the resolved attachment, if it resolved.
    pub store_path: Option<String>,
    /// The raw link target.
    pub target_path: String,
}

/// Summary of one transaction over a document.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionReport {
    /// Whether the document text was written back.
    pub committed: bool,
    /// Vault-relative path of the document.
    pub document: String,
    /// One entry per scanned reference, in scan order.
    pub references: Vec<ReferenceReport>,
    /// Number of distinct files renamed in the store.
    pub renamed: usize,
}

impl TransactionReport {
    /// Number of references whose target is missing or unreadable.
    pub fn broken_count(&self) -> usize {
        return self.references.iter().filter(|r| return r.outcome.is_broken()).count();
    }

    /// Number of references whose link text was rewritten, including links
    /// redirected to an existing duplicate.
    pub fn rewritten_count(&self) -> usize {
        return self.references.iter().filter(|r| return r.outcome.rewrite_target().is_some()).count();
    }

    /// Number of references that still need work.
    pub fn pending_count(&self) -> usize {
        return self.references.iter().filter(|r| return r.outcome.is_pending()).count();
    }
}
