//! The rename-and-rewrite transaction over one document.
//!
//! Scan the text, resolve every reference against the store, then walk the
//! references in scan order: fingerprint, rename, and collect each rewrite
//! as a span edit. The new text is spliced from the original in one pass and
//! written back once, at the end, only if something changed.

use std::collections::HashMap;

use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::rename::{self, Mode};
use crate::resolver;
use crate::rewriter;
use crate::scanner;
use crate::store::FileStore;
use crate::types::{ReferenceReport, RenameOutcome, ResolvedAttachment, TransactionReport};

/// A completed store rename, kept so it can be undone if the write-back fails.
struct JournalEntry {
    /// Path before the rename.
    from: String,
    /// Path after the rename.
    to: String,
}

/// Run the transaction on `document` against `store`.
///
/// Per-reference problems (unresolved links, unreadable files, refused
/// renames) are recorded in the report and never abort the pass. Each
/// physical file is processed once, however many references point at it.
///
/// # Errors
///
/// Returns `Error::NoActiveDocument` before touching anything if the
/// document has no location, and `Error::Io` if the document cannot be read
/// or written. A failed write-back undoes this run's renames first.
pub fn run<D, S>(document: &mut D, store: &mut S, config: &Config, mode: Mode) -> Result<TransactionReport, Error>
where
    D: Document + ?Sized,
    S: FileStore + ?Sized,
{
    let Some(location) = document.location().map(str::to_string) else {
        return Err(Error::NoActiveDocument);
    };

    let original = document.text()?;
    let references = scanner::scan(&original);
    tracing::debug!(document = %location, count = references.len(), "scanned attachment links");

    // Resolve everything up front: after the first rename, other spellings of
    // the same attachment would no longer resolve.
    let resolved: Vec<Option<ResolvedAttachment>> = references
        .iter()
        .map(|r| return resolver::resolve(&*store, &r.target_path, r.syntax, &location))
        .collect();

    let mut memo: HashMap<String, RenameOutcome> = HashMap::new();
    let mut journal: Vec<JournalEntry> = Vec::new();
    let mut edits = Vec::new();
    let mut reports = Vec::with_capacity(references.len());

    for (reference, attachment) in references.iter().zip(resolved) {
        let outcome = match &attachment {
            None => {
                tracing::info!(
                    link = %reference.target_path,
                    offset = reference.span.start,
                    "could not locate attachment",
                );
                RenameOutcome::Unresolved
            },
            Some(att) => process_attachment(store, config, mode, att, &mut memo, &mut journal),
        };

        if let Some(new_name) = outcome.rewrite_target() {
            let replacement = rewriter::render_reference(reference, new_name, config.keep_display_text);
            edits.push((reference.span.clone(), replacement));
        }

        reports.push(ReferenceReport {
            matched_text: reference.matched_text.clone(),
            outcome,
            syntax: reference.syntax,
            store_path: attachment.map(|a| return a.store_path),
            target_path: reference.target_path.clone(),
        });
    }

    let working = rewriter::apply_renames(&original, &edits);
    let committed = mode == Mode::Execute && working != original;
    if committed {
        if let Err(e) = document.set_text(&working) {
            tracing::warn!(document = %location, error = %e, "write-back failed, undoing renames");
            roll_back(store, &journal);
            return Err(e);
        }
        tracing::debug!(document = %location, diff = %rewriter::line_diff(&original, &working), "updated note");
    }

    return Ok(TransactionReport {
        committed,
        document: location,
        references: reports,
        renamed: journal.len(),
    });
}

/// Decide the outcome for one resolved attachment, reusing an earlier
/// outcome for the same file.
fn process_attachment<S: FileStore + ?Sized>(
    store: &mut S,
    config: &Config,
    mode: Mode,
    attachment: &ResolvedAttachment,
    memo: &mut HashMap<String, RenameOutcome>,
    journal: &mut Vec<JournalEntry>,
) -> RenameOutcome {
    if let Some(previous) = memo.get(&attachment.store_path) {
        return previous.clone();
    }

    let outcome = if config.should_rename(&attachment.store_path, &attachment.extension) {
        rename::plan_and_execute(store, attachment, mode)
    } else {
        tracing::debug!(path = %attachment.store_path, "attachment excluded by config");
        RenameOutcome::Excluded
    };

    if let RenameOutcome::Renamed { new_name } = &outcome {
        journal.push(JournalEntry {
            from: attachment.store_path.clone(),
            to: resolver::join_vault_path(&attachment.parent, new_name),
        });
    }

    memo.insert(attachment.store_path.clone(), outcome.clone());
    return outcome;
}

/// Undo completed renames, newest first.
fn roll_back<S: FileStore + ?Sized>(store: &mut S, journal: &[JournalEntry]) {
    for entry in journal.iter().rev() {
        if let Err(e) = store.rename(&entry.to, &entry.from) {
            tracing::warn!(from = %entry.to, to = %entry.from, error = %e, "could not undo rename");
        }
    }
}
