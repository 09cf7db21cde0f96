//! CLI commands for hashattach: rename and check.

use std::path::Path;
use std::process::ExitCode;

use crate::config;
use crate::document::NoteFile;
use crate::error;
use crate::rename::Mode;
use crate::store::VaultStore;
use crate::transaction;
use crate::types::{ReferenceReport, RenameOutcome, TransactionReport};

/// How reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `serde_json` pretty-printed report.
    Json,
    /// One aligned line per reference.
    Text,
}

/// Report every attachment in a note that is not yet fingerprint-named,
/// without renaming anything. Exit 2 if any link is broken, 1 if renames
/// are pending, 0 otherwise.
///
/// # Errors
///
/// Returns errors from config loading, vault indexing, or reading the note.
pub fn check(vault: &Path, note: &Path, format: OutputFormat) -> Result<ExitCode, error::Error> {
    let report = run_transaction(vault, note, Mode::PlanOnly)?;
    print_report(&report, format)?;

    let broken = report.broken_count();
    let pending = report.pending_count();

    // Exit code priority: broken (2) > pending (1) > clean (0).
    if broken > 0 {
        eprintln!("{broken} broken, {pending} pending");
        return Ok(ExitCode::from(2));
    } else if pending > 0 {
        eprintln!("{pending} pending");
        eprintln!("hint: run `hashattach rename {}` to apply", note.display());
        return Ok(ExitCode::from(1));
    } else {
        let total = report.references.len();
        eprintln!("All {total} attachment links fingerprint-named");
        return Ok(ExitCode::SUCCESS);
    }
}

/// Rename every attachment referenced by a note to its content fingerprint
/// and rewrite the note's links.
///
/// # Errors
///
/// Returns `Error::NoActiveDocument` if the note does not exist, or errors
/// from config loading, vault indexing, or note I/O.
pub fn rename(vault: &Path, note: &Path, format: OutputFormat) -> Result<ExitCode, error::Error> {
    let report = run_transaction(vault, note, Mode::Execute)?;
    print_report(&report, format)?;

    eprintln!("{}", rename_summary(&report));
    return Ok(ExitCode::SUCCESS);
}

/// Closing line for `rename`: files moved and links rewritten, counted apart
/// since a duplicate rewrites a link without moving a file.
fn rename_summary(report: &TransactionReport) -> String {
    if !report.committed {
        return "No attachments found or renamed.".to_string();
    }
    return format!(
        "Renamed {} attachments, rewrote {} links in {}",
        report.renamed,
        report.rewritten_count(),
        report.document
    );
}

/// Load config, open vault and note, run one transaction.
///
/// # Errors
///
/// Propagates config, vault, document, and transaction errors.
fn run_transaction(vault: &Path, note: &Path, mode: Mode) -> Result<TransactionReport, error::Error> {
    let config = config::Config::load(vault)?;
    let mut store = VaultStore::open(vault)?;
    let mut document = NoteFile::open(vault, note)?;
    tracing::debug!(note = %document.path().display(), files = store.file_count(), "opened vault");

    return transaction::run(&mut document, &mut store, &config, mode);
}

/// Print the report in the requested format.
///
/// # Errors
///
/// Returns `Error::Json` if the report cannot be serialized.
fn print_report(report: &TransactionReport, format: OutputFormat) -> Result<(), error::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            for reference in &report.references {
                println!("{}", format_reference_line(reference));
            }
        },
    }
    return Ok(());
}

/// One status line for a reference: a fixed-width label, the link target,
/// and what happened to it.
fn format_reference_line(reference: &ReferenceReport) -> String {
    let target = &reference.target_path;
    return match &reference.outcome {
        RenameOutcome::Duplicate { new_name } => format!("DUPLICATE   {target} -> {new_name} (existing file)"),
        RenameOutcome::Excluded => format!("EXCLUDED    {target}"),
        RenameOutcome::ReadFailure { reason } => format!("UNREADABLE  {target} ({reason})"),
        RenameOutcome::RenameFailed { new_name, reason } => format!("FAILED      {target} -> {new_name} ({reason})"),
        RenameOutcome::Renamed { new_name } => format!("RENAMED     {target} -> {new_name}"),
        RenameOutcome::Unchanged => format!("OK          {target}"),
        RenameOutcome::Unresolved => format!("MISSING     {target}"),
        RenameOutcome::WouldRename { new_name } => format!("PENDING     {target} -> {new_name}"),
    };
}

#[cfg(test)]
#[allow(clippy::missing_docs_in_private_items, reason = "test module")]
mod tests {
    use super::*;
    use crate::types::LinkSyntax;

    fn report_for(outcome: RenameOutcome) -> ReferenceReport {
        ReferenceReport {
            matched_text: "![[a.png]]".to_string(),
            outcome,
            syntax: LinkSyntax::Embed,
            store_path: Some("a.png".to_string()),
            target_path: "a.png".to_string(),
        }
    }

    #[test]
    fn lines_start_with_a_status_label() {
        let renamed = report_for(RenameOutcome::Renamed { new_name: "h.png".to_string() });
        assert_eq!(format_reference_line(&renamed), "RENAMED     a.png -> h.png");
        assert_eq!(format_reference_line(&report_for(RenameOutcome::Unresolved)), "MISSING     a.png");
    }

    #[test]
    fn summary_counts_duplicate_rewrites_apart_from_renames() {
        let report = TransactionReport {
            committed: true,
            document: "note.md".to_string(),
            references: vec![report_for(RenameOutcome::Duplicate { new_name: "h.png".to_string() })],
            renamed: 0,
        };
        assert_eq!(rename_summary(&report), "Renamed 0 attachments, rewrote 1 links in note.md");
    }

    #[test]
    fn summary_for_an_untouched_note() {
        let report = TransactionReport {
            committed: false,
            document: "note.md".to_string(),
            references: vec![report_for(RenameOutcome::Unchanged)],
            renamed: 0,
        };
        assert_eq!(rename_summary(&report), "No attachments found or renamed.");
    }

    #[test]
    fn json_report_flattens_the_outcome() {
        let report = TransactionReport {
            committed: true,
            document: "note.md".to_string(),
            references: vec![report_for(RenameOutcome::Renamed { new_name: "h.png".to_string() })],
            renamed: 1,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["references"][0]["outcome"], "renamed");
        assert_eq!(value["references"][0]["new_name"], "h.png");
        assert_eq!(value["references"][0]["syntax"], "embed");
    }
}
