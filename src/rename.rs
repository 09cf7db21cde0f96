//! Rename decision and execution for a single resolved attachment.

use crate::hasher;
use crate::resolver;
use crate::store::FileStore;
use crate::types::{ContentFingerprint, RenameOutcome, RenamePlan, ResolvedAttachment};

/// Whether renames are carried out or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rename files in the store.
    Execute,
    /// Leave the store untouched; report `WouldRename` instead.
    PlanOnly,
}

/// File name an attachment should carry: `fingerprint.extension`, or the
/// bare fingerprint when the file has no extension.
pub fn fingerprint_name(fingerprint: &ContentFingerprint, extension: &str) -> String {
    if extension.is_empty() {
        return fingerprint.0.clone();
    }
    return format!("{fingerprint}.{extension}");
}

/// Build the rename plan for an attachment whose fingerprint is known.
pub fn build_plan(attachment: &ResolvedAttachment, fingerprint: ContentFingerprint) -> RenamePlan {
    let new_name = fingerprint_name(&fingerprint, &attachment.extension);
    let new_path = resolver::join_vault_path(&attachment.parent, &new_name);
    return RenamePlan {
        attachment: attachment.clone(),
        fingerprint,
        new_name,
        new_path,
    };
}

/// Read, fingerprint, decide, and (in `Mode::Execute`) rename one attachment.
///
/// Never fails: every problem becomes an outcome that tells the caller to
/// leave the reference untouched. When the fingerprint name is already taken
/// the two files are compared byte for byte; identical content is reported
/// as `Duplicate` so the reference can point at the existing file, anything
/// else is a collision and the rename is refused.
pub fn plan_and_execute<S: FileStore + ?Sized>(
    store: &mut S,
    attachment: &ResolvedAttachment,
    mode: Mode,
) -> RenameOutcome {
    let bytes = match store.read_bytes(&attachment.store_path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %attachment.store_path, error = %e, "could not read attachment");
            return RenameOutcome::ReadFailure { reason: e.to_string() };
        },
    };

    let plan = build_plan(attachment, hasher::fingerprint(&bytes));
    tracing::debug!(path = %attachment.store_path, fingerprint = %plan.fingerprint, "fingerprinted attachment");
    if plan.is_noop() {
        tracing::debug!(path = %attachment.store_path, "attachment already named correctly");
        return RenameOutcome::Unchanged;
    }

    if store.contains(&plan.new_path) {
        return compare_with_existing(store, &plan, &bytes);
    }

    if mode == Mode::PlanOnly {
        return RenameOutcome::WouldRename { new_name: plan.new_name };
    }

    return match store.rename(&attachment.store_path, &plan.new_path) {
        Ok(()) => {
            tracing::info!(from = %attachment.store_path, to = %plan.new_path, "renamed attachment");
            RenameOutcome::Renamed { new_name: plan.new_name }
        },
        Err(e) => {
            tracing::warn!(from = %attachment.store_path, to = %plan.new_path, error = %e, "rename failed");
            RenameOutcome::RenameFailed { new_name: plan.new_name, reason: e.to_string() }
        },
    };
}

/// Decide what to do when the fingerprint name already exists.
fn compare_with_existing<S: FileStore + ?Sized>(store: &S, plan: &RenamePlan, bytes: &[u8]) -> RenameOutcome {
    let same_content = store.read_bytes(&plan.new_path).is_ok_and(|existing| return existing == bytes);
    if same_content {
        tracing::info!(
            path = %plan.attachment.store_path,
            existing = %plan.new_path,
            "attachment duplicates an existing fingerprint-named file",
        );
        return RenameOutcome::Duplicate { new_name: plan.new_name.clone() };
    }

    tracing::warn!(
        path = %plan.attachment.store_path,
        existing = %plan.new_path,
        "fingerprint name taken by a file with different content",
    );
    return RenameOutcome::RenameFailed {
        new_name: plan.new_name.clone(),
        reason: format!("collision: {} exists with different content", plan.new_path),
    };
}

#[cfg(test)]
#[allow(clippy::missing_docs_in_private_items, reason = "test module")]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    const ABC: &str = "900150983cd24fb0d6963f7d28e17f72";

    fn attachment(path: &str) -> ResolvedAttachment {
        ResolvedAttachment {
            extension: resolver::extension_of(path).to_string(),
            name: resolver::name_of(path).to_string(),
            parent: resolver::parent_of(path).to_string(),
            store_path: path.to_string(),
        }
    }

    #[test]
    fn plan_keeps_extension_and_directory() {
        let plan = build_plan(&attachment("img/photo.png"), hasher::fingerprint(b"abc"));
        assert_eq!(plan.new_name, format!("{ABC}.png"));
        assert_eq!(plan.new_path, format!("img/{ABC}.png"));
        assert!(!plan.is_noop());
    }

    #[test]
    fn plan_at_vault_root_has_no_leading_separator() {
        let plan = build_plan(&attachment("photo.png"), hasher::fingerprint(b"abc"));
        assert_eq!(plan.new_path, format!("{ABC}.png"));
    }

    #[test]
    fn extensionless_files_get_the_bare_fingerprint() {
        let plan = build_plan(&attachment("blob"), hasher::fingerprint(b"abc"));
        assert_eq!(plan.new_name, ABC);
    }

    #[test]
    fn renames_when_name_differs() {
        let mut store = MemoryStore::with_files(&[("img/photo.png", b"abc")]);
        let outcome = plan_and_execute(&mut store, &attachment("img/photo.png"), Mode::Execute);
        assert_eq!(outcome, RenameOutcome::Renamed { new_name: format!("{ABC}.png") });
        assert_eq!(store.paths(), vec![format!("img/{ABC}.png")]);
    }

    #[test]
    fn correctly_named_file_is_unchanged() {
        let name = format!("{ABC}.png");
        let mut store = MemoryStore::with_files(&[(name.as_str(), b"abc")]);
        let outcome = plan_and_execute(&mut store, &attachment(&name), Mode::Execute);
        assert_eq!(outcome, RenameOutcome::Unchanged);
        assert!(store.rename_calls.is_empty());
    }

    #[test]
    fn plan_only_leaves_store_alone() {
        let mut store = MemoryStore::with_files(&[("photo.png", b"abc")]);
        let outcome = plan_and_execute(&mut store, &attachment("photo.png"), Mode::PlanOnly);
        assert_eq!(outcome, RenameOutcome::WouldRename { new_name: format!("{ABC}.png") });
        assert!(store.rename_calls.is_empty());
        assert_eq!(store.paths(), vec!["photo.png".to_string()]);
    }

    #[test]
    fn read_failure_is_reported_not_raised() {
        let mut store = MemoryStore::with_files(&[("photo.png", b"abc")]);
        store.fail_reads.insert("photo.png".to_string());
        let outcome = plan_and_execute(&mut store, &attachment("photo.png"), Mode::Execute);
        assert!(matches!(outcome, RenameOutcome::ReadFailure { .. }));
        assert!(store.rename_calls.is_empty());
    }

    #[test]
    fn store_refusal_becomes_rename_failed() {
        let mut store = MemoryStore::with_files(&[("photo.png", b"abc")]);
        store.fail_renames.insert("photo.png".to_string());
        let outcome = plan_and_execute(&mut store, &attachment("photo.png"), Mode::Execute);
        assert!(matches!(outcome, RenameOutcome::RenameFailed { .. }));
        assert_eq!(store.paths(), vec!["photo.png".to_string()]);
    }

    #[test]
    fn identical_existing_file_is_a_duplicate() {
        let existing = format!("{ABC}.png");
        let mut store = MemoryStore::with_files(&[("copy.png", b"abc"), (existing.as_str(), b"abc")]);
        let outcome = plan_and_execute(&mut store, &attachment("copy.png"), Mode::Execute);
        assert_eq!(outcome, RenameOutcome::Duplicate { new_name: existing });
        assert!(store.rename_calls.is_empty());
        assert!(store.files.contains_key("copy.png"));
    }

    #[test]
    fn different_existing_file_is_a_collision() {
        let existing = format!("{ABC}.png");
        let mut store = MemoryStore::with_files(&[("photo.png", b"abc"), (existing.as_str(), b"not abc")]);
        let outcome = plan_and_execute(&mut store, &attachment("photo.png"), Mode::Execute);
        let RenameOutcome::RenameFailed { reason, .. } = outcome else {
            panic!("expected RenameFailed, got {outcome:?}");
        };
        assert!(reason.starts_with("collision"));
        assert_eq!(store.files.get(&existing).unwrap(), b"not abc");
        assert!(store.rename_calls.is_empty());
    }
}
