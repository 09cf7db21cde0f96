//! Link-path resolution: mapping a raw link target plus the document's
//! location to a concrete file in the vault.
//!
//! All paths here are vault-relative strings with `/` separators and no
//! leading slash. The vault root is the empty string.

use crate::store::FileStore;
use crate::types::{LinkSyntax, ResolvedAttachment};

/// Schemes that mark a target as external rather than a vault file.
const EXTERNAL_PREFIXES: [&str; 2] = ["mailto:", "data:"];

/// Resolve a raw link target against the store.
///
/// Returns `None` when the target does not name a regular file in the
/// store. That is never an error: the caller skips the reference.
pub fn resolve<S: FileStore + ?Sized>(
    store: &S,
    target_path: &str,
    syntax: LinkSyntax,
    document_path: &str,
) -> Option<ResolvedAttachment> {
    let link = normalize_link_target(target_path, syntax)?;
    let store_path = store.resolve_link_path(&link, document_path)?;
    return Some(ResolvedAttachment {
        extension: extension_of(&store_path).to_string(),
        name: name_of(&store_path).to_string(),
        parent: parent_of(&store_path).to_string(),
        store_path,
    });
}

/// Resolve a normalized link against a sorted index of vault file paths.
///
/// Order of preference:
/// 1. `/`-prefixed targets are vault-absolute and must match exactly.
/// 2. The target relative to the document's directory.
/// 3. The target relative to the vault root.
/// 4. Any file whose path ends with `/target`; shortest path wins, ties
///    broken lexicographically.
pub fn resolve_in_index<'a>(target: &str, document_path: &str, index: &'a [String]) -> Option<&'a str> {
    if let Some(absolute) = target.strip_prefix('/') {
        let path = normalize_vault_path(absolute)?;
        return lookup_exact(index, &path);
    }

    let relative = join_vault_path(parent_of(document_path), target);
    if let Some(found) = normalize_vault_path(&relative).and_then(|p| return lookup_exact(index, &p)) {
        return Some(found);
    }

    let from_root = normalize_vault_path(target)?;
    if let Some(found) = lookup_exact(index, &from_root) {
        return Some(found);
    }

    let suffix = format!("/{from_root}");
    return index
        .iter()
        .filter(|p| return p.ends_with(&suffix))
        .min_by(|a, b| return a.len().cmp(&b.len()).then_with(|| return a.cmp(b)))
        .map(String::as_str);
}

/// Exact lookup in a sorted index.
fn lookup_exact<'a>(index: &'a [String], path: &str) -> Option<&'a str> {
    return index
        .binary_search_by(|p| return p.as_str().cmp(path))
        .ok()
        .and_then(|i| return index.get(i))
        .map(String::as_str);
}

/// Reduce a raw link target to a plain path.
///
/// Trims whitespace, unwraps `<...>`, drops a markdown title (`"..."`) and a
/// `#subpath`. Markdown image targets are URLs and get percent-decoded;
/// embed targets are literal file names. Returns `None` for empty or
/// external targets.
pub fn normalize_link_target(raw: &str, syntax: LinkSyntax) -> Option<String> {
    let mut target = raw.trim();

    if let Some(inner) = target.strip_prefix('<').and_then(|t| return t.strip_suffix('>')) {
        target = inner.trim();
    }

    if target.ends_with('"')
        && let Some((path, _title)) = target.split_once(" \"")
    {
        target = path.trim_end();
    }

    if let Some((path, _subpath)) = target.split_once('#') {
        target = path;
    }

    if target.contains("://") || EXTERNAL_PREFIXES.iter().any(|p| return target.starts_with(p)) {
        return None;
    }

    let decoded = if syntax == LinkSyntax::MarkdownImage && target.contains('%') {
        urlencoding::decode(target).map_or_else(|_err| return target.to_string(), |d| return d.into_owned())
    } else {
        target.to_string()
    };

    let decoded = decoded.trim();
    if decoded.is_empty() {
        return None;
    }
    return Some(decoded.to_string());
}

/// Collapse `.` and `..` segments and empty segments without touching the
/// filesystem. Returns `None` if the path climbs above the vault root.
pub fn normalize_vault_path(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop()?;
            },
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return None;
    }
    return Some(segments.join("/"));
}

/// Join a vault-relative directory and a name, never doubling separators.
/// The vault root (`""` or `"/"`) yields the bare name.
pub fn join_vault_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    let name = name.trim_start_matches('/');
    if parent.is_empty() {
        return name.to_string();
    }
    return format!("{parent}/{name}");
}

/// Parent directory of a vault path; empty at the vault root.
pub fn parent_of(path: &str) -> &str {
    return path.rsplit_once('/').map_or("", |(parent, _)| return parent);
}

/// Final path segment.
pub fn name_of(path: &str) -> &str {
    return path.rsplit_once('/').map_or(path, |(_, name)| return name);
}

/// Extension of the final segment without the dot; empty if there is none.
/// A leading dot (`.hidden`) does not start an extension.
pub fn extension_of(path: &str) -> &str {
    let name = name_of(path);
    return match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    };
}
