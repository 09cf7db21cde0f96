//! Document text rewriting: replace matched references with their new form.
use std::ops::Range;

use similar::{ChangeTag, TextDiff};

use crate::types::{LinkSyntax, RawReference};

/// Rebuild `original` with each span swapped for its replacement.
///
/// Spans are byte ranges into `original`, ascending and non-overlapping, as
/// the scanner produces them. Text between spans is copied unchanged, so a
/// replacement is never itself rewritten.
pub fn apply_renames(original: &str, edits: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(original.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        let Some(between) = original.get(cursor..span.start) else {
            continue;
        };
        out.push_str(between);
        out.push_str(replacement);
        cursor = span.end;
    }
    out.push_str(original.get(cursor..).unwrap_or_default());
    return out;
}

/// Render a reference in its own syntax, pointing at `new_name`.
///
/// The alias of an embed or the alt text of an image is carried over only
/// when `keep_display_text` is set.
pub fn render_reference(reference: &RawReference, new_name: &str, keep_display_text: bool) -> String {
    let display = reference.display.as_deref().filter(|_| return keep_display_text);
    return match (reference.syntax, display) {
        (LinkSyntax::Embed, None) => format!("![[{new_name}]]"),
        (LinkSyntax::Embed, Some(alias)) => format!("![[{new_name}|{alias}]]"),
        (LinkSyntax::MarkdownImage, alt) => format!("![{}]({new_name})", alt.unwrap_or_default()),
    };
}

/// Line-oriented `-`/`+` listing of what changed between two texts.
pub fn line_diff(before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => continue,
        };
        out.push(sign);
        out.push(' ');
        out.push_str(change.value().trim_end_matches('\n'));
        out.push('\n');
    }
    return out;
}
