use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::{LinkSyntax, RawReference};

/// Both attachment syntaxes in one alternation so matches come out in
/// document order:
/// 1. `![[path]]` / `![[path|alias]]` (groups 1 and 2)
/// 2. `![alt](path)` (groups 3 and 4)
///
/// Every part is bounded by its own closing delimiter and never spans a line.
/// Alt text may hold one level of balanced brackets (`![see [1]](a.png)`).
/// The pattern is hardcoded, so construction cannot fail at runtime.
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"!\[\[([^\]|\n]*)(?:\|([^\]\n]*))?\]\]|!\[((?:[^\[\]\n]|\[[^\[\]\n]*\])*)\]\(([^)\n]*)\)")
        .expect("valid regex");
});

/// Extract every attachment reference from document text, left to right.
///
/// Empty and whitespace-only targets are still reported; deciding whether a
/// target points anywhere is the resolver's job.
pub fn scan(text: &str) -> Vec<RawReference> {
    return REFERENCE_RE
        .captures_iter(text)
        .filter_map(|cap| return parse_reference_capture(&cap))
        .collect();
}

/// Turn one regex capture into a reference. Returns `None` only if the
/// capture lacks the groups the pattern guarantees.
fn parse_reference_capture(cap: &Captures<'_>) -> Option<RawReference> {
    let whole = cap.get(0)?;

    let (syntax, target, display) = if let Some(path) = cap.get(1) {
        (LinkSyntax::Embed, path.as_str(), cap.get(2))
    } else {
        (LinkSyntax::MarkdownImage, cap.get(4)?.as_str(), cap.get(3))
    };

    return Some(RawReference {
        display: display
            .map(|m| return m.as_str())
            .filter(|s| return !s.is_empty())
            .map(str::to_string),
        matched_text: whole.as_str().to_string(),
        span: whole.range(),
        syntax,
        target_path: target.to_string(),
    });
}

#[cfg(test)]
#[allow(clippy::missing_docs_in_private_items, reason = "test module")]
mod tests {
    use super::*;

    fn targets(text: &str) -> Vec<String> {
        return scan(text).into_iter().map(|r| r.target_path).collect();
    }

    #[test]
    fn finds_simple_embed() {
        let refs = scan("see ![[photo.png]] here");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].syntax, LinkSyntax::Embed);
        assert_eq!(refs[0].matched_text, "![[photo.png]]");
        assert_eq!(refs[0].target_path, "photo.png");
        assert_eq!(refs[0].span, 4..18);
        assert_eq!(refs[0].display, None);
    }

    #[test]
    fn strips_alias_from_embed_target() {
        let refs = scan("![[img/photo.png|300]]");
        assert_eq!(refs[0].target_path, "img/photo.png");
        assert_eq!(refs[0].display.as_deref(), Some("300"));
        assert_eq!(refs[0].matched_text, "![[img/photo.png|300]]");
    }

    #[test]
    fn finds_markdown_image() {
        let refs = scan("![a cat](cats/cat.jpg)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].syntax, LinkSyntax::MarkdownImage);
        assert_eq!(refs[0].target_path, "cats/cat.jpg");
        assert_eq!(refs[0].display.as_deref(), Some("a cat"));
    }

    #[test]
    fn alt_text_may_hold_brackets() {
        let refs = scan("![see [1]](a.png)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target_path, "a.png");
        assert_eq!(refs[0].display.as_deref(), Some("see [1]"));
    }

    #[test]
    fn alt_text_does_not_run_into_the_next_image() {
        let refs = scan("![a] and ![b](c.png)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].matched_text, "![b](c.png)");
    }

    #[test]
    fn mixed_syntaxes_come_out_in_document_order() {
        let text = "![x](b.jpg)\n![[a.png]] and ![](c.gif)";
        assert_eq!(targets(text), vec!["b.jpg", "a.png", "c.gif"]);
    }

    #[test]
    fn empty_targets_are_still_reported() {
        assert_eq!(targets("![[]] ![alt]() ![[  ]]"), vec!["", "", "  "]);
    }

    #[test]
    fn unterminated_syntax_is_not_matched() {
        assert!(scan("![[photo.png").is_empty());
        assert!(scan("![[photo.png]").is_empty());
        assert!(scan("![alt](photo.png").is_empty());
        assert!(scan("![[photo\n.png]]").is_empty());
    }

    #[test]
    fn plain_links_are_not_attachments() {
        assert!(scan("[[Note]] and [text](file.png)").is_empty());
    }

    #[test]
    fn repeated_embeds_are_each_reported() {
        let refs = scan("![[a.png]] ![[a.png]]");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].span, 11..21);
    }

    #[test]
    fn alias_does_not_swallow_following_links() {
        let text = "![[a.png|one]] text ![[b.png|two]]";
        assert_eq!(targets(text), vec!["a.png", "b.png"]);
    }
}
