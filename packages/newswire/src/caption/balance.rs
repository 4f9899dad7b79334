//! Tag-balance repair.
//!
//! Truncation can cut a caption mid-element, and generation backends
//! emit unbalanced markup on their own. Repair is a single left-to-
//! right pass over the text with an explicit tag stack; the renderer
//! never sees an unmatched open or close afterwards.
//!
//! All functions take the set of tag kinds to track so the messaging
//! path (inline tags) and the website path (block tags too) share one
//! implementation. Untracked tags pass through untouched.

use regex::Regex;
use std::collections::HashMap;

/// Inline vocabulary of the messaging channel.
pub const INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "s", "a", "code", "pre"];

fn tag_token_re() -> Regex {
    Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap()
}

/// Remove incomplete tags: any `<` run that never reaches a `>` before
/// the next `<` or end of input. Truncation produces these at the cut
/// point.
pub fn strip_incomplete_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending: Option<String> = None;

    for ch in input.chars() {
        match ch {
            '<' => {
                // an earlier unterminated tag is dropped wholesale
                pending = Some(String::from('<'));
            }
            '>' => match pending.take() {
                Some(mut tag) => {
                    tag.push('>');
                    out.push_str(&tag);
                }
                None => out.push('>'),
            },
            _ => match &mut pending {
                Some(tag) => tag.push(ch),
                None => out.push(ch),
            },
        }
    }
    // trailing unterminated tag is dropped
    out
}

/// Single-pass stack repair over the tracked tag kinds.
///
/// Opening tags are pushed; a closing tag pops its most recent
/// matching open (out-of-order closes are tolerated) or is dropped
/// when nothing matches; at end of input every open tag left on the
/// stack is closed in LIFO order. Guarantees one matching closer per
/// emitted opener with nesting preserved.
pub fn repair_tags(input: &str, tracked: &[&str]) -> String {
    let re = tag_token_re();
    let mut out = String::with_capacity(input.len() + 16);
    let mut stack: Vec<String> = Vec::new();
    let mut cursor = 0;

    for caps in re.captures_iter(input) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let kind = caps[1].to_lowercase();

        out.push_str(&input[cursor..whole.start()]);
        cursor = whole.end();

        if !tracked.contains(&kind.as_str()) {
            out.push_str(whole.as_str());
            continue;
        }

        if whole.as_str().starts_with("</") {
            if let Some(pos) = stack.iter().rposition(|k| k == &kind) {
                stack.remove(pos);
                out.push_str(whole.as_str());
            }
            // unmatched closer: dropped, not re-emitted
        } else {
            stack.push(kind);
            out.push_str(whole.as_str());
        }
    }
    out.push_str(&input[cursor..]);

    while let Some(kind) = stack.pop() {
        out.push_str(&format!("</{}>", kind));
    }
    out
}

/// Count opening and closing occurrences per tracked kind.
pub fn tag_counts(input: &str, tracked: &[&str]) -> HashMap<String, (usize, usize)> {
    let re = tag_token_re();
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for caps in re.captures_iter(input) {
        let kind = caps[1].to_lowercase();
        if !tracked.contains(&kind.as_str()) {
            continue;
        }
        let entry = counts.entry(kind).or_insert((0, 0));
        if caps[0].starts_with("</") {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }
    counts
}

/// Whether every tracked kind has equal open and close counts.
pub fn is_balanced(input: &str, tracked: &[&str]) -> bool {
    tag_counts(input, tracked)
        .values()
        .all(|(open, close)| open == close)
}

/// Count-based force fix: strip excess trailing closers, append
/// missing ones. Used as the post-condition repair and by the website
/// path, which needs counts corrected but not restructured.
pub fn force_fix_counts(input: &str, tracked: &[&str]) -> String {
    let mut text = input.to_string();

    for (kind, (open, close)) in tag_counts(&text, tracked) {
        if close > open {
            let closer = format!("</{}>", kind);
            for _ in 0..(close - open) {
                if let Some(idx) = text.rfind(&closer) {
                    text.replace_range(idx..idx + closer.len(), "");
                }
            }
        }
    }
    // recount after removals, then append what is still missing
    for (kind, (open, close)) in tag_counts(&text, tracked) {
        for _ in 0..open.saturating_sub(close) {
            text.push_str(&format!("</{}>", kind));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_incomplete_trailing() {
        assert_eq!(
            strip_incomplete_tags("text <b>bold</b> and <a hre"),
            "text <b>bold</b> and "
        );
    }

    #[test]
    fn test_strip_incomplete_mid() {
        assert_eq!(strip_incomplete_tags("a <b unfinished <i>x</i>"), "a <i>x</i>");
    }

    #[test]
    fn test_repair_closes_open_tag() {
        assert_eq!(repair_tags("<b>Title", INLINE_TAGS), "<b>Title</b>");
    }

    #[test]
    fn test_repair_drops_unmatched_closer() {
        assert_eq!(repair_tags("text</b> more", INLINE_TAGS), "text more");
    }

    #[test]
    fn test_repair_lifo_order() {
        assert_eq!(repair_tags("<b>a <i>b", INLINE_TAGS), "<b>a <i>b</i></b>");
    }

    #[test]
    fn test_repair_out_of_order_close() {
        // closing b while i is on top pops the matching b entry
        let out = repair_tags("<b><i>x</b>", INLINE_TAGS);
        assert!(is_balanced(&out, INLINE_TAGS));
        assert_eq!(out, "<b><i>x</b></i>");
    }

    #[test]
    fn test_repair_balanced_is_identity() {
        let input = "<b>a</b> plain <i>b</i> <a href=\"https://x\">c</a>";
        assert_eq!(repair_tags(input, INLINE_TAGS), input);
    }

    #[test]
    fn test_untracked_tags_pass_through() {
        assert_eq!(repair_tags("<br>line<hr>", INLINE_TAGS), "<br>line<hr>");
    }

    #[test]
    fn test_force_fix_strips_excess_closers() {
        assert_eq!(force_fix_counts("<b>a</b>b</b>", INLINE_TAGS), "<b>a</b>b");
    }

    #[test]
    fn test_force_fix_appends_missing() {
        assert_eq!(force_fix_counts("<i>a", INLINE_TAGS), "<i>a</i>");
    }

    #[test]
    fn test_force_fix_block_tags() {
        assert_eq!(force_fix_counts("<p>open", &["p"]), "<p>open</p>");
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("<b>a</b>", INLINE_TAGS));
        assert!(!is_balanced("<b>a", INLINE_TAGS));
    }
}
