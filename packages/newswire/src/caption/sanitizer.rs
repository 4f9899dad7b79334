//! Budgeted caption truncation.
//!
//! Fits a caption into a hard channel budget while keeping the footer
//! intact and the markup balanced. Applying the sanitizer to its own
//! output with the same budget is a no-op.

use tracing::warn;

use super::balance::{
    force_fix_counts, is_balanced, repair_tags, strip_incomplete_tags, INLINE_TAGS,
};
use super::footer::extract_footer;

/// Caption budget for photo and video messages.
pub const PHOTO_CAPTION_BUDGET: usize = 1024;

/// Budget for plain text messages.
pub const TEXT_MESSAGE_BUDGET: usize = 4096;

/// A sentence-boundary cut is preferred over a hard cut when it keeps
/// at least this share of the available budget.
const SENTENCE_BOUNDARY_RATIO: f64 = 0.70;

/// Sentence-ending punctuation, including the Arabic question mark.
const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', '؟'];

/// Sanitize a caption against `max_len` (in chars).
///
/// Splits off the footer (source link + hashtags), truncates the body
/// at a sentence boundary when it exceeds the remaining budget,
/// repairs tag balance, and reassembles `body + footer` in fixed
/// order. The footer is never truncated; if the footer alone exceeds
/// the budget the body collapses to empty and the footer is emitted
/// as-is rather than failing.
pub fn sanitize_caption(caption: &str, max_len: usize) -> String {
    let (raw_body, footer) = extract_footer(caption.trim());
    let footer_len = footer.rendered_len();
    let available = max_len.saturating_sub(footer_len);

    let body = fit_body(&raw_body, available);

    let result = if body.is_empty() {
        footer.render().trim_start().to_string()
    } else {
        format!("{}{}", body, footer.render())
    };

    // Post-condition: balance should already hold after repair. If a
    // recount still disagrees, force-fix from the end and warn.
    if !is_balanced(&result, INLINE_TAGS) {
        warn!(len = result.chars().count(), "caption still unbalanced after repair");
        return force_fix_counts(&result, INLINE_TAGS);
    }
    result
}

/// Truncate and rebalance the body until it fits `available` chars.
///
/// Rebalancing appends closers, which can push the text back over the
/// budget, so the cut target shrinks by the overflow and the pass
/// repeats. Each iteration strictly shrinks the target, so this
/// terminates.
fn fit_body(raw_body: &str, available: usize) -> String {
    let body = raw_body.trim();
    if body.chars().count() <= available {
        let repaired = repair_tags(&strip_incomplete_tags(body), INLINE_TAGS);
        if repaired.chars().count() <= available {
            return repaired;
        }
    }
    if available == 0 {
        return String::new();
    }

    let mut target = available;
    loop {
        let cut = truncate_at_sentence(body, target);
        let repaired = repair_tags(&strip_incomplete_tags(&cut), INLINE_TAGS);
        let len = repaired.chars().count();
        if len <= available {
            return repaired;
        }
        let overflow = len - available;
        if target <= overflow {
            return String::new();
        }
        target -= overflow;
    }
}

/// Cut at `target` chars, then back-scan for the last sentence-ending
/// punctuation; take the sentence cut when it lands at or after 70% of
/// the target, else keep the hard cut.
fn truncate_at_sentence(body: &str, target: usize) -> String {
    let chars: Vec<char> = body.chars().collect();
    if chars.len() <= target {
        return body.to_string();
    }

    let hard_cut = &chars[..target];
    let threshold = (target as f64 * SENTENCE_BOUNDARY_RATIO).ceil() as usize;

    let sentence_cut = hard_cut
        .iter()
        .rposition(|c| SENTENCE_ENDINGS.contains(c))
        .filter(|&idx| idx + 1 >= threshold)
        .map(|idx| idx + 1);

    let cut = sentence_cut.unwrap_or(target);
    chars[..cut].iter().collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn test_fits_untouched() {
        let caption = "Short body.\n\n<a href=\"https://x\">link</a>\n\n#a";
        assert_eq!(sanitize_caption(caption, 1024), caption);
    }

    #[test]
    fn test_spec_scenario_1100_chars() {
        // 1100 chars of 10-char sentences, 37-char footer, 1024 budget
        let body: String = "Word one. ".repeat(110);
        let footer = "\n\n<a href=\"https://x\">link</a>\n\n#a #b";
        let caption = format!("{}{}", body.trim_end(), footer);
        assert_eq!(char_len(footer), 37);

        let out = sanitize_caption(&caption, 1024);
        let available = 1024 - 37;

        assert!(char_len(&out) <= 1024);
        assert!(out.ends_with(footer));
        let out_body = &out[..out.len() - footer.len()];
        assert!(char_len(out_body) <= available);
        // sentence cut at or after 70% of available
        assert!(char_len(out_body) >= (available as f64 * 0.70) as usize - 1);
        assert!(out_body.trim_end().ends_with('.'));
    }

    #[test]
    fn test_unclosed_bold_closed_once() {
        let body = format!("<b>Title with no closer {}", "filler words here. ".repeat(80));
        let caption = format!("{}\n\n<a href=\"https://x\">link</a>\n\n#a", body.trim_end());
        let out = sanitize_caption(&caption, 1024);

        assert_eq!(out.matches("<b>").count(), 1);
        assert_eq!(out.matches("</b>").count(), 1);
        // closer lands after the truncation point, before the footer
        let closer = out.find("</b>").unwrap();
        let footer = out.find("\n\n<a href").unwrap();
        assert!(closer < footer);
    }

    #[test]
    fn test_footer_survives_verbatim() {
        let footer = "\n\n📰 <a href=\"https://s\">src</a>\n\n#x #y";
        let caption = format!("{}{}", "Long sentence here. ".repeat(100).trim_end(), footer);
        let out = sanitize_caption(&caption, 512);
        assert!(out.ends_with(footer));
        assert!(char_len(&out) <= 512);
    }

    #[test]
    fn test_footer_larger_than_budget_emits_footer_only() {
        let caption = "Body text that will vanish entirely.\n\n<a href=\"https://x\">a very long link label indeed</a>\n\n#one #two #three";
        let out = sanitize_caption(caption, 20);
        assert!(out.contains("<a href"));
        assert!(!out.contains("Body text"));
    }

    #[test]
    fn test_idempotent_on_truncated_output() {
        let caption = format!(
            "{}\n\n<a href=\"https://x\">link</a>\n\n#a",
            "A sentence ends here. ".repeat(90).trim_end()
        );
        let once = sanitize_caption(&caption, 1024);
        let twice = sanitize_caption(&once, 1024);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_hard_cut_when_no_sentence_boundary() {
        let caption = "x".repeat(2000);
        let out = sanitize_caption(&caption, 100);
        assert_eq!(char_len(&out), 100);
    }

    #[test]
    fn test_incomplete_tag_at_cut_stripped() {
        let body = format!("{}<a hre", "Filler sentence. ".repeat(70));
        let out = sanitize_caption(&body, 1024);
        assert!(!out.contains("<a hre"));
        assert!(is_balanced(&out, INLINE_TAGS));
    }

    proptest! {
        #[test]
        fn prop_output_within_budget(
            body in "[a-zA-Z .!?<>/bi]{0,2000}",
            budget in 64usize..2048,
        ) {
            // no footer can form from this alphabet, so the budget is
            // a hard bound
            let out = sanitize_caption(&body, budget);
            prop_assert!(out.chars().count() <= budget);
        }

        #[test]
        fn prop_output_balanced(
            body in "(<b>|</b>|<i>|</i>|[a-z] |\\. )*",
            budget in 64usize..512,
        ) {
            let out = sanitize_caption(&body, budget);
            prop_assert!(is_balanced(&out, INLINE_TAGS));
        }

        #[test]
        fn prop_idempotent(
            body in "(<b>|</b>|<i>|[a-z]{1,8} |\\. ){0,200}",
            budget in 64usize..512,
        ) {
            let once = sanitize_caption(&body, budget);
            let twice = sanitize_caption(&once, budget);
            prop_assert_eq!(once, twice);
        }
    }
}
