//! Ordered text-cleanup rules.
//!
//! Generated text arrives with stray markdown and tags the messaging
//! channel rejects. Cleanup is an ordered list of pure transformations
//! so each step is independently testable and idempotent, instead of
//! one opaque string-mutation chain.

use regex::Regex;

/// One named transformation.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Run rules in order.
pub fn apply_rules(input: &str, rules: &[Rule]) -> String {
    rules
        .iter()
        .fold(input.to_string(), |text, rule| (rule.apply)(&text))
}

/// The messaging-channel cleanup chain, in application order.
pub fn telegram_cleanup_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "markdown_headings",
            apply: markdown_headings,
        },
        Rule {
            name: "markdown_bold",
            apply: markdown_bold,
        },
        Rule {
            name: "markdown_italic",
            apply: markdown_italic,
        },
        Rule {
            name: "markdown_links",
            apply: markdown_links,
        },
        Rule {
            name: "strip_disallowed_tags",
            apply: strip_disallowed_tags,
        },
        Rule {
            name: "decode_entities",
            apply: decode_entities,
        },
        Rule {
            name: "collapse_whitespace",
            apply: collapse_whitespace,
        },
    ]
}

/// Tags the messaging channel renders; everything else is stripped
/// keeping inner text.
const ALLOWED_INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "s", "a", "code", "pre"];

/// `# Heading` lines become bold lines; the channel has no headings.
fn markdown_headings(input: &str) -> String {
    let re = Regex::new(r"(?m)^#{1,6}\s+(.+?)\s*$").unwrap();
    re.replace_all(input, "<b>$1</b>").into_owned()
}

/// `**bold**` → `<b>bold</b>`.
fn markdown_bold(input: &str) -> String {
    let re = Regex::new(r"\*\*([^*\n]+)\*\*").unwrap();
    re.replace_all(input, "<b>$1</b>").into_owned()
}

/// `*italic*` → `<i>italic</i>`. Runs after the bold rule so no `**`
/// pairs remain.
fn markdown_italic(input: &str) -> String {
    let re = Regex::new(r"\*([^*\n]+)\*").unwrap();
    re.replace_all(input, "<i>$1</i>").into_owned()
}

/// `[text](url)` → `<a href="url">text</a>`.
fn markdown_links(input: &str) -> String {
    let re = Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap();
    re.replace_all(input, r#"<a href="$2">$1</a>"#).into_owned()
}

/// Remove tags outside the allowed vocabulary, keeping their content.
/// `<p>` and `<br>` become newlines so paragraph structure survives
/// as text.
fn strip_disallowed_tags(input: &str) -> String {
    let re = Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let tag = caps[1].to_lowercase();
        if ALLOWED_INLINE_TAGS.contains(&tag.as_str()) {
            caps[0].to_string()
        } else if tag == "p" || tag == "br" || tag == "div" {
            "\n".to_string()
        } else {
            String::new()
        }
    })
    .into_owned()
}

/// Decode the entities generation backends actually emit. `&amp;`
/// decodes last so `&amp;lt;` does not become a live tag. Shared by
/// the messaging and website cleanup paths so the table cannot drift.
pub fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&hellip;", "…")
        .replace("&mdash;", "—")
        .replace("&ndash;", "–")
        .replace("&amp;", "&")
}

/// Collapse runs of blank lines and trailing spaces.
fn collapse_whitespace(input: &str) -> String {
    let trailing = Regex::new(r"(?m)[ \t]+$").unwrap();
    let multi_newline = Regex::new(r"\n{3,}").unwrap();
    let text = trailing.replace_all(input, "");
    multi_newline.replace_all(&text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_bold() {
        assert_eq!(markdown_bold("a **b** c"), "a <b>b</b> c");
    }

    #[test]
    fn test_markdown_italic_after_bold() {
        let text = markdown_bold("**b** and *i*");
        assert_eq!(markdown_italic(&text), "<b>b</b> and <i>i</i>");
    }

    #[test]
    fn test_markdown_heading() {
        assert_eq!(markdown_headings("## Title\nbody"), "<b>Title</b>\nbody");
    }

    #[test]
    fn test_markdown_link() {
        assert_eq!(
            markdown_links("see [here](https://x.example)"),
            r#"see <a href="https://x.example">here</a>"#
        );
    }

    #[test]
    fn test_strip_disallowed_keeps_content() {
        assert_eq!(
            strip_disallowed_tags("<h2>Head</h2><b>keep</b><span>text</span>"),
            "Head<b>keep</b>text"
        );
    }

    #[test]
    fn test_paragraph_becomes_newline() {
        assert_eq!(strip_disallowed_tags("<p>a</p><p>b</p>"), "\na\n\nb\n");
    }

    #[test]
    fn test_decode_entities_amp_last() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  \n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_full_chain_idempotent() {
        let rules = telegram_cleanup_rules();
        let input = "## Title\n\n**Bold** text with <div>markup</div> &amp; more.";
        let once = apply_rules(input, &rules);
        let twice = apply_rules(&once, &rules);
        assert_eq!(once, twice);
    }
}
