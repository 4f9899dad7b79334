//! Footer extraction.
//!
//! A caption's footer is the fixed trailing block: a source-link line
//! and a hashtag line, conventionally link first. Both are removed
//! from the body before truncation and re-appended verbatim after, so
//! truncation can never split them.

use regex::Regex;

/// The fixed trailing block of a caption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footer {
    /// Whole link line, e.g. `📰 <a href="https://x">source</a>`.
    pub link_line: Option<String>,

    /// Whole hashtag line, e.g. `#economy #budget`.
    pub hashtag_line: Option<String>,
}

impl Footer {
    pub fn is_empty(&self) -> bool {
        self.link_line.is_none() && self.hashtag_line.is_none()
    }

    /// Render the footer including the blank line that separates each
    /// part from what precedes it. Fixed order: link, then hashtags.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(link) = &self.link_line {
            out.push_str("\n\n");
            out.push_str(link);
        }
        if let Some(tags) = &self.hashtag_line {
            out.push_str("\n\n");
            out.push_str(tags);
        }
        out
    }

    /// Length in chars of the rendered footer, separators included.
    pub fn rendered_len(&self) -> usize {
        self.render().chars().count()
    }
}

fn hashtag_line_re() -> Regex {
    // A line consisting only of #-tokens (letters, digits, underscore,
    // and the Arabic/Persian block for localized tags).
    Regex::new(r"^\s*#[\w؀-ۿ]+(?:\s+#[\w؀-ۿ]+)*\s*$").unwrap()
}

fn link_line_re() -> Regex {
    // A line whose payload is a single <a> element, allowing a short
    // prefix (emoji, label) before it.
    Regex::new(r#"^\s*[^<>\n]{0,16}<a\s+href="[^"]*"[^>]*>[^<]*</a>\s*$"#).unwrap()
}

/// Split a caption into body and footer.
///
/// Works from the trailing lines inward: a hashtag line, then a link
/// line, then (for the before-link convention) a hashtag line again if
/// none was found after. Anything that is not trailing stays in the
/// body untouched.
pub fn extract_footer(caption: &str) -> (String, Footer) {
    let hashtag_re = hashtag_line_re();
    let link_re = link_line_re();

    let mut lines: Vec<&str> = caption.trim_end().lines().collect();
    let mut footer = Footer::default();

    pop_blank(&mut lines);
    if let Some(last) = lines.last() {
        if hashtag_re.is_match(last) {
            footer.hashtag_line = lines.pop().map(|l| l.trim().to_string());
            pop_blank(&mut lines);
        }
    }
    if let Some(last) = lines.last() {
        if link_re.is_match(last) {
            footer.link_line = lines.pop().map(|l| l.trim().to_string());
            pop_blank(&mut lines);
        }
    }
    if footer.hashtag_line.is_none() {
        if let Some(last) = lines.last() {
            if hashtag_re.is_match(last) {
                footer.hashtag_line = lines.pop().map(|l| l.trim().to_string());
                pop_blank(&mut lines);
            }
        }
    }

    (lines.join("\n").trim_end().to_string(), footer)
}

fn pop_blank(lines: &mut Vec<&str>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_link_then_hashtags() {
        let caption = "Body text.\n\n📰 <a href=\"https://x\">source</a>\n\n#a #b";
        let (body, footer) = extract_footer(caption);
        assert_eq!(body, "Body text.");
        assert_eq!(
            footer.link_line.as_deref(),
            Some("📰 <a href=\"https://x\">source</a>")
        );
        assert_eq!(footer.hashtag_line.as_deref(), Some("#a #b"));
    }

    #[test]
    fn test_extract_hashtags_before_link() {
        let caption = "Body.\n\n#x #y\n\n<a href=\"https://s\">more</a>";
        let (body, footer) = extract_footer(caption);
        assert_eq!(body, "Body.");
        assert_eq!(footer.hashtag_line.as_deref(), Some("#x #y"));
        assert!(footer.link_line.is_some());
    }

    #[test]
    fn test_no_footer() {
        let (body, footer) = extract_footer("Just text with a #hashtag inline.");
        assert_eq!(body, "Just text with a #hashtag inline.");
        assert!(footer.is_empty());
    }

    #[test]
    fn test_mid_body_link_stays_in_body() {
        let caption = "See <a href=\"https://x\">this</a> for details.\nMore text.";
        let (body, footer) = extract_footer(caption);
        assert_eq!(body, caption);
        assert!(footer.is_empty());
    }

    #[test]
    fn test_render_roundtrip() {
        let caption = "Body.\n\n<a href=\"https://x\">link</a>\n\n#a";
        let (body, footer) = extract_footer(caption);
        assert_eq!(format!("{}{}", body, footer.render()), caption);
    }

    #[test]
    fn test_rendered_len_counts_separators() {
        let footer = Footer {
            link_line: Some("<a href=\"https://x\">link</a>".to_string()),
            hashtag_line: Some("#a #b".to_string()),
        };
        // "\n\n" + 28 + "\n\n" + 5
        assert_eq!(footer.rendered_len(), 2 + 28 + 2 + 5);
    }

    #[test]
    fn test_persian_hashtag_line() {
        let caption = "متن خبر.\n\n#اقتصاد #بودجه";
        let (body, footer) = extract_footer(caption);
        assert_eq!(body, "متن خبر.");
        assert_eq!(footer.hashtag_line.as_deref(), Some("#اقتصاد #بودجه"));
    }
}
