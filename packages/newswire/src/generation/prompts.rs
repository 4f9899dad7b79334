//! Prompt templates for channel-specific rewriting.
//!
//! Templates are plain strings with `{title}` / `{content}` /
//! `{category}` / `{length_limit}` placeholders so operators can
//! override them without recompiling.

use crate::types::{ExtractedContent, LengthTier};

/// Default template for the messaging channel.
pub const TELEGRAM_TEMPLATE: &str = "\
Rewrite the following news item as a messaging-channel post in the \
same language as the source.

Title: {title}
Category: {category}

Rules:
- Keep the post between {length_limit} characters.
- Use only <b>, <i> and <a href=\"...\"> markup. No headings, no lists.
- Lead with the single most newsworthy fact.
- Do not add hashtags or links; they are appended separately.

Source text:
{content}";

/// Default template for the website channel.
pub const WEBSITE_TEMPLATE: &str = "\
Rewrite the following news item as a full blog article in the same \
language as the source.

Title: {title}
Category: {category}

Rules:
- Write a complete article, not a summary. Target {length_limit} \
characters or more.
- Structure with <h2>/<h3> section headings and <p> paragraphs; \
<b>, <i>, <u>, <ul>/<ol>/<li> are allowed.
- End with a line starting with \"KEYWORDS:\" followed by 5 \
comma-separated SEO keywords.

Source text:
{content}";

/// Template for combined-mode generation: one call, both outputs,
/// JSON-framed.
pub const COMBINED_TEMPLATE: &str = "\
Rewrite the following news item for two channels at once and answer \
with a single JSON object, nothing else:

{\"telegram\": \"<post text>\", \"website\": \"<article html>\", \
\"keywords\": [\"k1\", \"k2\"]}

Title: {title}
Category: {category}

Telegram rules: between {length_limit} characters, only <b>/<i>/<a> \
markup. Website rules: full article with <h2>/<h3>/<p> structure.

Source text:
{content}";

/// System prompt shared by all templates.
pub const SYSTEM_PROMPT: &str = "\
You are a news editor. You rewrite wire copy faithfully: no invented \
facts, no editorializing, keep names and figures exactly as given.";

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct PromptVars<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
    pub length_limit: &'a str,
}

impl<'a> PromptVars<'a> {
    pub fn from_item(
        item: &'a ExtractedContent,
        category: Option<&'a str>,
        tier: LengthTier,
    ) -> Self {
        Self {
            title: &item.title,
            content: &item.clean_content,
            category: category.unwrap_or("general"),
            length_limit: tier.char_range(),
        }
    }
}

/// Substitute placeholders. Unknown placeholders pass through
/// untouched so custom templates fail visibly, not silently.
pub fn render_prompt(template: &str, vars: &PromptVars<'_>) -> String {
    template
        .replace("{title}", vars.title)
        .replace("{content}", vars.content)
        .replace("{category}", vars.category)
        .replace("{length_limit}", vars.length_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let vars = PromptVars {
            title: "Budget passes",
            content: "The vote was 61-39.",
            category: "politics",
            length_limit: "700 to 1000",
        };
        let prompt = render_prompt(TELEGRAM_TEMPLATE, &vars);
        assert!(prompt.contains("Budget passes"));
        assert!(prompt.contains("The vote was 61-39."));
        assert!(prompt.contains("politics"));
        assert!(prompt.contains("700 to 1000"));
        assert!(!prompt.contains("{title}"));
    }

    #[test]
    fn test_custom_template_unknown_placeholder_survives() {
        let vars = PromptVars {
            title: "t",
            content: "c",
            category: "g",
            length_limit: "300 to 500",
        };
        let prompt = render_prompt("{title} {tone}", &vars);
        assert_eq!(prompt, "t {tone}");
    }
}
