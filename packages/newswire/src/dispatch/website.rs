//! The website dispatcher.
//!
//! Generated articles are normalized to a restricted tag allow-list
//! and upserted into the content store keyed by a stable slug. No
//! truncation budget on this path; balance is corrected by tag
//! counting rather than restructuring.

use regex::Regex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::caption::balance::force_fix_counts;
use crate::caption::rules::decode_entities;
use crate::error::{DispatchError, DispatchResult};
use crate::traits::{ArticleDraft, ContentStore};
use crate::types::{DispatchOutcome, ExtractedContent};

/// Tags the blog renderer accepts.
const ALLOWED_TAGS: &[&str] = &[
    "h2", "h3", "p", "b", "strong", "i", "em", "u", "ul", "ol", "li", "br", "hr",
];

/// Allowed tags that need open/close pairing; `br` and `hr` are void.
const PAIRED_TAGS: &[&str] = &[
    "h2", "h3", "p", "b", "strong", "i", "em", "u", "ul", "ol", "li",
];

/// Normalize generated markup to the allow-list.
///
/// `div` folds into `p`, `span` is unwrapped, anything else is
/// stripped keeping its content. Entities are decoded and tag counts
/// repaired afterwards, so the stored article renders without
/// dangling markup.
pub fn clean_website_html(input: &str) -> String {
    let tag_re = Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap();

    let text = tag_re.replace_all(input, |caps: &regex::Captures| {
        let tag = caps[1].to_lowercase();
        let is_close = caps[0].starts_with("</");
        if ALLOWED_TAGS.contains(&tag.as_str()) {
            // re-emit without attributes; the renderer ignores them
            // and stripping keeps stored HTML canonical
            if is_close {
                format!("</{}>", tag)
            } else if tag == "br" || tag == "hr" {
                format!("<{}>", tag)
            } else {
                format!("<{}>", tag)
            }
        } else if tag == "div" {
            if is_close {
                "</p>".to_string()
            } else {
                "<p>".to_string()
            }
        } else {
            // span and the rest unwrap, content survives
            String::new()
        }
    });

    let decoded = decode_entities(&text);
    let multi_newline = Regex::new(r"\n{3,}").unwrap();
    let collapsed = multi_newline.replace_all(decoded.trim(), "\n\n");

    force_fix_counts(&collapsed, PAIRED_TAGS)
}

/// Slugify a title: letters and digits survive (any script), runs of
/// everything else become single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Website channel dispatcher: idempotent slug-keyed upsert.
pub struct WebsiteDispatcher {
    store: Arc<dyn ContentStore>,
}

impl WebsiteDispatcher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Publish one article. Re-sending the same title updates the
    /// existing record; a different article landing on an occupied
    /// slug gets a counter suffix instead of clobbering it.
    pub async fn dispatch(
        &self,
        item: &ExtractedContent,
        body: &str,
        keywords: &[String],
    ) -> DispatchOutcome {
        let html = clean_website_html(body);
        let slug = match self.unique_slug(&item.title).await {
            Ok(slug) => slug,
            Err(e) => return DispatchOutcome::failed(e.to_string()),
        };

        let draft = ArticleDraft {
            slug: slug.clone(),
            title: item.title.clone(),
            html,
            image_url: item.image_url.clone(),
            video_url: item.video_url.clone(),
            keywords: keywords.to_vec(),
        };

        match self.store.upsert_article(draft).await {
            Ok(stored) => {
                info!(slug = %stored.slug, title = %item.title, "article upserted");
                DispatchOutcome::sent(stored.slug)
            }
            Err(e) => {
                warn!(slug = %slug, error = %e, "article upsert failed");
                DispatchOutcome::failed(e.to_string())
            }
        }
    }

    /// Resolve the slug for a title: reuse when the occupant is the
    /// same article, otherwise append `-2`, `-3`, … with a timestamp
    /// suffix as the last resort.
    async fn unique_slug(&self, title: &str) -> DispatchResult<String> {
        let base = slugify(title);
        if base.is_empty() {
            return Err(DispatchError::Store(
                format!("title produced an empty slug: {:?}", title).into(),
            ));
        }

        match self.store.find_by_slug(&base).await? {
            None => return Ok(base),
            Some(existing) if existing.title == title => return Ok(base),
            Some(_) => {}
        }

        for n in 2..=20u32 {
            let candidate = format!("{}-{}", base, n);
            match self.store.find_by_slug(&candidate).await? {
                None => return Ok(candidate),
                Some(existing) if existing.title == title => return Ok(candidate),
                Some(_) => continue,
            }
        }

        Ok(format!("{}-{}", base, chrono::Utc::now().timestamp()))
    }
}
