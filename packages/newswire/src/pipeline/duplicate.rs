//! The duplicate gate.
//!
//! Checked before any paid generation call so repeats cost nothing.
//! Advisory, not a lock: it is a membership test against the dispatch
//! ledger, and two near-simultaneous identical items can both pass.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::traits::DispatchLedger;

/// Titles shorter than this never prefix-match; feeds are full of
/// short generic headlines.
const MIN_PREFIX_LEN: usize = 20;

/// Derived key over normalized title + source URL + feed URL.
///
/// For ledger implementations that want an indexable column for
/// dispatched items; the gate itself compares titles and source URLs
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(title: &str, source_url: &str, feed_url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_title(title).as_bytes());
        hasher.update(b"|");
        hasher.update(source_url.as_bytes());
        hasher.update(b"|");
        hasher.update(feed_url.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

/// Collapse whitespace and lowercase so feed formatting differences
/// do not defeat matching.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether two titles refer to the same item.
///
/// Exact match after normalization, or a truncated-title prefix match:
/// feeds ellipsize long headlines, so when the shorter title exceeds
/// the minimum length and is a prefix of the longer, they match.
pub fn titles_match(a: &str, b: &str) -> bool {
    let a = normalize_title(a);
    let b = normalize_title(b);
    if a == b {
        return true;
    }
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    let shorter_trimmed = shorter.trim_end_matches(['…', '.', ' ']);
    shorter_trimmed.chars().count() > MIN_PREFIX_LEN && longer.starts_with(shorter_trimmed)
}

/// Membership test against previously dispatched items.
pub struct DuplicateGate {
    ledger: Arc<dyn DispatchLedger>,
}

impl DuplicateGate {
    pub fn new(ledger: Arc<dyn DispatchLedger>) -> Self {
        Self { ledger }
    }

    /// Whether an item with this identity was already dispatched.
    /// Matches on source URL or on title.
    pub async fn is_duplicate(
        &self,
        title: &str,
        source_url: &str,
        feed_url: &str,
    ) -> Result<bool> {
        let entries = self.ledger.recent_entries(feed_url).await?;
        for entry in &entries {
            if entry.source_url == source_url {
                info!(title = %title, "duplicate: same source URL already dispatched");
                return Ok(true);
            }
            if titles_match(&entry.title, title) {
                info!(title = %title, matched = %entry.title, "duplicate: title match");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Fingerprint::compute("Title  Here", "https://s", "https://f");
        let b = Fingerprint::compute("title here", "https://s", "https://f");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_by_feed() {
        let a = Fingerprint::compute("Title", "https://s", "https://f1");
        let b = Fingerprint::compute("Title", "https://s", "https://f2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_titles_match_exact_after_normalization() {
        assert!(titles_match("Gold  prices rise\nsharply", "gold prices rise sharply"));
    }

    #[test]
    fn test_titles_match_ellipsized_prefix() {
        assert!(titles_match(
            "Central bank announces new currency policy…",
            "Central bank announces new currency policy for exporters"
        ));
    }

    #[test]
    fn test_short_prefix_does_not_match() {
        assert!(!titles_match("Gold prices", "Gold prices rise sharply again today"));
    }

    #[test]
    fn test_unrelated_titles_do_not_match() {
        assert!(!titles_match(
            "Parliament passes the annual budget bill",
            "Housing market cools in the capital region"
        ));
    }
}
