//! Caption sanitation for the messaging channel.
//!
//! A caption is body text plus a fixed footer (source link, then
//! hashtags). The sanitizer normalizes markup, truncates the body to
//! the channel budget at a sentence boundary, repairs tag balance with
//! a single-pass stack automaton, and reassembles body and footer in
//! fixed order. The footer itself is never truncated or rebalanced.

pub mod balance;
pub mod footer;
pub mod rules;
pub mod sanitizer;

pub use balance::{repair_tags, strip_incomplete_tags, INLINE_TAGS};
pub use footer::{extract_footer, Footer};
pub use rules::{apply_rules, telegram_cleanup_rules, Rule};
pub use sanitizer::{sanitize_caption, PHOTO_CAPTION_BUDGET, TEXT_MESSAGE_BUDGET};
