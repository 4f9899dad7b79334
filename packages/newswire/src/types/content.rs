//! Extracted items and generated payloads.

use serde::{Deserialize, Serialize};

/// A normalized news item produced by the upstream extractor.
///
/// Immutable once built, except that `image_url` may be rewritten in
/// place after image processing (same logical image, new storage
/// location). An item with no resolvable `image_url` never proceeds
/// past the image gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub title: String,

    /// Raw markup as scraped, kept for logging/debugging.
    pub raw_content: String,

    /// Plain-ish text the generation prompt is built from.
    pub clean_content: String,

    pub source_url: String,

    /// URL of the feed the item arrived through.
    pub feed_url: String,

    pub image_url: Option<String>,
    pub video_url: Option<String>,

    /// Word count of `clean_content`, used for length heuristics.
    pub word_count: usize,
}

impl ExtractedContent {
    /// Build an item, deriving `word_count` from the clean content.
    pub fn new(
        title: impl Into<String>,
        raw_content: impl Into<String>,
        clean_content: impl Into<String>,
        source_url: impl Into<String>,
        feed_url: impl Into<String>,
    ) -> Self {
        let clean_content = clean_content.into();
        let word_count = clean_content.split_whitespace().count();
        Self {
            title: title.into(),
            raw_content: raw_content.into(),
            clean_content,
            source_url: source_url.into(),
            feed_url: feed_url.into(),
            image_url: None,
            video_url: None,
            word_count,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }
}

/// Token usage reported by the generation backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl GenerationUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Split usage 50/50 for combined-mode accounting. The halves sum
    /// back to the original (first half takes the odd token).
    pub fn split_half(&self) -> (Self, Self) {
        let first = Self {
            input_tokens: self.input_tokens - self.input_tokens / 2,
            output_tokens: self.output_tokens - self.output_tokens / 2,
        };
        let second = Self {
            input_tokens: self.input_tokens / 2,
            output_tokens: self.output_tokens / 2,
        };
        (first, second)
    }
}

/// Generated text for one channel, with its usage share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelGeneration {
    pub body: String,
    pub usage: GenerationUsage,

    /// Provider that produced the text, for the log record.
    pub provider: Option<String>,
}

/// Output of the generation coordinator for one item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedPayload {
    pub telegram: Option<ChannelGeneration>,
    pub website: Option<ChannelGeneration>,

    /// SEO keywords from the website generation, when present.
    #[serde(default)]
    pub keywords: Vec<String>,
}
