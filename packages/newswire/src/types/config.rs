//! Configuration types for the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::generation::provider::ProviderConfig;

/// Which channels one item should be delivered to, plus per-item
/// overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchTargets {
    pub telegram: bool,
    pub website: bool,

    /// Replaces the built-in prompt template when set.
    pub custom_prompt: Option<String>,

    /// Bypass the duplicate gate (manual/forced re-sends).
    #[serde(default)]
    pub skip_duplicate_check: bool,
}

impl DispatchTargets {
    pub fn telegram_only() -> Self {
        Self {
            telegram: true,
            ..Default::default()
        }
    }

    pub fn website_only() -> Self {
        Self {
            website: true,
            ..Default::default()
        }
    }

    pub fn both() -> Self {
        Self {
            telegram: true,
            website: true,
            ..Default::default()
        }
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn with_skip_duplicate_check(mut self) -> Self {
        self.skip_duplicate_check = true;
        self
    }
}

/// Target article length, mapped to a character range in the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthTier {
    Short,
    Medium,
    Long,
    #[default]
    Default,
}

impl LengthTier {
    /// The character range inserted into the prompt's length hint.
    pub fn char_range(&self) -> &'static str {
        match self {
            LengthTier::Short => "300 to 500",
            LengthTier::Medium => "600 to 900",
            LengthTier::Long => "1000 to 1500",
            LengthTier::Default => "700 to 1000",
        }
    }
}

/// Retry policy for network-class dispatch failures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per cascade stage, including the first.
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles each retry.
    pub base_delay_ms: u64,

    /// Backoff ceiling.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 1_000,
            max_delay_ms: 16_000,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based: `attempt = 1`
    /// is the delay after the first failure).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Static settings shared across items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Messaging channel recipient (`@channelname` or numeric id).
    pub chat_id: String,

    /// Category label for hashtag lookup and prompt context.
    pub category: Option<String>,

    pub length_tier: LengthTier,

    /// One generation call producing both channel outputs, versus one
    /// call per channel.
    pub combined_generation: bool,

    /// Apply the configured watermark during photo dispatch.
    pub enable_watermark: bool,

    /// Generation backends in preference order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            chat_id: String::new(),
            category: None,
            length_tier: LengthTier::Default,
            combined_generation: false,
            enable_watermark: false,
            providers: vec![],
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineSettings {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_length_tier(mut self, tier: LengthTier) -> Self {
        self.length_tier = tier;
        self
    }

    pub fn with_combined_generation(mut self, combined: bool) -> Self {
        self.combined_generation = combined;
        self
    }

    pub fn with_watermark(mut self, enabled: bool) -> Self {
        self.enable_watermark = enabled;
        self
    }

    pub fn with_providers(mut self, providers: Vec<ProviderConfig>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(16_000));
    }

    #[test]
    fn test_length_tier_ranges() {
        assert_eq!(LengthTier::Short.char_range(), "300 to 500");
        assert_eq!(LengthTier::Default.char_range(), "700 to 1000");
    }
}
