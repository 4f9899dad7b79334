//! The generation coordinator.
//!
//! Serializes every call to the generation backend through one fair
//! async mutex: the backend sees at most one request in flight, and
//! waiters are served in arrival order. The guard is held across the
//! call, so release is guaranteed on every exit path, error or not.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{GenerationError, GenerationResult};
use crate::generation::json::parse_combined;
use crate::generation::prompts::{
    render_prompt, PromptVars, COMBINED_TEMPLATE, SYSTEM_PROMPT, TELEGRAM_TEMPLATE,
    WEBSITE_TEMPLATE,
};
use crate::generation::provider::{select_provider, Capability};
use crate::traits::{GenerationRequest, GenerationResponse, GenerationService};
use crate::types::{ChannelGeneration, ExtractedContent, GeneratedPayload, PipelineSettings};

/// Anything shorter than this is noise, not an article.
const MIN_PLAUSIBLE_CHARS: usize = 50;

/// Output channel a generation call is producing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Telegram,
    Website,
}

impl Channel {
    fn template(&self) -> &'static str {
        match self {
            Channel::Telegram => TELEGRAM_TEMPLATE,
            Channel::Website => WEBSITE_TEMPLATE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Telegram => "telegram",
            Channel::Website => "website",
        }
    }
}

/// FIFO-serialized front end to the [`GenerationService`].
pub struct GenerationCoordinator {
    service: Arc<dyn GenerationService>,
    lock: Mutex<()>,
}

impl GenerationCoordinator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            lock: Mutex::new(()),
        }
    }

    /// One call for one channel (separate mode).
    ///
    /// For the website channel a trailing `KEYWORDS:` line is split
    /// off into the payload's keyword list.
    pub async fn generate_for_channel(
        &self,
        channel: Channel,
        item: &ExtractedContent,
        settings: &PipelineSettings,
        custom_prompt: Option<&str>,
    ) -> GenerationResult<(ChannelGeneration, Vec<String>)> {
        let vars = PromptVars::from_item(item, settings.category.as_deref(), settings.length_tier);
        let template = custom_prompt.unwrap_or_else(|| channel.template());
        let prompt = render_prompt(template, &vars);

        let response = self
            .call_with_fallback(prompt, settings, Capability::Text)
            .await?;

        let content = validate_output(&response.content)?;
        let (body, keywords) = match channel {
            Channel::Website => split_keywords(content),
            Channel::Telegram => (content.to_string(), vec![]),
        };

        info!(
            channel = channel.as_str(),
            title = %item.title,
            chars = body.len(),
            tokens = response.usage.total_tokens(),
            provider = response.provider.as_deref().unwrap_or("default"),
            "generated channel text"
        );

        Ok((
            ChannelGeneration {
                body,
                usage: response.usage,
                provider: response.provider,
            },
            keywords,
        ))
    }

    /// One call producing both channel outputs, JSON-framed (combined
    /// mode). Usage is split 50/50 across the two channel records; a
    /// parse failure is fatal for the item, with no partial fallback.
    pub async fn generate_combined(
        &self,
        item: &ExtractedContent,
        settings: &PipelineSettings,
        custom_prompt: Option<&str>,
    ) -> GenerationResult<GeneratedPayload> {
        let vars = PromptVars::from_item(item, settings.category.as_deref(), settings.length_tier);
        let template = custom_prompt.unwrap_or(COMBINED_TEMPLATE);
        let prompt = render_prompt(template, &vars);

        let response = self
            .call_with_fallback(prompt, settings, Capability::JsonOutput)
            .await?;

        let combined = parse_combined(&response.content)?;
        validate_output(&combined.telegram)?;
        validate_output(&combined.website)?;

        let (telegram_usage, website_usage) = response.usage.split_half();

        info!(
            title = %item.title,
            telegram_chars = combined.telegram.len(),
            website_chars = combined.website.len(),
            tokens = response.usage.total_tokens(),
            "generated combined payload"
        );

        Ok(GeneratedPayload {
            telegram: Some(ChannelGeneration {
                body: combined.telegram,
                usage: telegram_usage,
                provider: response.provider.clone(),
            }),
            website: Some(ChannelGeneration {
                body: combined.website,
                usage: website_usage,
                provider: response.provider,
            }),
            keywords: combined.keywords,
        })
    }

    /// Walk the provider chain, one serialized call at a time. Only
    /// backend failures move to the next provider; implausible output
    /// is the caller's verdict, not grounds for another paid call.
    async fn call_with_fallback(
        &self,
        prompt: String,
        settings: &PipelineSettings,
        capability: Capability,
    ) -> GenerationResult<GenerationResponse> {
        let chain = select_provider(&settings.providers, None, capability);

        let base = GenerationRequest::new(prompt).with_system_prompt(SYSTEM_PROMPT);

        if chain.is_empty() {
            return self.call(base).await;
        }

        let mut last_err = None;
        for provider in &chain {
            let request = base.clone().with_preferred_provider(provider.name());
            match self.call(request).await {
                Ok(response) => return Ok(response),
                Err(GenerationError::Service(e)) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                    last_err = Some(GenerationError::Service(e));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(GenerationError::Empty))
    }

    async fn call(&self, request: GenerationRequest) -> GenerationResult<GenerationResponse> {
        // Fair mutex: callers suspend in arrival order, and the guard
        // drops on every exit path.
        let _guard = self.lock.lock().await;
        debug!("generation slot acquired");
        self.service.generate(request).await
    }
}

fn validate_output(content: &str) -> GenerationResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Empty);
    }
    if trimmed.chars().count() < MIN_PLAUSIBLE_CHARS {
        return Err(GenerationError::TooShort {
            len: trimmed.chars().count(),
        });
    }
    Ok(trimmed)
}

/// Split a trailing `KEYWORDS: a, b, c` line off a website article.
fn split_keywords(content: &str) -> (String, Vec<String>) {
    for marker in ["KEYWORDS:", "Keywords:"] {
        if let Some(idx) = content.rfind(marker) {
            let keywords: Vec<String> = content[idx + marker.len()..]
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            if !keywords.is_empty() {
                return (content[..idx].trim_end().to_string(), keywords);
            }
        }
    }
    (content.to_string(), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(validate_output("   "), Err(GenerationError::Empty)));
    }

    #[test]
    fn test_validate_rejects_short() {
        assert!(matches!(
            validate_output("too short"),
            Err(GenerationError::TooShort { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_plausible() {
        let text = "a".repeat(80);
        assert!(validate_output(&text).is_ok());
    }

    #[test]
    fn test_split_keywords() {
        let (body, keywords) = split_keywords("<p>Article.</p>\nKEYWORDS: tax, budget, senate");
        assert_eq!(body, "<p>Article.</p>");
        assert_eq!(keywords, vec!["tax", "budget", "senate"]);
    }

    #[test]
    fn test_split_keywords_absent() {
        let (body, keywords) = split_keywords("<p>Article.</p>");
        assert_eq!(body, "<p>Article.</p>");
        assert!(keywords.is_empty());
    }
}
