//! Generation provider configuration and selection.
//!
//! Providers are a tagged union rather than a duck-typed config blob:
//! each variant carries exactly the fields its backend needs, and
//! selection is an ordered-list-with-fallback function instead of
//! conditional chains at call sites.

use serde::{Deserialize, Serialize};

/// One configured generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    Cursor {
        api_key: String,
        model: String,
    },
    #[serde(rename = "openai")]
    OpenAI {
        api_key: String,
        model: String,
    },
    Gemini {
        api_key: String,
        model: String,
    },
    Backboard {
        api_key: String,
        model: String,
    },
    Custom {
        name: String,
        base_url: String,
        api_key: String,
        model: String,
    },
}

/// What a caller needs from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Plain text completion.
    Text,
    /// Reliable JSON-framed output (combined-mode generation).
    JsonOutput,
}

impl ProviderConfig {
    /// Stable name used in logs and as the `preferred_provider` hint.
    pub fn name(&self) -> &str {
        match self {
            ProviderConfig::Cursor { .. } => "cursor",
            ProviderConfig::OpenAI { .. } => "openai",
            ProviderConfig::Gemini { .. } => "gemini",
            ProviderConfig::Backboard { .. } => "backboard",
            ProviderConfig::Custom { name, .. } => name,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Cursor { model, .. }
            | ProviderConfig::OpenAI { model, .. }
            | ProviderConfig::Gemini { model, .. }
            | ProviderConfig::Backboard { model, .. }
            | ProviderConfig::Custom { model, .. } => model,
        }
    }

    /// Whether the variant has the credentials it needs.
    pub fn is_configured(&self) -> bool {
        match self {
            ProviderConfig::Cursor { api_key, .. }
            | ProviderConfig::OpenAI { api_key, .. }
            | ProviderConfig::Gemini { api_key, .. }
            | ProviderConfig::Backboard { api_key, .. } => !api_key.is_empty(),
            ProviderConfig::Custom {
                api_key, base_url, ..
            } => !api_key.is_empty() && !base_url.is_empty(),
        }
    }

    /// Capability predicate per variant.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Text => true,
            // Cursor's completion endpoint does not honor a JSON
            // response format, so combined mode skips it.
            Capability::JsonOutput => !matches!(self, ProviderConfig::Cursor { .. }),
        }
    }
}

/// Pick providers for a call: the preferred one first (when named,
/// configured, and capable), then the rest in list order. Callers walk
/// the returned chain on quota/availability failures.
pub fn select_provider<'a>(
    providers: &'a [ProviderConfig],
    preferred: Option<&str>,
    capability: Capability,
) -> Vec<&'a ProviderConfig> {
    let eligible = |p: &&ProviderConfig| p.is_configured() && p.supports(capability);

    let mut chain: Vec<&ProviderConfig> = Vec::with_capacity(providers.len());
    if let Some(name) = preferred {
        if let Some(p) = providers.iter().filter(eligible).find(|p| p.name() == name) {
            chain.push(p);
        }
    }
    for p in providers.iter().filter(eligible) {
        if !chain.iter().any(|c| c.name() == p.name()) {
            chain.push(p);
        }
    }
    chain
}
