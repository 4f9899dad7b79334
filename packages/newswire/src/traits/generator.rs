//! The AI generation backend seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;
use crate::types::GenerationUsage;

/// One request to the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,

    /// Provider hint; the backend may fall back per its own policy.
    pub preferred_provider: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: 0.7,
            preferred_provider: None,
        }
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_preferred_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }
}

/// What the backend returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: String,
    pub usage: GenerationUsage,

    /// Provider and model that actually served the call (may differ
    /// from the hint after fallback).
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// Black-box text generation service.
///
/// Implementations must tolerate provider-specific response shapes;
/// the coordinator owns serialization of calls and plausibility checks
/// on the output, not the backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<GenerationResponse>;
}
