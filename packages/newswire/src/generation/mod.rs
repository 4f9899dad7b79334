//! Text generation: provider policy, prompt construction, tolerant
//! JSON extraction, and the FIFO-serialized coordinator.

pub mod coordinator;
pub mod json;
pub mod prompts;
pub mod provider;

pub use coordinator::{Channel, GenerationCoordinator};
pub use json::{extract_json, parse_combined, CombinedPayload};
pub use prompts::{render_prompt, PromptVars};
pub use provider::{select_provider, Capability, ProviderConfig};
