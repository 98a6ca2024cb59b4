//! LLM Provider implementations
//!
//! ## Architecture
//!
//! All real providers go through the `genai` crate, which handles:
//! - Streaming parsing
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, Ollama, etc.)
//! - Tool calling
//!
//! Providers not native to genai (Azure, OpenRouter, Mistral) are routed
//! through genai's `ServiceTargetResolver` using the OpenAI protocol.
//!
//! Keys and endpoints come from settings first, then environment variables
//! (see [`credentials`]).
//!
//! The `MockProvider` is kept for testing purposes.

mod client;
pub mod credentials;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;
mod traits;

// Core traits and types
pub use traits::{ChatResponse, Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

pub use client::ModelClient;
pub use genai_provider::GenaiProvider;
pub use genai_adapter::{adapter_kind_for, is_genai_supported, ProviderConfig};

// Mock provider for testing
pub use mock::{MockConfig, MockMode, MockProvider};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` gives an echoing [`MockProvider`]; every other supported ID is
/// served by [`GenaiProvider`].
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> ProviderResult<Arc<dyn Provider>> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockProvider::echo(logger))),
        _ => Ok(Arc::new(GenaiProvider::new(provider_id, logger)?)),
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "ollama",
        "openai",
        "anthropic",
        "azure",
        "google",
        "gemini",
        "deepseek",
        "mistral",
        "groq",
        "xai",
        "cohere",
        "openrouter",
        // Testing
        "mock",
    ]
}
