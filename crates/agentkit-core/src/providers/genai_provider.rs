//! GenaiProvider - Unified provider using the genai crate
//!
//! Handles the native genai providers (OpenAI, Anthropic, Gemini, Ollama, ...)
//! as well as OpenAI-compatible ones (Azure, OpenRouter, Mistral) through
//! the ServiceTargetResolver.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::logging::Logger;
use crate::types::ChatMessage;

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, is_genai_supported, to_genai_messages, to_genai_options,
    to_genai_tools, ProviderConfig,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    provider_id: String,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a provider; unknown provider ids are rejected
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        let provider_id = provider_id.into().to_lowercase();
        if !is_genai_supported(&provider_id) {
            return Err(ProviderError::Unsupported(provider_id));
        }
        Ok(Self { provider_id, logger })
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Strip a known provider prefix (e.g., "openai/gpt-4" -> "gpt-4")
    ///
    /// Names whose first segment is not a provider are left alone, so
    /// Ollama tags such as `hf.co/org/model` survive.
    pub fn extract_model_name(model: &str) -> &str {
        match model.split_once('/') {
            Some((prefix, rest)) if is_genai_supported(prefix) => rest,
            _ => model,
        }
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
    ) -> ProviderResult<StreamResponse> {
        self.logger.debug(&format!(
            "[GenaiProvider] stream_chat called: provider={}, model={}",
            self.provider_id, model_config.model
        ));

        let client = create_client(&ProviderConfig {
            provider: self.provider_id.clone(),
            api_key: model_config.api_key.clone(),
            api_base: model_config.api_base.clone(),
        })?;

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));
        if let Some(tools) = &options.tools {
            chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
        }

        let genai_options = to_genai_options(&options);
        let model_name = Self::extract_model_name(&model_config.model);

        let chat_stream = client
            .exec_chat_stream(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider_id, e.to_string()))?;

        self.logger.debug("[GenaiProvider] Stream started successfully");

        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let chunks = chat_stream.stream.flat_map(move |result| {
            let items = match result {
                Ok(event) => {
                    match &event {
                        ChatStreamEvent::ToolCallChunk(_) => {
                            logger.debug("[GenaiProvider] Stream event: ToolCallChunk");
                        }
                        ChatStreamEvent::End(_) => {
                            logger.debug("[GenaiProvider] Stream event: End");
                        }
                        _ => {}
                    }
                    from_genai_event(event)
                }
                Err(e) => {
                    logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                    vec![Err(ProviderError::api_error(&provider_id, e.to_string()))]
                }
            };
            stream::iter(items)
        });

        Ok(Box::pin(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_extract_model_name() {
        assert_eq!(GenaiProvider::extract_model_name("openai/gpt-4o"), "gpt-4o");
        assert_eq!(GenaiProvider::extract_model_name("qwen3:0.6b"), "qwen3:0.6b");
        assert_eq!(
            GenaiProvider::extract_model_name("hf.co/org/model:Q4"),
            "hf.co/org/model:Q4"
        );
    }

    #[test]
    fn test_supports() {
        assert!(GenaiProvider::supports("openai"));
        assert!(GenaiProvider::supports("azure"));
        assert!(GenaiProvider::supports("google"));
        assert!(!GenaiProvider::supports("unknown_provider"));
    }

    #[test]
    fn test_new_normalizes_and_rejects() {
        let provider = GenaiProvider::new("Ollama", Arc::new(NoOpLogger)).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert!(matches!(
            GenaiProvider::new("bedrock-x", Arc::new(NoOpLogger)),
            Err(ProviderError::Unsupported(_))
        ));
    }
}
