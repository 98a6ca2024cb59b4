//! Model client: a provider bound to one model and its credentials

use std::sync::Arc;

use crate::config::ModelSettings;
use crate::logging::Logger;
use crate::types::{ChatMessage, Tool};

use super::credentials;
use super::error::ProviderResult;
use super::traits::{ChatResponse, Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use super::create_provider;

/// A provider plus the model settings every request uses
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn Provider>,
    model: ProviderModelConfig,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    logger: Arc<dyn Logger>,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn Provider>, model: ProviderModelConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider,
            model,
            temperature: None,
            max_tokens: None,
            logger,
        }
    }

    /// Build a client from settings, resolving credentials from the environment
    ///
    /// Fails when the provider is unknown or a required key or endpoint is
    /// missing.
    pub fn from_settings(settings: &ModelSettings, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        let provider = create_provider(&settings.provider, Arc::clone(&logger))?;
        let creds = credentials::resolve(
            &settings.provider,
            settings.api_key.as_deref(),
            settings.base_url.as_deref(),
        )?;

        let mut model = ProviderModelConfig::new(&settings.model);
        model.api_key = creds.api_key;
        model.api_base = creds.endpoint;

        logger.info(&format!(
            "[ModelClient] Using {} model {}",
            provider.name(),
            settings.model
        ));

        let mut client = Self::new(provider, model, logger).with_temperature(settings.temperature);
        client.max_tokens = settings.max_tokens;
        Ok(client)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model_name(&self) -> &str {
        &self.model.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    fn options(&self, tools: &[Tool]) -> StreamChatOptions {
        let mut options = StreamChatOptions::new().with_tools(tools.to_vec());
        options.temperature = self.temperature;
        options.max_tokens = self.max_tokens;
        options
    }

    /// Stream a reply, offering `tools` to the model
    pub async fn stream(&self, messages: Vec<ChatMessage>, tools: &[Tool]) -> ProviderResult<StreamResponse> {
        self.provider
            .stream_chat(messages, self.model.clone(), self.options(tools))
            .await
    }

    /// Collect a full reply, offering `tools` to the model
    pub async fn chat(&self, messages: Vec<ChatMessage>, tools: &[Tool]) -> ProviderResult<ChatResponse> {
        self.provider
            .chat(messages, self.model.clone(), self.options(tools))
            .await
    }

    /// One-shot prompt; failures come back as bracketed text
    pub async fn invoke(&self, prompt: &str) -> String {
        match self.chat(vec![ChatMessage::user(prompt)], &[]).await {
            Ok(response) => response.content,
            Err(e) => {
                self.logger
                    .error(&format!("[ModelClient] Invocation failed: {}", e));
                format!("[LLM invocation error: {}]", e)
            }
        }
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::providers::{MockProvider, ProviderError};

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    #[tokio::test]
    async fn test_invoke_returns_text() {
        let client = ModelClient::new(
            Arc::new(MockProvider::fixed("pong", logger())),
            ProviderModelConfig::new("mock"),
            logger(),
        );
        assert_eq!(client.invoke("ping").await, "pong");
    }

    #[tokio::test]
    async fn test_invoke_folds_errors_into_text() {
        let client = ModelClient::new(
            Arc::new(MockProvider::error("quota exceeded", logger())),
            ProviderModelConfig::new("mock"),
            logger(),
        );
        let reply = client.invoke("ping").await;
        assert!(reply.starts_with("[LLM invocation error:"));
        assert!(reply.contains("quota exceeded"));
    }

    #[test]
    fn test_from_settings() {
        let client = ModelClient::from_settings(&ModelSettings::new("mock", "mock-echo"), logger()).unwrap();
        assert_eq!(client.provider_name(), "mock");
        assert_eq!(client.temperature(), Some(0.7));

        let ollama = ModelClient::from_settings(
            &ModelSettings::new("ollama", "qwen3:0.6b").with_base_url("http://gpu-box:11434"),
            logger(),
        )
        .unwrap();
        assert_eq!(ollama.model_name(), "qwen3:0.6b");

        let unknown = ModelClient::from_settings(&ModelSettings::new("watsonx", "granite"), logger());
        assert!(matches!(unknown, Err(ProviderError::Unsupported(_))));
    }

    #[test]
    fn test_explicit_key_satisfies_keyed_provider() {
        let settings = ModelSettings::new("anthropic", "claude-sonnet-4-5").with_api_key("sk-ant-test");
        let client = ModelClient::from_settings(&settings, logger()).unwrap();
        assert_eq!(client.provider_name(), "anthropic");
    }
}
