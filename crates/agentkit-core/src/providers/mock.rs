//! Mock provider for testing
//!
//! Provides deterministic, configurable responses without network dependencies.
//! Useful for driving the agent loop and streaming consumers in tests.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatResponse, Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{ChatMessage, MessageRole, StreamChunk, Tool};

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Return response as specific chunks
    Chunks(Vec<String>),
    /// Simulate an error after `delay_chunks` text chunks
    Error { message: String, delay_chunks: usize },
    /// Return nothing (empty response)
    Empty,
    /// Replay one scripted reply per call; the last one repeats
    Scripted(Vec<ChatResponse>),
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub mode: MockMode,
    /// Delay between chunks in milliseconds (0 = no delay)
    pub chunk_delay_ms: u64,
    /// Size of each chunk when splitting fixed/echo responses
    pub chunk_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mode: MockMode::Echo,
            chunk_delay_ms: 0,
            chunk_size: 10,
        }
    }
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    logger: Arc<dyn Logger>,
    turn: AtomicUsize,
    last_request: Mutex<Option<(Vec<ChatMessage>, Vec<Tool>)>>,
}

impl MockProvider {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_config(MockConfig::default(), logger)
    }

    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            logger,
            turn: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode,
                ..Default::default()
            },
            logger,
        )
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    pub fn chunked(chunks: Vec<String>, delay_ms: u64, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Chunks(chunks), logger).with_delay(delay_ms)
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(
            MockMode::Error {
                message: message.into(),
                delay_chunks: 0,
            },
            logger,
        )
    }

    pub fn empty(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Empty, logger)
    }

    /// Replay `turns` in order, one per call
    pub fn scripted(turns: Vec<ChatResponse>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Scripted(turns), logger)
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.chunk_delay_ms = delay_ms;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Number of `stream_chat` calls so far
    pub fn calls(&self) -> usize {
        self.turn.load(Ordering::SeqCst)
    }

    /// Messages sent with the most recent call
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_request
            .lock()
            .as_ref()
            .map(|(messages, _)| messages.clone())
            .unwrap_or_default()
    }

    /// Tool names offered with the most recent call
    pub fn last_tool_names(&self) -> Vec<String> {
        self.last_request
            .lock()
            .as_ref()
            .map(|(_, tools)| tools.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    fn get_last_user_message(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|msg| msg.role == MessageRole::User)
            .map(|msg| msg.flatten_text())
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }

    /// Split text into chunks
    fn split_into_chunks(&self, text: &str) -> Vec<String> {
        if self.config.chunk_size == 0 || text.is_empty() {
            return vec![text.to_string()];
        }

        text.chars()
            .collect::<Vec<_>>()
            .chunks(self.config.chunk_size)
            .map(|c| c.iter().collect())
            .collect()
    }

    fn text_chunks(&self, text: &str) -> Vec<ProviderResult<StreamChunk>> {
        self.split_into_chunks(text)
            .into_iter()
            .map(|t| Ok(StreamChunk::text(t)))
            .collect()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: StreamChatOptions,
    ) -> ProviderResult<StreamResponse> {
        let turn = self.turn.fetch_add(1, Ordering::SeqCst);
        self.logger
            .debug(&format!("[MockProvider] stream_chat call {}", turn));

        let chunks: Vec<ProviderResult<StreamChunk>> = match &self.config.mode {
            MockMode::Echo => {
                let user_msg = Self::get_last_user_message(&messages);
                self.text_chunks(&format!("Echo: {}", user_msg))
            }
            MockMode::Fixed(response) => self.text_chunks(response),
            MockMode::Chunks(chunks) => chunks.iter().map(|c| Ok(StreamChunk::text(c.clone()))).collect(),
            MockMode::Empty => Vec::new(),
            MockMode::Error { message, delay_chunks } => (0..*delay_chunks)
                .map(|i| Ok(StreamChunk::text(format!("Chunk {} before error. ", i))))
                .chain(std::iter::once(Err(ProviderError::Other(format!(
                    "Mock error: {}",
                    message
                )))))
                .collect(),
            MockMode::Scripted(turns) => match turns.get(turn).or_else(|| turns.last()) {
                Some(reply) => {
                    let mut out = if reply.content.is_empty() {
                        Vec::new()
                    } else {
                        self.text_chunks(&reply.content)
                    };
                    out.extend(reply.tool_calls.iter().cloned().map(|c| Ok(StreamChunk::tool_call(c))));
                    out
                }
                None => Vec::new(),
            },
        };

        *self.last_request.lock() = Some((messages, options.tools.unwrap_or_default()));

        let delay_ms = self.config.chunk_delay_ms;
        let stream = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| async move {
            if i > 0 && delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            chunk
        });

        Ok(Box::pin(stream))
    }
}
