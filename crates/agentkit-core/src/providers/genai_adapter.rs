//! Adapter between agentkit types and genai types
//!
//! Credentials are resolved up front by [`super::credentials`] and handed
//! to genai through an `AuthResolver`; the adapter kind is pinned per
//! provider so model names never have to carry a provider hint.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatStreamEvent, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::json;

use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall};

use super::error::ProviderError;
use super::traits::StreamChatOptions;

// ============================================================================
// Message Conversion: agentkit -> genai
// ============================================================================

fn to_genai_tool_call(call: &ToolCall) -> Option<GenaiToolCall> {
    serde_json::from_value(json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": call.input,
    }))
    .ok()
}

/// Convert one agentkit message into the genai messages it stands for
///
/// Tool turns expand to one genai message per result.
pub fn to_genai_message(msg: ChatMessage) -> Vec<GenaiMessage> {
    let text = msg.flatten_text();
    match msg.role {
        MessageRole::System => vec![GenaiMessage::system(text)],
        MessageRole::User => vec![GenaiMessage::user(text)],
        MessageRole::Assistant => {
            let requested = msg.requested_tool_calls();
            let calls: Option<Vec<GenaiToolCall>> = requested.iter().map(to_genai_tool_call).collect();
            match calls {
                Some(calls) if !calls.is_empty() => {
                    let mut out = Vec::with_capacity(2);
                    if !text.is_empty() {
                        out.push(GenaiMessage::assistant(text));
                    }
                    out.push(GenaiMessage::from(calls));
                    out
                }
                _ if !requested.is_empty() => {
                    let described = requested
                        .iter()
                        .map(|c| format!("[Tool call {} {}({})]", c.id, c.name, c.input))
                        .collect::<Vec<_>>()
                        .join("\n");
                    vec![GenaiMessage::assistant(described)]
                }
                _ => vec![GenaiMessage::assistant(text)],
            }
        }
        MessageRole::Tool => match msg.content {
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|p| match p {
                    ContentPart::ToolResult { tool_use_id, content } => {
                        Some(GenaiMessage::from(GenaiToolResponse::new(tool_use_id, content)))
                    }
                    _ => None,
                })
                .collect(),
            MessageContent::Text(text) => vec![GenaiMessage::user(text)],
        },
    }
}

/// Convert a vector of agentkit messages to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().flat_map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: agentkit -> genai
// ============================================================================

/// Convert agentkit Tool to genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: agentkit -> genai
// ============================================================================

pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Tool calls arrive complete on the End event
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> agentkit
// ============================================================================

pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

/// Convert a genai stream event into zero or more chunks
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<Result<StreamChunk, ProviderError>> {
    match event {
        ChatStreamEvent::Chunk(chunk) if !chunk.content.is_empty() => {
            vec![Ok(StreamChunk::text(chunk.content))]
        }
        ChatStreamEvent::ToolCallChunk(chunk) => vec![Ok(StreamChunk::ToolCallDelta {
            id: chunk.tool_call.call_id,
            name: Some(chunk.tool_call.fn_name),
        })],
        ChatStreamEvent::End(end) => end
            .captured_tool_calls()
            .map(|calls| {
                calls
                    .into_iter()
                    .map(|tc| Ok(StreamChunk::tool_call(from_genai_tool_call(&tc))))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Everything needed to build a genai client for one provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "openai", "azure", "openrouter")
    pub provider: String,
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

/// Adapter used for a provider; `None` when the provider is unknown
pub fn adapter_kind_for(provider: &str) -> Option<AdapterKind> {
    let kind = match provider.to_lowercase().as_str() {
        "openai" | "azure" | "mistral" | "openrouter" => AdapterKind::OpenAI,
        "anthropic" => AdapterKind::Anthropic,
        "gemini" | "google" => AdapterKind::Gemini,
        "ollama" => AdapterKind::Ollama,
        "groq" => AdapterKind::Groq,
        "xai" => AdapterKind::Xai,
        "deepseek" => AdapterKind::DeepSeek,
        "cohere" => AdapterKind::Cohere,
        _ => return None,
    };
    Some(kind)
}

/// Endpoint used when none is configured
pub fn default_endpoint(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openrouter" => Some("https://openrouter.ai/api/v1/"),
        "mistral" => Some("https://api.mistral.ai/v1/"),
        _ => None,
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai Client with pinned adapter, endpoint and key
pub fn create_client(config: &ProviderConfig) -> Result<Client, ProviderError> {
    let adapter_kind = adapter_kind_for(&config.provider)
        .ok_or_else(|| ProviderError::Unsupported(config.provider.clone()))?;

    let auth_key = config.api_key.clone();
    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = auth_key.clone();
            // None lets genai fall back to its own lookup (keyless for Ollama)
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        },
    );

    let endpoint = config
        .api_base
        .as_deref()
        .map(with_trailing_slash)
        .or_else(|| default_endpoint(&config.provider).map(str::to_string));

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { endpoint: default_endpoint, auth, model } = target;
            let endpoint = endpoint
                .clone()
                .map(Endpoint::from_owned)
                .unwrap_or(default_endpoint);

            Ok(ServiceTarget {
                endpoint,
                auth,
                model: ModelIden::new(adapter_kind, model.model_name.clone()),
            })
        },
    );

    Ok(Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build())
}

/// Check if a provider can be handled by genai
pub fn is_genai_supported(provider: &str) -> bool {
    adapter_kind_for(provider).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai::chat::ChatRole as GenaiRole;
    use serde_json::json;

    #[test]
    fn test_message_conversion() {
        let converted = to_genai_message(ChatMessage::user("Hello, world!"));
        assert_eq!(converted.len(), 1);
        assert!(matches!(converted[0].role, GenaiRole::User));

        let system = to_genai_message(ChatMessage::system("be brief"));
        assert!(matches!(system[0].role, GenaiRole::System));
    }

    #[test]
    fn test_tool_turns_expand() {
        let calls = vec![ToolCall::new("c1", "add", json!({"a": 1, "b": 2}))];
        let assistant = to_genai_message(ChatMessage::tool_calls(&calls));
        assert_eq!(assistant.len(), 1);
        assert!(matches!(assistant[0].role, GenaiRole::Assistant));

        let result = to_genai_message(ChatMessage::tool_result("c1", "3"));
        assert_eq!(result.len(), 1);
        assert!(matches!(result[0].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_conversion() {
        let tool = Tool::new("get_weather", "Get weather for a location").with_schema(json!({
            "type": "object",
            "properties": { "location": { "type": "string" } }
        }));

        let genai_tool = to_genai_tool(tool);
        assert_eq!(genai_tool.name, "get_weather");
    }

    #[test]
    fn test_adapter_kinds() {
        assert_eq!(adapter_kind_for("google"), Some(AdapterKind::Gemini));
        assert_eq!(adapter_kind_for("Gemini"), Some(AdapterKind::Gemini));
        assert_eq!(adapter_kind_for("azure"), Some(AdapterKind::OpenAI));
        assert_eq!(adapter_kind_for("ollama"), Some(AdapterKind::Ollama));
        assert_eq!(adapter_kind_for("watsonx"), None);
        assert!(is_genai_supported("mistral"));
    }

    #[test]
    fn test_unknown_provider_has_no_client() {
        let config = ProviderConfig {
            provider: "watsonx".into(),
            api_key: None,
            api_base: None,
        };
        assert!(matches!(create_client(&config), Err(ProviderError::Unsupported(_))));
    }

    #[test]
    fn test_endpoint_normalization() {
        assert_eq!(with_trailing_slash("http://localhost:11434"), "http://localhost:11434/");
        assert_eq!(default_endpoint("openrouter"), Some("https://openrouter.ai/api/v1/"));
        assert_eq!(default_endpoint("openai"), None);
    }
}
