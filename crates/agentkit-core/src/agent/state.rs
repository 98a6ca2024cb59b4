//! Conversation state kept by an agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{ChatMessage, MessageRole, ToolCall};

const TOOL_CALL_ID: &str = "tool_call_id";

/// One entry of an agent's conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AgentMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_calls: None,
            metadata: Map::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Assistant turn that requested tools
    pub fn tool_request(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            ..Self::assistant(content)
        }
    }

    /// Output of one tool call
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::new(MessageRole::Tool, content);
        message
            .metadata
            .insert(TOOL_CALL_ID.to_string(), Value::String(call_id.into()));
        message
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        self.metadata.get(TOOL_CALL_ID).and_then(Value::as_str)
    }

    /// Messages to send to a model for this entry
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        match (self.role, &self.tool_calls, self.tool_call_id()) {
            (MessageRole::Assistant, Some(calls), _) if !calls.is_empty() => {
                let mut out = Vec::with_capacity(2);
                if !self.content.is_empty() {
                    out.push(ChatMessage::assistant(&self.content));
                }
                out.push(ChatMessage::tool_calls(calls));
                out
            }
            (MessageRole::Tool, _, Some(call_id)) => {
                vec![ChatMessage::tool_result(call_id, &self.content)]
            }
            (role, _, _) => vec![ChatMessage::text(role, &self.content)],
        }
    }
}

/// Mutable state of one agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub messages: Vec<AgentMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Latest output per tool call id
    #[serde(default)]
    pub tool_results: Map<String, Value>,
}

impl AgentState {
    pub fn push(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    /// The last `limit` messages, or all of them
    pub fn history(&self, limit: Option<usize>) -> &[AgentMessage] {
        match limit {
            Some(n) if n > 0 => &self.messages[self.messages.len().saturating_sub(n)..],
            _ => &self.messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_limit() {
        let mut state = AgentState::default();
        for i in 0..5 {
            state.push(AgentMessage::user(format!("m{}", i)));
        }

        assert_eq!(state.history(None).len(), 5);
        assert_eq!(state.history(Some(0)).len(), 5);
        assert_eq!(state.history(Some(2))[0].content, "m3");
        assert_eq!(state.history(Some(50)).len(), 5);
    }

    #[test]
    fn test_tool_entries_map_to_tool_turns() {
        let request = AgentMessage::tool_request("", vec![ToolCall::new("c1", "add", json!({}))]);
        let turns = request.to_chat_messages();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].requested_tool_calls().len(), 1);

        let result = AgentMessage::tool("c1", "3");
        assert_eq!(result.tool_call_id(), Some("c1"));
        let turns = result.to_chat_messages();
        assert_eq!(turns[0].role, MessageRole::Tool);
        assert_eq!(turns[0].flatten_text(), "3");
    }

    #[test]
    fn test_message_serializes_timestamp() {
        let json = serde_json::to_value(AgentMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["timestamp"].is_string());
        assert!(json.get("tool_calls").is_none());
    }
}
