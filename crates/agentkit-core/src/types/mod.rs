//! Core types for model interactions
//!
//! Shared by the providers, the tool registry and the agent loop.

mod message;
mod tool;
mod stream;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolCall, ToolResult};
pub use stream::StreamChunk;
