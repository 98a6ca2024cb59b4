//! Tool management module
//!
//! Tools come from two places: local closures ([`FunctionTool`]) and MCP
//! servers discovered by the bootstrap. Both end up in a shared
//! [`ToolRegistry`] that the agent runtime reads from.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐     register_tools(.., "mcp")
//! │  McpToolBootstrap    │ ─────────────────────────────┐
//! └──────────────────────┘                              ▼
//!                                          ┌─────────────────────────┐
//!  FunctionTool ──register_tool──────────▶ │  ToolRegistry           │
//!                                          │  name → handle          │
//!                                          │  category → [name]      │
//!                                          └─────────────────────────┘
//!                                                       │
//!                                   get_llm_tools / execute_tool_call
//!                                                       ▼
//!                                          ┌─────────────────────────┐
//!                                          │  ReactAgent             │
//!                                          └─────────────────────────┘
//! ```

mod function;
mod handle;
mod registry;

pub use function::FunctionTool;
pub use handle::{SharedTool, ToolError, ToolHandle};
pub use registry::{ToolInfo, ToolRegistry, DEFAULT_CATEGORY};

pub(crate) use registry::same_handle;
