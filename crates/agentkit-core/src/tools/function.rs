//! Closure-backed tools

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

use super::handle::{SharedTool, ToolError, ToolHandle};

type ToolFn = dyn Fn(Value) -> BoxFuture<'static, Result<String, ToolError>> + Send + Sync;

/// A tool implemented by an async closure
///
/// # Example
///
/// ```rust,ignore
/// let clock = FunctionTool::new("clock", "Current UTC time", |_args| async {
///     Ok(chrono::Utc::now().to_rfc3339())
/// });
/// registry.register_tool(clock.shared(), "general");
/// ```
pub struct FunctionTool {
    name: String,
    description: String,
    schema: Value,
    func: Arc<ToolFn>,
}

impl FunctionTool {
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema: json!({ "type": "object", "properties": {} }),
            func: Arc::new(move |args| func(args).boxed()),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn shared(self) -> SharedTool {
        Arc::new(self)
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl ToolHandle for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    async fn invoke(&self, arguments: Value) -> Result<String, ToolError> {
        (self.func)(arguments).await
    }
}
