//! Server descriptors and their validation
//!
//! Descriptors arrive as untyped JSON (usually the `mcpServers` block of a
//! config file). Validation never fails: entries without a launch directive
//! or a transport are logged and dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::logging::Logger;

/// How a server is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    /// Child process speaking over stdin/stdout
    Stdio,
    Sse,
    /// Streamable HTTP
    Http,
    /// Anything else; kept so the connection engine can reject it
    Other(String),
}

impl TransportKind {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => TransportKind::Stdio,
            "sse" => TransportKind::Sse,
            "http" | "streamable_http" | "streamable-http" => TransportKind::Http,
            _ => TransportKind::Other(value.to_string()),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, TransportKind::Sse | TransportKind::Http)
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Stdio => f.write_str("stdio"),
            TransportKind::Sse => f.write_str("sse"),
            TransportKind::Http => f.write_str("http"),
            TransportKind::Other(other) => f.write_str(other),
        }
    }
}

/// Launch directive: a command line, an argv array, or a URL for network transports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    Line(String),
    Argv(Vec<String>),
}

impl LaunchCommand {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(LaunchCommand::Line(s.trim().to_string())),
            Value::Array(items) => {
                let argv = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()?;
                if argv.first().is_some_and(|program| !program.trim().is_empty()) {
                    Some(LaunchCommand::Argv(argv))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Split into program and leading arguments
    pub fn program_and_args(&self) -> (String, Vec<String>) {
        let parts: Vec<String> = match self {
            LaunchCommand::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            LaunchCommand::Argv(argv) => argv.clone(),
        };
        let mut parts = parts.into_iter();
        let program = parts.next().unwrap_or_default();
        (program, parts.collect())
    }

    /// The directive as one string (the URL for network transports)
    pub fn as_line(&self) -> String {
        match self {
            LaunchCommand::Line(line) => line.clone(),
            LaunchCommand::Argv(argv) => argv.join(" "),
        }
    }
}

/// A validated server entry
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDescriptor {
    pub name: String,
    pub launch: LaunchCommand,
    pub transport: TransportKind,
    /// Every other key of the raw entry, passed through untouched
    pub extra: Map<String, Value>,
}

const LAUNCH_KEYS: [&str; 2] = ["command", "launch"];

impl ServerDescriptor {
    /// Build a descriptor from a raw entry, or explain why it is invalid
    pub fn from_value(name: &str, raw: &Value) -> Result<Self, String> {
        let entry = raw
            .as_object()
            .ok_or_else(|| "descriptor is not an object".to_string())?;

        let transport = match entry.get("transport") {
            Some(Value::String(s)) if !s.trim().is_empty() => TransportKind::parse(s),
            Some(_) => return Err("transport must be a non-empty string".to_string()),
            None => return Err("missing transport".to_string()),
        };

        let mut launch_key = LAUNCH_KEYS.iter().copied().find(|k| entry.contains_key(*k));
        if launch_key.is_none() && transport.is_network() && entry.contains_key("url") {
            launch_key = Some("url");
        }
        let launch_key = launch_key.ok_or_else(|| "missing launch command".to_string())?;
        let launch = entry
            .get(launch_key)
            .and_then(LaunchCommand::from_value)
            .ok_or_else(|| format!("'{}' must be a non-empty string or string array", launch_key))?;

        let extra = entry
            .iter()
            .filter(|(k, _)| k.as_str() != "transport" && k.as_str() != launch_key)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            name: name.to_string(),
            launch,
            transport,
            extra,
        })
    }

    /// Extra `args` appended after the launch command (stdio)
    pub fn extra_args(&self) -> Vec<String> {
        self.extra
            .get("args")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    /// Environment variables for the child process (stdio)
    pub fn env(&self) -> BTreeMap<String, String> {
        self.extra
            .get("env")
            .and_then(Value::as_object)
            .map(|vars| {
                vars.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Working directory for the child process (stdio)
    pub fn cwd(&self) -> Option<PathBuf> {
        self.extra
            .get("cwd")
            .or_else(|| self.extra.get("workdir"))
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }
}

/// Outcome of validating a descriptor mapping
#[derive(Debug, Clone, Default)]
pub struct ValidatedServers {
    pub valid: BTreeMap<String, ServerDescriptor>,
    pub invalid: BTreeSet<String>,
}

impl ValidatedServers {
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }
}

/// Split a raw descriptor mapping into valid descriptors and rejected names
pub fn validate_descriptors(raw: &Map<String, Value>, logger: &dyn Logger) -> ValidatedServers {
    let mut validated = ValidatedServers::default();

    for (name, entry) in raw {
        match ServerDescriptor::from_value(name, entry) {
            Ok(descriptor) => {
                logger.debug(&format!(
                    "[McpBootstrap] Server '{}' is valid ({})",
                    name, descriptor.transport
                ));
                validated.valid.insert(name.clone(), descriptor);
            }
            Err(reason) => {
                logger.warn(&format!(
                    "[McpBootstrap] Skipping server '{}': {}",
                    name, reason
                ));
                validated.invalid.insert(name.clone());
            }
        }
    }

    validated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger};
    use serde_json::json;

    fn servers(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_transport_aliases() {
        assert_eq!(TransportKind::parse("stdio"), TransportKind::Stdio);
        assert_eq!(TransportKind::parse("SSE"), TransportKind::Sse);
        assert_eq!(TransportKind::parse("streamable_http"), TransportKind::Http);
        assert_eq!(TransportKind::parse("streamable-http"), TransportKind::Http);
        assert_eq!(
            TransportKind::parse("websocket"),
            TransportKind::Other("websocket".into())
        );
    }

    #[test]
    fn test_validation_splits_valid_and_invalid() {
        let logger = MemoryLogger::new();
        let raw = servers(json!({
            "math": {"command": "python", "args": ["math.py"], "transport": "stdio"},
            "weather": {"url": "http://localhost:8000/mcp", "transport": "streamable_http"},
            "argv": {"launch": ["node", "server.js"], "transport": "stdio"},
            "no_transport": {"command": "python"},
            "no_command": {"transport": "stdio"},
            "url_on_stdio": {"url": "http://x", "transport": "stdio"},
            "empty_command": {"command": "  ", "transport": "stdio"},
            "not_an_object": "python server.py"
        }));

        let validated = validate_descriptors(&raw, &logger);

        assert_eq!(
            validated.valid.keys().cloned().collect::<Vec<_>>(),
            vec!["argv", "math", "weather"]
        );
        assert_eq!(validated.invalid.len(), 5);
        assert!(validated.invalid.contains("not_an_object"));
        assert!(logger.contains(LogLevel::Warn, "no_transport"));
        assert!(logger.contains(LogLevel::Warn, "url_on_stdio"));
    }

    #[test]
    fn test_extra_fields_are_passed_through() {
        let descriptor = ServerDescriptor::from_value(
            "fs",
            &json!({
                "command": "npx -y @modelcontextprotocol/server-filesystem",
                "transport": "stdio",
                "args": ["/tmp"],
                "env": {"DEBUG": "1", "IGNORED": 3},
                "cwd": "/srv",
                "custom": {"anything": true}
            }),
        )
        .unwrap();

        let (program, args) = descriptor.launch.program_and_args();
        assert_eq!(program, "npx");
        assert_eq!(args, vec!["-y", "@modelcontextprotocol/server-filesystem"]);
        assert_eq!(descriptor.extra_args(), vec!["/tmp"]);
        assert_eq!(descriptor.env().len(), 1);
        assert_eq!(descriptor.cwd(), Some(PathBuf::from("/srv")));
        assert!(descriptor.extra.contains_key("custom"));
        assert!(!descriptor.extra.contains_key("command"));
        assert!(!descriptor.extra.contains_key("transport"));
    }

    #[test]
    fn test_empty_mapping() {
        let validated = validate_descriptors(&Map::new(), &MemoryLogger::new());
        assert!(validated.is_empty());
        assert!(validated.invalid.is_empty());
    }
}
