//! Agents
//!
//! A [`ReactAgent`] pairs a [`ModelClient`](crate::providers::ModelClient)
//! with a system prompt and a set of tools from the shared
//! [`ToolRegistry`](crate::tools::ToolRegistry). [`AgentFactory`] builds
//! single agents and teams from parameters.
//!
//! ```rust,ignore
//! let factory = AgentFactory::new(Some(registry), logger);
//! let mut agent = factory.create_agent("helper", "General help", prompt, &model, vec![]);
//! let answer = agent.process_message("What changed in the last release?").await;
//! ```

mod config;
mod error;
mod factory;
mod react;
mod state;

pub use config::{
    AgentConfig, TeamMemberConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};
pub use error::{AgentError, AgentResult};
pub use factory::{AgentFactory, FactoryStatus};
pub use react::ReactAgent;
pub use state::{AgentMessage, AgentState};
