//! Agent error types

use thiserror::Error;

use crate::providers::ProviderError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error("Model call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Reached max iterations ({0}) without a final answer")]
    MaxIterations(usize),
}

pub type AgentResult<T> = Result<T, AgentError>;
