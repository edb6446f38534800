//! Error types for hireflow-agents

use hireflow_core::CapabilityError;
use thiserror::Error;

/// Errors that can occur while talking to the model service
#[derive(Error, Debug)]
pub enum AgentError {
    /// No API key configured
    #[error("no API key configured (set ANTHROPIC_API_KEY)")]
    MissingApiKey,

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the service
    #[error("model service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response carried no text content
    #[error("model response contained no text")]
    EmptyCompletion,
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Http(err.to_string())
    }
}

impl From<AgentError> for CapabilityError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Http(message) => CapabilityError::Transport(message),
            AgentError::Status { status, body } => CapabilityError::Rejected { status, body },
            AgentError::EmptyCompletion => CapabilityError::EmptyResponse,
            other => CapabilityError::Other(other.to_string()),
        }
    }
}

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
