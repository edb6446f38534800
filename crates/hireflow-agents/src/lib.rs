//! Hireflow Agents
//!
//! Language-model implementations of the hireflow-core capability traits,
//! talking to a messages-style HTTP API.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod prompts;

pub use adapters::{
    AgentPanel, PromptedClarifier, PromptedEvaluator, PromptedJudge, PromptedMediator,
};
pub use client::{Completion, MessagesClient};
pub use config::ModelConfig;
pub use error::{AgentError, Result};
