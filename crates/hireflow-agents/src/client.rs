//! Messages API client
//!
//! [`Completion`] is the seam the prompted adapters talk through;
//! [`MessagesClient`] is the HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{AgentError, Result};

pub const API_VERSION: &str = "2023-06-01";

/// One system + user exchange with a language model.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks; other block kinds are ignored.
    pub(crate) fn into_text(self) -> Result<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if text.trim().is_empty() {
            return Err(AgentError::EmptyCompletion);
        }
        Ok(text)
    }
}

/// HTTP client for `{api_url}/v1/messages`
pub struct MessagesClient {
    config: ModelConfig,
    http_client: reqwest::Client,
}

impl MessagesClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: ModelConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(AgentError::MissingApiKey);
        }
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(MessagesClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl Completion for MessagesClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or(AgentError::MissingApiKey)?;
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: [UserMessage {
                role: "user",
                content: user,
            }],
        };

        debug!(model = %self.config.model, prompt_chars = user.len(), "sending completion request");
        let response = self
            .http_client
            .post(self.config.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        decode(&body)
    }
}

/// Decode a messages API response body into its text content.
pub(crate) fn decode(body: &[u8]) -> Result<String> {
    let response: MessagesResponse = serde_json::from_slice(body)?;
    response.into_text()
}
