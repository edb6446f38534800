//! Model service configuration

use hireflow_core::ConfigError;
use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "HIREFLOW_API_URL";
pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_MODEL: &str = "HIREFLOW_MODEL";
pub const ENV_MAX_TOKENS: &str = "HIREFLOW_MAX_TOKENS";

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-opus-4-1";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Model service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL; requests go to `{api_url}/v1/messages`
    pub api_url: String,
    /// API key (required before any request is sent)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Upper bound on generated tokens per call
    pub max_tokens: u32,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            user_agent: format!("hireflow-agents/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ModelConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        config.api_key = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty());
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_MAX_TOKENS) {
            config.max_tokens = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MAX_TOKENS.to_string(),
                        value: raw,
                        reason: "expected a positive integer".to_string(),
                    })
                }
            };
        }
        Ok(config)
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_url.trim_end_matches('/'))
    }
}
