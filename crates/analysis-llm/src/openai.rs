//! OpenAI-compatible chat-completions backend.

use analysis_core::{AnalysisError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::ChatBackend;

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default request timeout. Analyses of a full basket are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for [`OpenAiChatBackend`].
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Chat model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `OPENAI_API_KEY`: API key (required)
    /// - `ANALYSIS_LLM_BASE_URL`: Base URL (default: OpenAI)
    /// - `ANALYSIS_LLM_MODEL`: Model name (default: `gpt-4o-mini`)
    /// - `ANALYSIS_LLM_TEMPERATURE`: Sampling temperature (default: 0.2)
    /// - `ANALYSIS_LLM_TIMEOUT_SECS`: Request timeout (default: 120)
    ///
    /// # Errors
    /// Returns [`AnalysisError::Configuration`] if the API key is not set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Configuration`] if the API key is missing or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::Configuration("OPENAI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup("ANALYSIS_LLM_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("ANALYSIS_LLM_MODEL") {
            config.model = model;
        }
        if let Some(temperature) = lookup("ANALYSIS_LLM_TEMPERATURE").and_then(|t| t.parse().ok()) {
            config.temperature = temperature;
        }
        if let Some(secs) = lookup("ANALYSIS_LLM_TIMEOUT_SECS").and_then(|t| t.parse().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Chat backend speaking the OpenAI `chat/completions` protocol.
#[derive(Clone)]
pub struct OpenAiChatBackend {
    client: Client,
    config: OpenAiConfig,
}

impl fmt::Debug for OpenAiChatBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChatBackend")
            .field("config", &self.config)
            .finish()
    }
}

impl OpenAiChatBackend {
    /// Create a new backend from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalysisError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a new backend with a custom HTTP client.
    #[must_use]
    pub const fn with_client(client: Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.config.model, "Chat completion request");

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
            return Err(AnalysisError::RateLimited {
                provider: self.name().to_string(),
                retry_after,
            });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AnalysisError::Configuration(format!(
                "{} rejected the API key (HTTP {status})",
                self.name()
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Network(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let completion: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Parse(format!("{e}: {text}")))?;

        Ok(completion.content())
    }
}

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response body, reduced to what we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    fn content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}
