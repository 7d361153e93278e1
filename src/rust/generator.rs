use std::env;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Completion contained no content")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

/// A synchronous text-completion service.
///
/// One call produces one completion for a system instruction and a user
/// instruction. Implementations must be shareable across threads so a
/// classifier can be moved between them.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        seed: i64,
    ) -> Result<String, GeneratorError>;
}

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_MODEL` and `OPENAI_BASE_URL`, loading a
    /// `.env` file first when one is present.
    pub fn from_env() -> Result<Self, GeneratorError> {
        dotenv::dotenv().ok();

        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => return Err(GeneratorError::MissingApiKey),
        };

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("OPENAI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    seed: i64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// [`TextGenerator`] backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        info!("Using model '{}' at {}", config.model, config.base_url);
        Ok(Self { config, client })
    }

    /// Creates a generator configured from the environment
    pub fn from_env() -> Result<Self, GeneratorError> {
        Self::new(OpenAiConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

impl TextGenerator for OpenAiGenerator {
    fn generate(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        seed: i64,
    ) -> Result<String, GeneratorError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
            seed,
        };
        debug!(
            "Requesting completion: system {} bytes, user {} bytes, temperature {}",
            system.len(),
            user.len(),
            temperature
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::Api { status: status.as_u16(), body });
        }

        let completion: ChatCompletionResponse = response.json()?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GeneratorError::EmptyResponse)?;

        debug!("Received completion of {} bytes", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let config = OpenAiConfig::new("key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");

        let config = OpenAiConfig::new("key");
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("key").with_model("gpt-4o");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "hi" },
            ],
            temperature: 0.5,
            seed: 1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["seed"], 1);
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hello"}}]}"#;
        let completion: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(completion.choices[0].message.content.as_deref(), Some("hello"));
    }
}
