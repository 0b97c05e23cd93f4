//! Generation service — the only seam that talks to a language model.
//!
//! The rest of the crate sees [`GenerationService`]: one prompt in, one text
//! completion out. The default implementation speaks the OpenAI-compatible
//! chat-completions protocol over HTTP. All typed parsing and fallback logic
//! lives in [`adapter`], above this seam.

pub mod adapter;
pub mod fallback;
pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;

pub use adapter::ContentGenerator;
pub use prompts::PromptContext;

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Text-completion seam. Implementations must be cheap to clone behind an
/// `Arc` and safe to call concurrently.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Configuration for [`OpenAiCompatService`].
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiCompatService {
    config: GenerationConfig,
    client: Client,
}

impl OpenAiCompatService {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl GenerationService for OpenAiCompatService {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout: self.config.timeout,
                    }
                } else {
                    GenerationError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed {
                reason: format!("status {status}: {body}"),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        debug!(model = %self.config.model, "generation call completed");
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse {
                reason: "no choices in response".to_string(),
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = GenerationConfig::new("sk-test")
            .with_model("gpt-4o")
            .with_base_url("http://localhost:8080/v1")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key(), "sk-test");
    }

    #[test]
    fn response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "hi there");
    }
}
