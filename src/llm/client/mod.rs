//! LLM client for document summarization and tagging.
//!
//! Supports Ollama for local inference plus the OpenAI-compatible and
//! Anthropic hosted APIs.

mod config;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextGenerator;

pub use config::{LlmConfig, LlmProvider};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM client for document processing.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// OpenAI-compatible chat request (also used by Groq, Together.ai).
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
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
    content: Option<String>,
}

/// Anthropic Messages API request; shares the message shape with chat requests.
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if the configured provider can be reached.
    ///
    /// Hosted providers are considered available once an API key is present;
    /// Ollama is probed over HTTP.
    pub async fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        if self.config.provider.requires_api_key() {
            return self.config.api_key.is_some();
        }
        let url = format!("{}/api/tags", self.config.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Api(self.config.availability_hint()))
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }

    /// Call an OpenAI-compatible chat completions endpoint.
    async fn call_openai(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Call the Anthropic Messages API.
    async fn call_anthropic(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let request = AnthropicRequest {
            model: &self.config.model,
            max_tokens,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.config.endpoint);
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;
        let resp = check_status(resp).await?;

        let message: AnthropicResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(join_text_blocks(message.content))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        debug!(
            provider = self.config.provider.as_str(),
            model = %self.config.model,
            max_tokens,
            "Sending generation request"
        );
        let response = match self.config.provider {
            LlmProvider::Ollama => self.call_ollama(prompt, max_tokens).await?,
            LlmProvider::OpenAI => self.call_openai(prompt, max_tokens).await?,
            LlmProvider::Anthropic => self.call_anthropic(prompt, max_tokens).await?,
        };

        if response.trim().is_empty() {
            return Err(LlmError::Parse("Empty response from model".to_string()));
        }
        Ok(response)
    }
}

/// Turn a non-success HTTP status into an API error carrying the body.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Api(format!("HTTP {}: {}", status, body)))
}

/// Concatenate the text blocks of an Anthropic message.
fn join_text_blocks(blocks: Vec<AnthropicBlock>) -> String {
    blocks
        .into_iter()
        .filter(|b| b.kind == "text")
        .map(|b| b.text)
        .collect::<Vec<_>>()
        .join("")
}

/// Errors that can occur during LLM operations.
#[derive(Debug)]
pub enum LlmError {
    /// Failed to connect to LLM service
    Connection(String),
    /// API returned an error
    Api(String),
    /// Failed to parse response
    Parse(String),
    /// LLM is disabled
    Disabled,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Connection(msg) => write!(f, "Connection error: {}", msg),
            LlmError::Api(msg) => write!(f, "API error: {}", msg),
            LlmError::Parse(msg) => write!(f, "Parse error: {}", msg),
            LlmError::Disabled => write!(f, "LLM is disabled"),
        }
    }
}

impl std::error::Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> LlmConfig {
        LlmConfig {
            enabled: false,
            ..LlmConfig::for_provider(LlmProvider::Ollama)
        }
    }

    #[tokio::test]
    async fn test_disabled_client_refuses() {
        let client = LlmClient::new(disabled_config()).unwrap();
        assert!(!client.is_available().await);
        let err = client.generate("prompt", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::Disabled));
    }

    #[tokio::test]
    async fn test_hosted_provider_without_key_unavailable() {
        let client = LlmClient::new(LlmConfig::for_provider(LlmProvider::Anthropic)).unwrap();
        assert!(!client.is_available().await);
        let err = client.generate("prompt", 10).await.unwrap_err();
        match err {
            LlmError::Api(msg) => assert!(msg.contains("ANTHROPIC_API_KEY")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_hosted_provider_with_key_available() {
        let config = LlmConfig::for_provider(LlmProvider::OpenAI).with_api_key("sk-test");
        let client = LlmClient::new(config).unwrap();
        assert!(client.is_available().await);
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"a, b"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("a, b"));
    }

    #[test]
    fn test_anthropic_blocks_joined() {
        let body = r#"{"content":[{"type":"text","text":"Hello "},{"type":"tool_use","id":"x"},{"type":"text","text":"world"}]}"#;
        let parsed: AnthropicResponse = serde_json::from_str(body).unwrap();
        assert_eq!(join_text_blocks(parsed.content), "Hello world");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(LlmError::Disabled.to_string(), "LLM is disabled");
        assert_eq!(
            LlmError::Api("HTTP 500".to_string()).to_string(),
            "API error: HTTP 500"
        );
    }
}
