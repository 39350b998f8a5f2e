// Completion client boundary
//
// Agents talk to the language model only through `CompletionClient`.
// `OpenAiClient` is the production implementation against an
// OpenAI-compatible chat completions endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::errors::{AgentError, AgentResult};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Role in a chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Submits an ordered list of messages and returns the completion text
///
/// Implementations must fail with `AgentError::Completion` when the call
/// errors, times out, or produces no usable text. No retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> AgentResult<String>;
}

/// Builds a completion client for a caller-supplied credential
pub trait ClientFactory: Send + Sync {
    fn build(&self, api_key: &str) -> AgentResult<Arc<dyn CompletionClient>>;
}

/// Model parameters shared by every agent built from one client
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    settings: ModelSettings,
}

impl OpenAiClient {
    /// Fails with `InvalidCredential` when the key cannot be sent as a
    /// bearer authorization header
    pub fn new(api_key: impl Into<String>, settings: ModelSettings) -> AgentResult<Self> {
        let api_key = api_key.into();
        HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            AgentError::InvalidCredential(
                "key contains characters not allowed in a header".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AgentError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> AgentResult<String> {
        let request = CompletionRequest {
            model: &self.settings.model,
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        tracing::debug!(
            model = %self.settings.model,
            messages = messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Completion("request timed out".to_string())
                } else if e.is_connect() {
                    AgentError::Completion(format!("connection failed: {}", e))
                } else {
                    AgentError::Completion(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Completion(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, "Completion endpoint returned an error");
            return Err(AgentError::Completion(format!(
                "endpoint returned {}: {}",
                status, body
            )));
        }

        extract_content(&body)
    }
}

/// Pulls the first choice's text out of a chat completions envelope
fn extract_content(body: &str) -> AgentResult<String> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::Completion(format!("unparsable response envelope: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::Completion("no choices in response".to_string()))?
        .message
        .content
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(AgentError::Completion("empty completion".to_string()));
    }

    Ok(content)
}

/// Builds `OpenAiClient`s that all share one set of model settings
#[derive(Debug, Clone, Default)]
pub struct OpenAiClientFactory {
    settings: ModelSettings,
}

impl OpenAiClientFactory {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }
}

impl ClientFactory for OpenAiClientFactory {
    fn build(&self, api_key: &str) -> AgentResult<Arc<dyn CompletionClient>> {
        Ok(Arc::new(OpenAiClient::new(api_key, self.settings.clone())?))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}
