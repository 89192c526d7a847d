//! OpenRouter completion client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; the default
//! base URL points at OpenRouter. One POST per call, bearer authentication,
//! no retries.

use crate::chat::ChatMessage;
use crate::config::ChatConfig;
use crate::error::{Result, ScribeError};
use crate::providers::{CompletionClient, CompletionRequest};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// HTTP client for an OpenAI-compatible completion endpoint
///
/// # Examples
///
/// ```no_run
/// use scribe::config::ChatConfig;
/// use scribe::providers::{CompletionClient, CompletionRequest, OpenRouterClient};
///
/// # async fn example() -> scribe::error::Result<()> {
/// let client = OpenRouterClient::new(ChatConfig::default())?;
/// let request = CompletionRequest::from_history("google/gemma-3-27b-it:free", &[], "Hello!");
/// let reply = client.complete("sk-or-...", &request).await?;
/// println!("{}", reply.content);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
}

/// Successful response body
#[derive(Debug, Deserialize)]
struct CompletionResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenRouterClient {
    /// Create a client from chat configuration
    ///
    /// A timeout is applied only when `timeout_seconds` is set.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ChatConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("scribe/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(|e| {
            ScribeError::Config(format!("Failed to create HTTP client: {}", e))
        })?;

        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
        tracing::debug!("Initialized completion client: endpoint={}", endpoint);

        Ok(Self { client, endpoint })
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, credential: &str, request: &CompletionRequest) -> Result<ChatMessage> {
        tracing::debug!(
            "Sending completion request: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                if e.is_timeout() {
                    ScribeError::Completion("request timed out".to_string())
                } else {
                    ScribeError::Completion(format!("transport failure: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => format!(
                    "HTTP error! status: {} - {}",
                    status.as_u16(),
                    envelope.error.message
                ),
                Err(_) => format!("request failed with status {}", status.as_u16()),
            };
            tracing::error!("Completion endpoint returned {}: {}", status, message);
            return Err(ScribeError::Completion(message).into());
        }

        let body: CompletionResponseBody = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            ScribeError::Completion(format!("failed to parse response: {}", e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScribeError::Completion("response contained no message".to_string()))?;

        Ok(ChatMessage::assistant(content))
    }
}
