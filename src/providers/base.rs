//! Completion client trait and request payload
//!
//! This module defines the CompletionClient trait that every chat backend
//! implements, along with the request body sent to the endpoint.

use crate::chat::ChatMessage;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Number of prior messages sent with each request
pub const CONTEXT_WINDOW: usize = 10;

/// Body of a chat completion request
///
/// Serializes to `{"model": ..., "messages": [{"role": ..., "content": ...}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Context window followed by the new user message
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Build a request from a session's history and a new user message
    ///
    /// Only the last [`CONTEXT_WINDOW`] messages of `history` are included,
    /// oldest first, with the new message appended at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe::chat::ChatMessage;
    /// use scribe::providers::CompletionRequest;
    ///
    /// let history: Vec<ChatMessage> = (0..15).map(|i| ChatMessage::user(i.to_string())).collect();
    /// let request = CompletionRequest::from_history("m", &history, "next");
    /// assert_eq!(request.messages.len(), 11);
    /// assert_eq!(request.messages[0].content, "5");
    /// assert_eq!(request.messages[10].content, "next");
    /// ```
    pub fn from_history(
        model: impl Into<String>,
        history: &[ChatMessage],
        new_message: impl Into<String>,
    ) -> Self {
        let start = history.len().saturating_sub(CONTEXT_WINDOW);
        let mut messages = Vec::with_capacity(history.len() - start + 1);
        messages.extend_from_slice(&history[start..]);
        messages.push(ChatMessage::user(new_message));

        Self {
            model: model.into(),
            messages,
        }
    }
}

/// Client for a remote chat completion endpoint
///
/// Implementations send one request and return the single assistant message
/// from the reply. They do not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `request` authenticated with `credential`
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::Completion` when the endpoint reports an error,
    /// the response cannot be parsed, or the request never reaches the server.
    async fn complete(&self, credential: &str, request: &CompletionRequest) -> Result<ChatMessage>;
}
