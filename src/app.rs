//! Chat controller
//!
//! `ChatApp` owns the per-run chat state: which session is current and which
//! completion request is in flight. It is created once at startup, reset by
//! `clear_history`, and everything else goes through the repository.

use crate::chat::{ChatMessage, ChatRepository, ChatSession, Excerpt, Role};
use crate::error::{Result, ScribeError};
use crate::providers::{CompletionClient, CompletionRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Text shown in place of a reply when a completion fails
pub const COMPLETION_FAILURE_NOTICE: &str = "Sorry, I encountered an error while processing your request. Please check your API key and try again.";

/// Owning controller for an interactive chat
pub struct ChatApp {
    repo: ChatRepository,
    client: Box<dyn CompletionClient>,
    current: RwLock<Option<String>>,
    in_flight: Mutex<Option<(u64, CancellationToken)>>,
    next_request: AtomicU64,
}

impl ChatApp {
    /// Create a controller with no current session
    pub fn new(repo: ChatRepository, client: Box<dyn CompletionClient>) -> Self {
        Self {
            repo,
            client,
            current: RwLock::new(None),
            in_flight: Mutex::new(None),
            next_request: AtomicU64::new(0),
        }
    }

    /// Repository backing this controller
    pub fn repository(&self) -> &ChatRepository {
        &self.repo
    }

    /// Select the most recent session, creating one if there are none
    pub async fn init(&self) -> Result<ChatSession> {
        let session = match self.repo.list_sessions().await?.into_iter().next() {
            Some(latest) => latest,
            None => self.repo.create_session().await?,
        };
        self.set_current(&session.id);
        tracing::info!("Chat initialized on session {}", session.id);
        Ok(session)
    }

    /// Start a fresh session and make it current
    pub async fn start_new_chat(&self) -> Result<ChatSession> {
        let session = self.repo.create_session().await?;
        self.set_current(&session.id);
        Ok(session)
    }

    /// Make an existing session current
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::NotFound` if the session does not exist
    pub async fn select_session(&self, id: &str) -> Result<ChatSession> {
        let session = self
            .repo
            .get_session(id)
            .await?
            .ok_or_else(|| ScribeError::NotFound(format!("chat session {}", id)))?;
        self.set_current(&session.id);
        Ok(session)
    }

    /// Id of the current session, if one was selected
    pub fn current_session_id(&self) -> Option<String> {
        self.current.read().map(|id| id.clone()).unwrap_or_default()
    }

    /// Load the current session, initializing if none is selected or it vanished
    pub async fn current_session(&self) -> Result<ChatSession> {
        if let Some(id) = self.current_session_id() {
            if let Some(session) = self.repo.get_session(&id).await? {
                return Ok(session);
            }
            tracing::warn!("Current session {} no longer exists", id);
        }
        self.init().await
    }

    /// Send a user message and record the reply
    ///
    /// The user message is persisted before the request goes out, so it stays
    /// in the session when the request fails. Sending supersedes any request
    /// still in flight.
    ///
    /// # Errors
    ///
    /// - `ScribeError::Validation` for blank input
    /// - `ScribeError::Config` when no credential is stored
    /// - `ScribeError::Completion` when the endpoint fails
    /// - `ScribeError::Cancelled` when superseded or cancelled
    pub async fn send_message(&self, text: &str) -> Result<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScribeError::Validation("Message cannot be empty".to_string()).into());
        }

        let credential = self.repo.api_key().await?.ok_or_else(|| {
            ScribeError::Config(
                "No API key configured; run `scribe settings set --api-key <KEY>`".to_string(),
            )
        })?;
        let model = self.repo.model().await?;
        let session = self.current_session().await?;

        let request = CompletionRequest::from_history(model, &session.messages, text);
        self.repo
            .append_message(&session.id, Role::User, text)
            .await?;

        let (request_id, token) = self.begin_request();
        let outcome = tokio::select! {
            _ = token.cancelled() => Err(ScribeError::Cancelled.into()),
            reply = self.client.complete(&credential, &request) => reply,
        };
        self.finish_request(request_id);

        let reply = outcome.map_err(|e| {
            tracing::warn!("Completion for session {} failed: {}", session.id, e);
            e
        })?;

        self.repo
            .append_message(&session.id, Role::Assistant, &reply.content)
            .await?;
        Ok(reply)
    }

    /// Cancel the request in flight; returns false if there was none
    pub fn cancel_in_flight(&self) -> bool {
        let token = self
            .in_flight
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .map(|(_, token)| token);
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a completion request is currently awaiting a reply
    pub fn has_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Delete every session and start over with a fresh one
    pub async fn clear_history(&self) -> Result<ChatSession> {
        self.cancel_in_flight();
        self.repo.delete_all_sessions().await?;
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        self.start_new_chat().await
    }

    /// Save the newest assistant reply of the current session as an excerpt
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::NotFound` if the session has no reply yet
    pub async fn save_last_reply(&self) -> Result<Excerpt> {
        let session = self.current_session().await?;
        let reply = session.last_reply().ok_or_else(|| {
            ScribeError::NotFound(format!("assistant reply in session {}", session.id))
        })?;
        self.repo.save_excerpt(&reply.content).await
    }

    fn set_current(&self, id: &str) {
        if let Ok(mut current) = self.current.write() {
            *current = Some(id.to_string());
        }
    }

    fn begin_request(&self) -> (u64, CancellationToken) {
        let id = self.next_request.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();
        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some((previous, old)) = slot.replace((id, token.clone())) {
                tracing::debug!("Superseding completion request {}", previous);
                old.cancel();
            }
        }
        (id, token)
    }

    fn finish_request(&self, id: u64) {
        if let Ok(mut slot) = self.in_flight.lock() {
            if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
                *slot = None;
            }
        }
    }
}
