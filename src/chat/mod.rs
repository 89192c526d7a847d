//! Chat repository
//!
//! Persists settings, chat sessions and saved excerpts in three collections
//! of one database. The store is the only copy of this data; every read
//! goes back to it, so two handles on the same database never disagree.

use crate::error::{Result, ScribeError};
use crate::storage::{CollectionSpec, Store, StoreLocation};

pub mod types;
pub use types::{
    new_record_id, truncate_title, ChatMessage, ChatSession, Excerpt, Role, Setting, SettingKey,
    DEFAULT_SESSION_TITLE, ELLIPSIS, EXCERPT_TITLE_LEN, SESSION_TITLE_LEN,
};

/// Database name for the chat store
pub const CHAT_DB_NAME: &str = "chat";
/// Current chat schema version
pub const CHAT_DB_VERSION: u32 = 1;
/// Settings collection keyed by setting name
pub const SETTINGS: CollectionSpec = CollectionSpec::new("settings", "key");
/// Chat sessions keyed by id
pub const CHATS: CollectionSpec = CollectionSpec::new("chats", "id");
/// Saved excerpts keyed by id
pub const SAVED_MESSAGES: CollectionSpec = CollectionSpec::new("saved_messages", "id");

/// Model used until the user picks one
pub const DEFAULT_MODEL: &str = "google/gemma-3-27b-it:free";

/// Domain operations over the chat collections
#[derive(Debug, Clone)]
pub struct ChatRepository {
    store: Store,
    default_model: String,
}

impl ChatRepository {
    /// Wrap an opened store declaring [`SETTINGS`], [`CHATS`] and [`SAVED_MESSAGES`]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Open the chat database at `location`
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::StorageUnavailable` if the database cannot be opened
    pub async fn open(location: &StoreLocation) -> Result<Self> {
        let store = Store::open(
            location,
            CHAT_DB_NAME,
            CHAT_DB_VERSION,
            &[SETTINGS, CHATS, SAVED_MESSAGES],
        )
        .await?;
        Ok(Self::new(store))
    }

    /// Use a different fallback model when none is stored
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    // Settings

    /// Read a setting value
    pub async fn get_setting(&self, key: SettingKey) -> Result<Option<String>> {
        let setting: Option<Setting> = self.store.get(SETTINGS.name, key.as_str()).await?;
        Ok(setting.map(|s| s.value))
    }

    /// Create or overwrite a setting
    pub async fn set_setting(&self, key: SettingKey, value: &str) -> Result<()> {
        let setting = Setting {
            key: key.as_str().to_string(),
            value: value.to_string(),
        };
        self.store.put(SETTINGS.name, &setting).await
    }

    /// Stored credential, treating a blank value as absent
    pub async fn api_key(&self) -> Result<Option<String>> {
        Ok(self
            .get_setting(SettingKey::ApiKey)
            .await?
            .filter(|key| !key.trim().is_empty()))
    }

    /// Stored model, or the default when none was chosen
    pub async fn model(&self) -> Result<String> {
        Ok(self
            .get_setting(SettingKey::Model)
            .await?
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_model.clone()))
    }

    /// Store both settings from the setup or settings form
    ///
    /// A blank model falls back to the default. `None` keeps the stored model.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::Validation` if the credential is blank
    pub async fn save_settings(&self, api_key: &str, model: Option<&str>) -> Result<()> {
        if api_key.trim().is_empty() {
            return Err(ScribeError::Validation("API key cannot be empty".to_string()).into());
        }
        let model = match model.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            Some(_) => self.default_model.clone(),
            None => self.model().await?,
        };

        self.set_setting(SettingKey::ApiKey, api_key).await?;
        self.set_setting(SettingKey::Model, &model).await?;
        tracing::info!("Saved chat settings (model {})", model);
        Ok(())
    }

    // Sessions

    /// Create and persist an empty session
    pub async fn create_session(&self) -> Result<ChatSession> {
        let session = ChatSession::new();
        self.store.put(CHATS.name, &session).await?;
        tracing::info!("Created chat session {}", session.id);
        Ok(session)
    }

    /// Load a session by id
    pub async fn get_session(&self, id: &str) -> Result<Option<ChatSession>> {
        self.store.get(CHATS.name, id).await
    }

    /// Append a message and rewrite the session record
    ///
    /// The first message of a session also sets its title.
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::NotFound` if the session does not exist
    pub async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatSession> {
        let mut session = self.require_session(session_id).await?;
        session.messages.push(ChatMessage {
            role,
            content: content.to_string(),
        });
        session.derive_title();

        self.store.put(CHATS.name, &session).await?;
        tracing::debug!(
            "Appended {} message to {} ({} total)",
            role,
            session.id,
            session.messages.len()
        );
        Ok(session)
    }

    /// Set the title from the only message of a session
    ///
    /// Does nothing unless the session holds exactly one message, so calling it
    /// again after later messages leaves the title alone.
    pub async fn rename_from_first_message(&self, session_id: &str) -> Result<ChatSession> {
        let mut session = self.require_session(session_id).await?;
        if session.derive_title() {
            self.store.put(CHATS.name, &session).await?;
        }
        Ok(session)
    }

    /// All sessions, most recently created first
    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        let mut sessions: Vec<ChatSession> = self.store.get_all(CHATS.name).await?;
        sessions.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        Ok(sessions)
    }

    /// Remove every session
    pub async fn delete_all_sessions(&self) -> Result<()> {
        self.store.clear(CHATS.name).await?;
        tracing::info!("Deleted all chat sessions");
        Ok(())
    }

    // Excerpts

    /// Save text from an assistant reply
    pub async fn save_excerpt(&self, content: &str) -> Result<Excerpt> {
        if content.trim().is_empty() {
            return Err(ScribeError::Validation("Excerpt cannot be empty".to_string()).into());
        }
        let excerpt = Excerpt::new(content);
        self.store.put(SAVED_MESSAGES.name, &excerpt).await?;
        Ok(excerpt)
    }

    /// Load one excerpt
    pub async fn get_excerpt(&self, id: &str) -> Result<Option<Excerpt>> {
        self.store.get(SAVED_MESSAGES.name, id).await
    }

    /// All excerpts, most recently saved first
    pub async fn list_excerpts(&self) -> Result<Vec<Excerpt>> {
        let mut excerpts: Vec<Excerpt> = self.store.get_all(SAVED_MESSAGES.name).await?;
        excerpts.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        Ok(excerpts)
    }

    /// Delete one excerpt; a missing id is a no-op
    pub async fn delete_excerpt(&self, id: &str) -> Result<()> {
        self.store.delete(SAVED_MESSAGES.name, id).await
    }

    async fn require_session(&self, id: &str) -> Result<ChatSession> {
        self.get_session(id)
            .await?
            .ok_or_else(|| ScribeError::NotFound(format!("chat session {}", id)).into())
    }
}

/// Short human name for a model identifier
///
/// Keeps the last path segment, drops any `:variant` suffix and capitalizes
/// the first letter.
///
/// # Examples
///
/// ```
/// use scribe::chat::display_model_name;
///
/// assert_eq!(display_model_name("google/gemma-3-27b-it:free"), "Gemma-3-27b-it");
/// assert_eq!(display_model_name("gpt-4o"), "Gpt-4o");
/// ```
pub fn display_model_name(model: &str) -> String {
    let name = model.rsplit('/').next().unwrap_or(model);
    let name = name.split(':').next().unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::as_scribe_error;

    async fn repo() -> ChatRepository {
        ChatRepository::open(&StoreLocation::Temporary)
            .await
            .expect("open chat")
    }

    #[tokio::test]
    async fn test_settings_roundtrip_and_overwrite() {
        let chat = repo().await;
        assert!(chat.get_setting(SettingKey::ApiKey).await.unwrap().is_none());

        chat.set_setting(SettingKey::ApiKey, "sk-1").await.unwrap();
        chat.set_setting(SettingKey::ApiKey, "sk-2").await.unwrap();
        assert_eq!(
            chat.get_setting(SettingKey::ApiKey).await.unwrap().as_deref(),
            Some("sk-2")
        );
    }

    #[tokio::test]
    async fn test_model_falls_back_to_default() {
        let chat = repo().await;
        assert_eq!(chat.model().await.unwrap(), DEFAULT_MODEL);

        chat.set_setting(SettingKey::Model, "openai/gpt-4o").await.unwrap();
        assert_eq!(chat.model().await.unwrap(), "openai/gpt-4o");
    }

    #[tokio::test]
    async fn test_save_settings_requires_api_key() {
        let chat = repo().await;
        let err = chat.save_settings("  ", Some("m")).await.unwrap_err();
        assert!(matches!(
            as_scribe_error(&err),
            Some(ScribeError::Validation(_))
        ));
        assert!(chat.api_key().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_settings_blank_model_uses_default() {
        let chat = repo().await.with_default_model("local/model");
        chat.save_settings("sk-1", Some("")).await.unwrap();
        assert_eq!(chat.model().await.unwrap(), "local/model");
        assert_eq!(chat.api_key().await.unwrap().as_deref(), Some("sk-1"));
    }

    #[tokio::test]
    async fn test_save_settings_without_model_keeps_stored_model() {
        let chat = repo().await;
        chat.save_settings("sk-1", Some("openai/gpt-4o")).await.unwrap();
        chat.save_settings("sk-2", None).await.unwrap();
        assert_eq!(chat.model().await.unwrap(), "openai/gpt-4o");
        assert_eq!(chat.api_key().await.unwrap().as_deref(), Some("sk-2"));
    }

    #[tokio::test]
    async fn test_save_settings_without_model_on_fresh_store_uses_default() {
        let chat = repo().await;
        chat.save_settings("sk-1", None).await.unwrap();
        assert_eq!(chat.model().await.unwrap(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_create_session_is_persisted() {
        let chat = repo().await;
        let session = chat.create_session().await.unwrap();
        let loaded = chat.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, DEFAULT_SESSION_TITLE);
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn test_append_three_messages_in_order() {
        let chat = repo().await;
        let session = chat.create_session().await.unwrap();

        chat.append_message(&session.id, Role::User, "first").await.unwrap();
        chat.append_message(&session.id, Role::Assistant, "second").await.unwrap();
        let updated = chat
            .append_message(&session.id, Role::User, "third")
            .await
            .unwrap();

        let contents: Vec<&str> = updated.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(updated.title, "first");

        let stored = chat.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_long_first_message_truncates_title() {
        let chat = repo().await;
        let session = chat.create_session().await.unwrap();
        let message = "x".repeat(40);

        let updated = chat
            .append_message(&session.id, Role::User, &message)
            .await
            .unwrap();
        assert_eq!(updated.title, format!("{}...", "x".repeat(30)));
    }

    #[tokio::test]
    async fn test_append_to_missing_session_is_not_found() {
        let chat = repo().await;
        let err = chat
            .append_message("chat_missing", Role::User, "hi")
            .await
            .unwrap_err();
        assert!(matches!(
            as_scribe_error(&err),
            Some(ScribeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_from_first_message_is_idempotent() {
        let chat = repo().await;
        let session = chat.create_session().await.unwrap();
        chat.append_message(&session.id, Role::User, "topic").await.unwrap();
        chat.append_message(&session.id, Role::Assistant, "reply").await.unwrap();

        let renamed = chat.rename_from_first_message(&session.id).await.unwrap();
        assert_eq!(renamed.title, "topic");
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first() {
        let chat = repo().await;
        let first = chat.create_session().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = chat.create_session().await.unwrap();

        let ids: Vec<String> = chat
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_delete_all_sessions_empties_list() {
        let chat = repo().await;
        chat.create_session().await.unwrap();
        chat.create_session().await.unwrap();

        chat.delete_all_sessions().await.unwrap();
        assert!(chat.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_excerpts_lifecycle() {
        let chat = repo().await;
        let older = chat.save_excerpt("fn main() {}").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = chat.save_excerpt("SELECT * FROM notes;").await.unwrap();

        let listed = chat.list_excerpts().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);

        chat.delete_excerpt(&older.id).await.unwrap();
        assert!(chat.get_excerpt(&older.id).await.unwrap().is_none());
        assert_eq!(chat.list_excerpts().await.unwrap().len(), 1);
    }

    #[test]
    fn test_display_model_name_variants() {
        assert_eq!(display_model_name("google/gemma-3-27b-it:free"), "Gemma-3-27b-it");
        assert_eq!(display_model_name("mistral"), "Mistral");
        assert_eq!(display_model_name(""), "");
    }
}
