use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Title given to a session before its first message
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";
/// Characters of the first message kept in a session title
pub const SESSION_TITLE_LEN: usize = 30;
/// Characters of the content kept in an excerpt title
pub const EXCERPT_TITLE_LEN: usize = 20;
/// Marker appended to truncated titles
pub const ELLIPSIS: &str = "...";

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing
    User,
    /// The model reply
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe::chat::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Hello!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A stored conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Time-based unique id, also the record key
    pub id: String,
    /// Display title, derived from the first message
    pub title: String,
    /// Messages in the order they were sent
    pub messages: Vec<ChatMessage>,
    /// When the session was started
    pub created: DateTime<Utc>,
}

impl ChatSession {
    /// Fresh session with no messages and the default title
    pub fn new() -> Self {
        Self {
            id: new_record_id("chat"),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Derive the title from the first message if that is the only message
    ///
    /// Returns true when the title changed.
    pub fn derive_title(&mut self) -> bool {
        if self.messages.len() != 1 {
            return false;
        }
        let title = truncate_title(&self.messages[0].content, SESSION_TITLE_LEN);
        if self.title == title {
            return false;
        }
        self.title = title;
        true
    }

    /// Most recent assistant message, if any
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A saved snippet of an assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excerpt {
    /// Time-based unique id, also the record key
    pub id: String,
    /// Short title taken from the content
    pub title: String,
    /// Saved text
    pub content: String,
    /// When the excerpt was saved
    pub created: DateTime<Utc>,
}

impl Excerpt {
    /// New excerpt stamped with the current time
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: new_record_id("msg"),
            title: truncate_title(&content, EXCERPT_TITLE_LEN),
            content,
            created: Utc::now(),
        }
    }
}

/// A stored setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Setting name, also the record key
    pub key: String,
    /// Setting value
    pub value: String,
}

/// The settings the chat front-end knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Credential sent as the bearer token
    ApiKey,
    /// Model identifier sent with each request
    Model,
}

impl SettingKey {
    /// Storage key for this setting
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Model => "model",
        }
    }
}

/// Keep the first `max_chars` characters, appending an ellipsis when cut
///
/// # Examples
///
/// ```
/// use scribe::chat::truncate_title;
///
/// assert_eq!(truncate_title("short", 30), "short");
/// assert_eq!(truncate_title("abcdefghij", 4), "abcd...");
/// ```
pub fn truncate_title(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}{}", head, ELLIPSIS)
    } else {
        head
    }
}

/// Generate a sortable time-based id such as `chat_01HZX...`
pub fn new_record_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}
