use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use scribe::chat::{ChatMessage, ChatRepository, SettingKey};
use scribe::error::{Result, ScribeError};
use scribe::providers::{CompletionClient, CompletionRequest};
use scribe::storage::StoreLocation;

#[allow(dead_code)]
pub fn temp_location() -> (StoreLocation, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let location = StoreLocation::Directory(tmp.path().to_path_buf());
    (location, tmp)
}

#[allow(dead_code)]
pub async fn chat_repo_with_key(location: &StoreLocation) -> ChatRepository {
    let repo = ChatRepository::open(location)
        .await
        .expect("failed to open chat store");
    repo.set_setting(SettingKey::ApiKey, "sk-test")
        .await
        .expect("failed to store api key");
    repo
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("scribe.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Completion client that answers from a script and records every request
///
/// Clones share the script, so keep one clone to inspect requests after
/// boxing the other into a `ChatApp`.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct ScriptedClient {
    replies: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(content.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _credential: &str, request: &CompletionRequest) -> Result<ChatMessage> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(ChatMessage::assistant(content)),
            Some(Err(message)) => Err(ScribeError::Completion(message).into()),
            None => Err(ScribeError::Completion("script exhausted".to_string()).into()),
        }
    }
}
