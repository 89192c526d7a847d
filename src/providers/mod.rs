//! Completion providers for Scribe
//!
//! This module contains the completion client abstraction and the
//! OpenRouter (OpenAI-compatible) implementation.

pub mod base;
pub mod openrouter;

pub use base::{CompletionClient, CompletionRequest, CONTEXT_WINDOW};
pub use openrouter::OpenRouterClient;

use crate::config::ChatConfig;
use crate::error::Result;

/// Create the completion client described by configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn create_client(config: &ChatConfig) -> Result<Box<dyn CompletionClient>> {
    Ok(Box::new(OpenRouterClient::new(config.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_from_default_config() {
        assert!(create_client(&ChatConfig::default()).is_ok());
    }
}
