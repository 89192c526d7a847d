//! Scribe - local notes and an AI chat assistant
//!
//! This library provides the core functionality for Scribe: a document store
//! with versioned collections, the notes and chat repositories built on it,
//! a completion client for OpenAI-compatible endpoints, and the chat
//! controller that ties them together.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: Embedded document store (sled) with named, keyed collections
//! - `notes`: Notes repository keyed by title
//! - `chat`: Sessions, settings and saved excerpts
//! - `providers`: Completion client abstraction and the OpenRouter client
//! - `app`: Chat controller owning the current session and in-flight request
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use scribe::notes::NotesRepository;
//! use scribe::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/scribe.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let notes = NotesRepository::open(&config.storage.location()?).await?;
//!     notes.save("Groceries", "eggs, milk", None).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod notes;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use app::ChatApp;
pub use chat::ChatRepository;
pub use config::Config;
pub use error::{Result, ScribeError};
pub use notes::NotesRepository;

#[cfg(test)]
pub mod test_utils;
