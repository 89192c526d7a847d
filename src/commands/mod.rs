/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `notes`     - Create, rename, list and delete notes
- `chat`      - One-shot messages, the interactive chat and session listing
- `settings`  - Credential and model
- `excerpts`  - Saved assistant replies

Handlers print with `colored` and `prettytable` and leave the data work to
the repositories and `ChatApp`.
*/

use crate::error::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod chat;
pub mod excerpts;
pub mod notes;
pub mod settings;

// Special commands parser for the interactive chat
pub mod special_commands;

/// Ask a yes/no question on the terminal; anything but yes is a no
pub(crate) fn confirm(question: &str) -> Result<bool> {
    let mut rl = DefaultEditor::new()?;
    match rl.readline(&format!("{} [y/N] ", question)) {
        Ok(answer) => Ok(is_affirmative(&answer)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Shorten `text` to one line of at most `max_chars` characters for tables
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > max_chars || text.trim().lines().nth(1).is_some() {
        let cut: String = line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("nope"));
    }

    #[test]
    fn test_preview_short_single_line() {
        assert_eq!(preview("milk, eggs", 40), "milk, eggs");
    }

    #[test]
    fn test_preview_truncates_long_line() {
        assert_eq!(preview("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_preview_marks_multiline() {
        assert_eq!(preview("first\nsecond", 40), "first...");
    }
}
