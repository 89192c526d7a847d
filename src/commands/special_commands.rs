//! Special commands parser for the interactive chat
//!
//! Lines starting with `/` control the session instead of being sent to the
//! assistant. Command names are case-insensitive; arguments are kept as typed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during an interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new session
    NewChat,

    /// List sessions
    ListSessions,

    /// Switch to another session by id
    SwitchSession(String),

    /// Save the latest assistant reply as an excerpt
    SaveReply,

    /// Delete every session and start over
    ClearHistory,

    /// Display help information
    Help,

    /// Leave the chat
    Exit,

    /// Not a special command; send it to the assistant
    None,
}

/// Parse a line of REPL input
///
/// # Examples
///
/// ```
/// use scribe::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(
///     parse_special_command("/switch chat_01J").unwrap(),
///     SpecialCommand::SwitchSession("chat_01J".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (head, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };
    let name = head.to_lowercase();

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewChat),
        "/sessions" | "/history" => Ok(SpecialCommand::ListSessions),
        "/switch" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/switch".to_string(),
                    usage: "/switch <session_id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::SwitchSession(arg.to_string()))
            }
        }
        "/save" => Ok(SpecialCommand::SaveReply),
        "/clear" => Ok(SpecialCommand::ClearHistory),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the list of special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

SESSIONS:
  /new             - Start a new chat session
  /sessions        - List chat sessions
  /switch <id>     - Continue an earlier session
  /clear           - Delete every session and start over

EXCERPTS:
  /save            - Save the last assistant reply as an excerpt

OTHER:
  /help            - Show this help message
  /exit, /quit     - Leave the chat (also: exit, quit, Ctrl-D)
"#
    );
}
