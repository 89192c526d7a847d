//! Chat command handler
//!
//! One-shot sends, session listing and the readline-based interactive chat.
//! The interactive chat asks for an API key once when none is stored.

use crate::app::{ChatApp, COMPLETION_FAILURE_NOTICE};
use crate::chat::{display_model_name, ChatMessage, ChatSession, Role};
use crate::cli::ChatCommand;
use crate::commands::confirm;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::error::{as_scribe_error, Result, ScribeError};
use colored::Colorize;
use prettytable::{format, Table};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Handle chat commands
pub async fn handle_chat(command: ChatCommand, app: &ChatApp) -> Result<()> {
    match command {
        ChatCommand::Send { message } => {
            app.init().await?;
            match app.send_message(&message).await {
                Ok(reply) => print_message(&reply),
                Err(e) => {
                    print_failure(&e);
                    return Err(e);
                }
            }
        }
        ChatCommand::Repl => run_repl(app).await?,
        ChatCommand::New => {
            let session = app.start_new_chat().await?;
            println!("{}", format!("Started session {}", session.id).green());
        }
        ChatCommand::Sessions => print_sessions(app).await?,
        ChatCommand::Show { id } => {
            let session = match id {
                Some(id) => app.select_session(&id).await?,
                None => app.init().await?,
            };
            print_transcript(&session);
        }
        ChatCommand::Clear { yes } => {
            if !yes && !confirm("Delete every chat session?")? {
                println!("Cancelled.");
                return Ok(());
            }
            let session = app.clear_history().await?;
            println!(
                "{}",
                format!("Chat history cleared; new session {}", session.id).green()
            );
        }
    }

    Ok(())
}

/// Run the interactive chat until the user exits
async fn run_repl(app: &ChatApp) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    if app.repository().api_key().await?.is_none() && !run_setup(app, &mut rl).await? {
        println!("An API key is required to chat. Goodbye!");
        return Ok(());
    }

    let session = app.init().await?;
    let model = app.repository().model().await?;
    print_welcome_banner(&display_model_name(&model), &session);

    loop {
        match rl.readline(&format!("{} ", "you>".green().bold())) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::None) => {}
                    Ok(SpecialCommand::Exit) => break,
                    Ok(command) => {
                        if let Err(e) = run_special_command(app, command).await {
                            eprintln!("{}", format!("Error: {}", e).red());
                        }
                        continue;
                    }
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                }

                let outcome = tokio::select! {
                    reply = app.send_message(trimmed) => Some(reply),
                    _ = tokio::signal::ctrl_c() => None,
                };
                match outcome {
                    Some(Ok(reply)) => print_message(&reply),
                    Some(Err(e)) => print_failure(&e),
                    None => {
                        app.cancel_in_flight();
                        println!("{}", "(request cancelled)".dimmed());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Ask for the credential and model; false if the user backs out
async fn run_setup(app: &ChatApp, rl: &mut DefaultEditor) -> Result<bool> {
    println!("{}", "No API key configured.".yellow());
    println!("Get one at https://openrouter.ai/keys and paste it below.\n");

    let api_key = match rl.readline("API key: ") {
        Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
        Ok(_) | Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    let default_model = app.repository().model().await?;
    let model = match rl.readline(&format!("Model [{}]: ", default_model)) {
        Ok(model) => model,
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    app.repository()
        .save_settings(&api_key, Some(model.as_str()))
        .await?;
    println!("{}\n", "Settings saved.".green());
    Ok(true)
}

async fn run_special_command(app: &ChatApp, command: SpecialCommand) -> Result<()> {
    match command {
        SpecialCommand::NewChat => {
            let session = app.start_new_chat().await?;
            println!("{}", format!("Started session {}", session.id).green());
        }
        SpecialCommand::ListSessions => print_sessions(app).await?,
        SpecialCommand::SwitchSession(id) => {
            let session = app.select_session(&id).await?;
            print_transcript(&session);
        }
        SpecialCommand::SaveReply => {
            let excerpt = app.save_last_reply().await?;
            println!("{}", format!("Saved excerpt '{}'", excerpt.title).green());
        }
        SpecialCommand::ClearHistory => {
            if confirm("Delete every chat session?")? {
                let session = app.clear_history().await?;
                println!("{}", format!("History cleared; new session {}", session.id).green());
            }
        }
        SpecialCommand::Help => print_help(),
        SpecialCommand::Exit | SpecialCommand::None => {}
    }
    Ok(())
}

async fn print_sessions(app: &ChatApp) -> Result<()> {
    let sessions = app.repository().list_sessions().await?;

    if sessions.is_empty() {
        println!("{}", "No chat sessions found.".yellow());
        return Ok(());
    }

    let current = app.current_session_id();
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Created".bold()
    ]);

    for session in sessions {
        let marker = if current.as_deref() == Some(session.id.as_str()) {
            "*"
        } else {
            ""
        };
        let created = session.created.format("%Y-%m-%d %H:%M").to_string();
        table.add_row(prettytable::row![
            format!("{}{}", session.id, marker).cyan(),
            session.title,
            session.messages.len(),
            created
        ]);
    }

    println!("\nChat Sessions:");
    table.printstd();
    println!();
    println!(
        "Use {} to read a session.",
        "scribe chat show <ID>".cyan()
    );
    println!();
    Ok(())
}

fn print_transcript(session: &ChatSession) {
    println!("\n{} ({})", session.title.bold(), session.id.dimmed());
    if session.messages.is_empty() {
        println!("{}", "No messages yet.".yellow());
    }
    for message in &session.messages {
        print_message(message);
    }
    println!();
}

fn print_message(message: &ChatMessage) {
    match message.role {
        Role::User => println!("{} {}", "you>".green().bold(), message.content),
        Role::Assistant => println!("{} {}\n", "assistant>".cyan().bold(), message.content),
    }
}

fn print_failure(err: &anyhow::Error) {
    match as_scribe_error(err) {
        Some(ScribeError::Completion(detail)) => {
            println!(
                "{} {}",
                "assistant>".cyan().bold(),
                COMPLETION_FAILURE_NOTICE.red()
            );
            println!("{}\n", format!("({})", detail).dimmed());
        }
        Some(ScribeError::Cancelled) => println!("{}", "(request cancelled)".dimmed()),
        Some(ScribeError::Config(msg)) => eprintln!("{}", msg.yellow()),
        _ => eprintln!("{}", format!("Error: {}", err).red()),
    }
}

fn print_welcome_banner(model: &str, session: &ChatSession) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Scribe Chat - Welcome!                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Model:    {}", model.cyan());
    println!("Session:  {} ({} messages)", session.title, session.messages.len());
    println!("Type '/help' for available commands, 'exit' to quit\n");
}
