use crate::cli::NotesCommand;
use crate::commands::{confirm, preview};
use crate::error::{Result, ScribeError};
use crate::notes::NotesRepository;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle notes commands
pub async fn handle_notes(command: NotesCommand, repo: &NotesRepository) -> Result<()> {
    match command {
        NotesCommand::List => {
            let notes = repo.list_all().await?;

            if notes.is_empty() {
                println!("{}", "No notes yet.".yellow());
                println!(
                    "Use {} to create one.",
                    "scribe notes save --title <TITLE> --body <BODY>".cyan()
                );
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row!["Title".bold(), "Body".bold()]);

            for note in notes {
                table.add_row(prettytable::row![note.title.cyan(), preview(&note.body, 50)]);
            }

            println!("\nNotes:");
            table.printstd();
            println!();
        }
        NotesCommand::Show { title } => {
            let note = repo
                .get(&title)
                .await?
                .ok_or_else(|| ScribeError::NotFound(format!("note '{}'", title)))?;
            println!("{}", note.title.bold());
            println!("{}", "-".repeat(note.title.chars().count()));
            println!("{}", note.body);
        }
        NotesCommand::Save {
            title,
            body,
            previous,
        } => {
            let note = repo.save(&title, &body, previous.as_deref()).await?;
            match previous.as_deref() {
                Some(old) if old != note.title => {
                    println!(
                        "{}",
                        format!("Renamed note '{}' to '{}'", old, note.title).green()
                    );
                }
                Some(_) => println!("{}", format!("Updated note '{}'", note.title).green()),
                None => println!("{}", format!("Saved note '{}'", note.title).green()),
            }
        }
        NotesCommand::Delete { title, yes } => {
            if repo.get(&title).await?.is_none() {
                return Err(ScribeError::NotFound(format!("note '{}'", title)).into());
            }
            if !yes && !confirm(&format!("Delete note '{}'?", title))? {
                println!("Cancelled.");
                return Ok(());
            }
            repo.remove(&title).await?;
            println!("{}", format!("Deleted note '{}'", title).green());
        }
    }

    Ok(())
}
