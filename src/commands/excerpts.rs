use crate::app::ChatApp;
use crate::cli::ExcerptsCommand;
use crate::commands::confirm;
use crate::error::{Result, ScribeError};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle excerpt commands
pub async fn handle_excerpts(command: ExcerptsCommand, app: &ChatApp) -> Result<()> {
    let repo = app.repository();

    match command {
        ExcerptsCommand::List => {
            let excerpts = repo.list_excerpts().await?;

            if excerpts.is_empty() {
                println!("{}", "No saved excerpts.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row!["ID".bold(), "Title".bold(), "Saved".bold()]);

            for excerpt in excerpts {
                let saved = excerpt.created.format("%Y-%m-%d %H:%M").to_string();
                table.add_row(prettytable::row![excerpt.id.cyan(), excerpt.title, saved]);
            }

            println!("\nSaved Excerpts:");
            table.printstd();
            println!();
        }
        ExcerptsCommand::Show { id } => {
            let excerpt = repo
                .get_excerpt(&id)
                .await?
                .ok_or_else(|| ScribeError::NotFound(format!("excerpt {}", id)))?;
            println!("{}", excerpt.title.bold());
            println!(
                "{}",
                excerpt.created.format("%Y-%m-%d %H:%M").to_string().dimmed()
            );
            println!();
            println!("{}", excerpt.content);
        }
        ExcerptsCommand::Save { content } => {
            let excerpt = match content {
                Some(text) => repo.save_excerpt(&text).await?,
                None => app.save_last_reply().await?,
            };
            println!(
                "{}",
                format!("Saved excerpt {} ({})", excerpt.id, excerpt.title).green()
            );
        }
        ExcerptsCommand::Delete { id, yes } => {
            let excerpt = repo
                .get_excerpt(&id)
                .await?
                .ok_or_else(|| ScribeError::NotFound(format!("excerpt {}", id)))?;
            if !yes && !confirm(&format!("Delete excerpt '{}'?", excerpt.title))? {
                println!("Cancelled.");
                return Ok(());
            }
            repo.delete_excerpt(&id).await?;
            println!("{}", format!("Deleted excerpt {}", id).green());
        }
    }

    Ok(())
}
