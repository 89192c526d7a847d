use crate::chat::{display_model_name, ChatRepository};
use crate::cli::SettingsCommand;
use crate::error::Result;
use colored::Colorize;

/// Handle settings commands
pub async fn handle_settings(command: SettingsCommand, repo: &ChatRepository) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let model = repo.model().await?;
            let key_status = if repo.api_key().await?.is_some() {
                "configured".green()
            } else {
                "not set".red()
            };

            println!("Model:    {} ({})", display_model_name(&model).cyan(), model);
            println!("API key:  {}", key_status);
        }
        SettingsCommand::Set { api_key, model } => {
            repo.save_settings(&api_key, model.as_deref()).await?;
            let model = repo.model().await?;
            println!(
                "{}",
                format!("Settings saved; chatting with {}", display_model_name(&model)).green()
            );
        }
    }

    Ok(())
}
