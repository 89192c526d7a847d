//! Scribe - local notes and an AI chat assistant
//!
#![doc = "Scribe - local notes and an AI chat assistant"]
#![doc = "Main entry point for the scribe command-line application."]

use anyhow::Result;
use colored::Colorize;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scribe::cli::{Cli, Commands};
use scribe::commands;
use scribe::config::Config;
use scribe::error::as_scribe_error;
use scribe::providers::create_client;
use scribe::{ChatApp, ChatRepository, NotesRepository};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        match as_scribe_error(&e) {
            Some(err) if err.is_fatal() => {
                eprintln!("{} {}", "Fatal:".red().bold(), err);
                eprintln!("Scribe cannot run without its data directory.");
                std::process::exit(2);
            }
            _ => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/scribe.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let location = config.storage.location()?;
    tracing::debug!("Using data location: {:?}", location);

    // Execute command
    match cli.command {
        Commands::Notes { command } => {
            tracing::info!("Starting notes command");
            let notes = NotesRepository::open(&location).await?;
            commands::notes::handle_notes(command, &notes).await?;
            Ok(())
        }
        Commands::Settings { command } => {
            tracing::info!("Starting settings command");
            let repo = open_chat_repository(&config, &location).await?;
            commands::settings::handle_settings(command, &repo).await?;
            Ok(())
        }
        Commands::Chat { command } => {
            tracing::info!("Starting chat command");
            let app = build_chat_app(&config, &location).await?;
            commands::chat::handle_chat(command, &app).await?;
            Ok(())
        }
        Commands::Excerpts { command } => {
            tracing::info!("Starting excerpts command");
            let app = build_chat_app(&config, &location).await?;
            commands::excerpts::handle_excerpts(command, &app).await?;
            Ok(())
        }
    }
}

async fn open_chat_repository(
    config: &Config,
    location: &scribe::storage::StoreLocation,
) -> Result<ChatRepository> {
    Ok(ChatRepository::open(location)
        .await?
        .with_default_model(config.chat.default_model.clone()))
}

async fn build_chat_app(
    config: &Config,
    location: &scribe::storage::StoreLocation,
) -> Result<ChatApp> {
    let repo = open_chat_repository(config, location).await?;
    let client = create_client(&config.chat)?;
    Ok(ChatApp::new(repo, client))
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "scribe=debug" } else { "scribe=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
