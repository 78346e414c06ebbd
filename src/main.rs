//! Meetlist - virtual-classroom session registry CLI
//!
#![doc = "Meetlist - virtual-classroom session registry CLI"]
#![doc = "Main entry point for the meetlist command."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meetlist::auth::{resolve_token, TokenStore};
use meetlist::cli::{Cli, Commands, SessionCommand};
use meetlist::commands;
use meetlist::config::Config;
use meetlist::session::SessionPatch;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Sessions { command } => {
            let token = resolve_token(cli.token.as_deref(), &TokenStore::default());
            match command {
                SessionCommand::List { window, json } => {
                    tracing::info!("Listing sessions");
                    commands::sessions::list_sessions(&config, token.as_deref(), window, json)
                        .await?;
                }
                SessionCommand::Update {
                    id,
                    sujet,
                    class_nom,
                    date,
                    duration,
                    expected_attendees,
                } => {
                    tracing::info!("Updating session {}", id);
                    let patch = SessionPatch {
                        sujet,
                        class_nom,
                        date_creation: date,
                        duration,
                        expected_attendees,
                    };
                    commands::sessions::update_session(&config, token.as_deref(), &id, patch)
                        .await?;
                }
                SessionCommand::Delete { id } => {
                    tracing::info!("Deleting session {}", id);
                    commands::sessions::delete_session(&config, token.as_deref(), &id).await?;
                }
            }
            Ok(())
        }
        Commands::Auth { command } => {
            commands::auth::handle_auth(command, cli.token.as_deref())?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_directive = if verbose { "meetlist=debug" } else { "meetlist=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
