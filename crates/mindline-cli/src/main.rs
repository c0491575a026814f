//! Mindline CLI entry point.
//!
//! Binary name: `mindline`
//!
//! Parses CLI arguments, resolves the credential, initializes the database
//! and relay, then dispatches to the appropriate command handler. Running
//! with no subcommand starts an interactive chat for the default session.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,mindline=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Credential resolution and store wiring happen here; a missing API key
    // aborts with an actionable message before any turn can be attempted.
    let state = AppState::init().await?;

    match cli.command.unwrap_or_default() {
        Commands::Chat { session } => {
            cli::chat::run_chat_loop(&state, &session).await?;
        }
        Commands::History { session } => {
            cli::history::show_history(&state, &session).await?;
        }
        Commands::Reset { session } => {
            cli::reset::reset_session(&state, &session).await?;
        }
    }

    Ok(())
}
