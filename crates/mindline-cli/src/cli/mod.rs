//! CLI argument definitions and command handlers.

pub mod chat;
pub mod history;
pub mod reset;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

/// Session identifier used when none is supplied.
pub const DEFAULT_SESSION: &str = "user_001";

/// Psychology-focused chat companion with durable per-session history.
#[derive(Parser)]
#[command(name = "mindline", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (default)
    Chat {
        /// Session identifier whose history to load and extend
        #[arg(
            short,
            long,
            env = "MINDLINE_SESSION",
            default_value = DEFAULT_SESSION,
            value_parser = NonEmptyStringValueParser::new()
        )]
        session: String,
    },
    /// Print the stored transcript for a session
    History {
        /// Session identifier to inspect
        #[arg(
            short,
            long,
            env = "MINDLINE_SESSION",
            default_value = DEFAULT_SESSION,
            value_parser = NonEmptyStringValueParser::new()
        )]
        session: String,
    },
    /// Delete all stored messages for a session
    Reset {
        /// Session identifier to clear
        #[arg(
            short,
            long,
            env = "MINDLINE_SESSION",
            default_value = DEFAULT_SESSION,
            value_parser = NonEmptyStringValueParser::new()
        )]
        session: String,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Chat {
            session: DEFAULT_SESSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_chat() {
        let cli = Cli::parse_from(["mindline"]);
        assert!(cli.command.is_none());
        match Commands::default() {
            Commands::Chat { session } => assert_eq!(session, DEFAULT_SESSION),
            other => panic!("unexpected default command: {other:?}"),
        }
    }

    #[test]
    fn test_session_flag_is_parsed() {
        let cli = Cli::parse_from(["mindline", "chat", "--session", "u1"]);
        match cli.command {
            Some(Commands::Chat { session }) => assert_eq!(session, "u1"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_empty_session_is_rejected() {
        let result = Cli::try_parse_from(["mindline", "reset", "--session", ""]);
        assert!(result.is_err());
    }
}
