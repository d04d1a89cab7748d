//! CLI module for Reelchat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Reelchat - a movie assistant that talks to TMDB
///
/// Chat with a language model that looks up movies, people, trending and
/// top rated lists on The Movie Database.
#[derive(Parser, Debug)]
#[command(name = "reelchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "REELCHAT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Print the full turn as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one tool directly, without the model
    Call {
        /// Tool name (see `reelchat tools`)
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Show the tools offered to the model
    Tools {
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// List models offered by the configured provider
    Models,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "model.model" or "tmdb.language")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call() {
        let cli = Cli::parse_from([
            "reelchat",
            "-vv",
            "call",
            "search_by_person",
            "--args",
            r#"{"name": "Christopher Nolan", "role": "director"}"#,
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Call { tool, args } => {
                assert_eq!(tool, "search_by_person");
                assert!(args.contains("director"));
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_ask_json() {
        let cli = Cli::parse_from(["reelchat", "ask", "What's trending?", "--json"]);
        assert!(matches!(cli.command, Commands::Ask { json: true, .. }));
    }
}
