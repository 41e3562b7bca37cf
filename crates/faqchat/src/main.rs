// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! faqchat - a terminal FAQ assistant backed by local Ollama models.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod bootstrap;
mod commands;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// faqchat - answer frequently asked questions with a local model.
#[derive(Parser, Debug)]
#[command(name = "faqchat", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this TOML file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat interactively (default).
    Shell,
    /// Print the FAQ entries matching a question as JSON.
    Faq {
        /// The question to look up.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Describe an image given by URL or local path.
    Describe {
        /// Image URL, `file://` URL, or filesystem path.
        image: String,
    },
    /// Pull the configured models and print their details.
    Models,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => faqchat_config::load_and_validate_path(path),
        None => faqchat_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            faqchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => commands::shell(config).await,
        Commands::Faq { question } => commands::faq(config, &question.join(" ")).await,
        Commands::Describe { image } => commands::describe(config, &image).await,
        Commands::Models => commands::models(config).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so they never interleave with JSON printed by `faq`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("faqchat={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn shell_is_the_default_command() {
        let cli = Cli::try_parse_from(["faqchat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn faq_joins_question_words() {
        let cli =
            Cli::try_parse_from(["faqchat", "faq", "how", "do", "refunds", "work"]).unwrap();
        match cli.command {
            Some(Commands::Faq { question }) => {
                assert_eq!(question.join(" "), "how do refunds work")
            }
            other => panic!("expected faq, got {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["faqchat", "models", "--config", "/tmp/f.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/f.toml")));
        assert!(matches!(cli.command, Some(Commands::Models)));
    }

    #[test]
    fn faq_requires_a_question() {
        assert!(Cli::try_parse_from(["faqchat", "faq"]).is_err());
    }
}
