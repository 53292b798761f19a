//! CLI for the voter vote session.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voter_core::cancel::CancelToken;
use voter_core::config;

use commands::{open_session, run_get_count, run_self_test, run_verify, run_vote, run_watch};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "voter")]
#[command(about = "voter: scrape a vote token, submit one vote, report the counter", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/voter/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file (default: ~/.local/state/voter/voter.log).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Vote once and print the result.
    Vote {
        /// Config section to vote for (default: DEFAULT).
        target: Option<String>,
    },

    /// Vote continuously, pausing `vote_interval` seconds between attempts.
    Watch {
        /// Config section to vote for (default: DEFAULT).
        target: Option<String>,
    },

    /// Check the counter pattern against a built-in sample page.
    Test {
        /// Config section whose pattern to check (default: DEFAULT).
        target: Option<String>,
    },

    /// Fetch and print the current vote count.
    #[command(name = "test_get_count")]
    TestGetCount {
        /// Config section to read (default: DEFAULT).
        target: Option<String>,
    },

    /// Vote several times with a single identifier and print each counter difference.
    #[command(name = "test_vv")]
    TestVv {
        /// Number of votes to submit.
        tries: u32,
        /// Config section to vote for (default: DEFAULT).
        target: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let file = config::load_or_init(self.config.as_deref())?;
        tracing::debug!("loaded config sections: {:?}", file.keys().collect::<Vec<_>>());

        let token = CancelToken::new();
        spawn_interrupt_listener(token.clone());

        match self.command {
            CliCommand::Test { target } => run_self_test(&file, target.as_deref()),
            CliCommand::Vote { target } => {
                let session = open_session(&file, target.as_deref(), token)?;
                blocking(move || run_vote(session)).await
            }
            CliCommand::Watch { target } => {
                let session = open_session(&file, target.as_deref(), token)?;
                blocking(move || run_watch(session)).await
            }
            CliCommand::TestGetCount { target } => {
                let session = open_session(&file, target.as_deref(), token)?;
                blocking(move || run_get_count(&session)).await
            }
            CliCommand::TestVv { tries, target } => {
                let session = open_session(&file, target.as_deref(), token)?;
                blocking(move || run_verify(&session, tries)).await
            }
        }
    }
}

/// The session blocks on curl and on its sleeps; keep it off the async workers.
async fn blocking<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Ctrl-C cancels the token, which wakes any sleep in the session.
fn spawn_interrupt_listener(token: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received interrupt signal");
            token.cancel();
        }
    });
}

#[cfg(test)]
mod tests;
