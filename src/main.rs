//! force-rebase - rebase Gerrit changes from their download command
//!
//! CLI binary that validates a pasted `git fetch ... && git checkout ...`
//! snippet and force-rebases the change onto `master` or `main`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use force_rebase::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "force-rebase")]
#[command(about = "Force-rebase a Gerrit change onto its target branch")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebase a change and push it for review
    Rebase {
        /// Gerrit download command (`git fetch ... && git checkout -b change-N FETCH_HEAD`)
        snippet: String,

        /// Branch to rebase onto (`master` or `main`)
        #[arg(short, long, default_value = "master")]
        branch: String,

        /// Operator login token
        #[arg(long, env = "FORCE_REBASE_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Show the commands a rebase would run, without running them
    Preview {
        /// Gerrit download command
        snippet: String,

        /// Branch to rebase onto (`master` or `main`)
        #[arg(short, long, default_value = "master")]
        branch: String,
    },

    /// Print a configuration setting
    Setting {
        /// Setting name, e.g. `gerrit-account-name`
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Rebase {
            snippet,
            branch,
            token,
        } => {
            cli::run_rebase(&config, &snippet, &branch, token.as_deref()).await?;
        }
        Commands::Preview { snippet, branch } => {
            cli::run_preview(&config, &snippet, &branch)?;
        }
        Commands::Setting { name } => {
            cli::run_setting(&config, &name)?;
        }
    }

    Ok(())
}
