//! autopr - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use autopr::config::debug_enabled;
use autopr::workflow::require_tools;
use autopr::{SystemAuthSources, SystemRunner, Workflow};

/// Commit, push and open pull requests with Claude-written messages.
#[derive(Parser, Debug)]
#[command(name = "autopr")]
#[command(about = "Commit, push and open pull requests with Claude-written messages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage all changes and commit with a generated message
    Commit,

    /// Commit, push, and create or update the branch's pull request
    PushPr,

    /// Like push-pr, then enable squash auto-merge
    PushPrMerge,

    /// Fetch origin and create a branch from its default branch
    NewBranch {
        /// Name of the branch to create
        name: Option<String>,
    },

    /// Commit and push without touching pull requests
    CommitPush,
}

impl Command {
    fn required_tools(&self) -> &'static [&'static str] {
        match self {
            Command::Commit | Command::CommitPush | Command::NewBranch { .. } => &["git"],
            Command::PushPr | Command::PushPrMerge => &["git", "gh"],
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    require_tools(command.required_tools()).context("Missing prerequisite")?;

    let runner = SystemRunner;
    let auth = SystemAuthSources::new(&runner);
    let workflow = Workflow::new(&runner, &auth);

    match command {
        Command::Commit => {
            workflow.commit().await.context("Commit failed")?;
        }
        Command::PushPr => {
            workflow
                .push_pr(false)
                .await
                .context("Push and pull request failed")?;
        }
        Command::PushPrMerge => {
            workflow
                .push_pr(true)
                .await
                .context("Push and pull request failed")?;
        }
        Command::NewBranch { name } => {
            workflow
                .new_branch(name.as_deref())
                .await
                .context("Could not create branch")?;
        }
        Command::CommitPush => {
            workflow
                .commit_push()
                .await
                .context("Commit and push failed")?;
        }
    }

    Ok(())
}

/// Log to stderr at `warn`, or `debug` when AUTOPR_DEBUG is set.
/// RUST_LOG overrides both.
fn init_tracing() {
    let default_level = if debug_enabled() {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
