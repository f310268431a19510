//! Commit, push and pull request workflows.
//!
//! Each workflow is a short sequence of git, gh and claude calls that stops
//! at the first unrecoverable step. Nothing is rolled back: a run that fails
//! after committing leaves the commit in place.

pub mod branch;
pub mod commit;
pub mod preflight;
pub mod pull_request;

use crate::auth::AuthSources;
use crate::exec::CommandRunner;
use crate::git::Git;
use crate::github::GitHub;

pub use preflight::require_tools;

/// What the commit step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The working tree was clean.
    NothingToCommit,
    Committed {
        message: String,
        /// Open PR for the branch, when one exists.
        pr_url: Option<String>,
    },
}

/// Whether a PR was opened or an existing one refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    Created { url: String },
    Updated { url: String },
}

impl PullRequestOutcome {
    pub fn url(&self) -> &str {
        match self {
            PullRequestOutcome::Created { url } | PullRequestOutcome::Updated { url } => url,
        }
    }
}

/// Result of the push-and-PR workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPrReport {
    pub commit: CommitOutcome,
    pub pull_request: PullRequestOutcome,
    /// `None` when auto-merge was not requested.
    pub automerge: Option<bool>,
}

/// Result of the commit-and-push workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPushReport {
    pub commit: CommitOutcome,
    pub branch: String,
    pub pr_url: Option<String>,
}

/// Entry point for all workflows.
///
/// Borrows the command runner and credential sources so the same pair can be
/// shared by workflows that build on one another.
pub struct Workflow<'a, R: CommandRunner + ?Sized, S: AuthSources + ?Sized> {
    runner: &'a R,
    auth: &'a S,
}

impl<'a, R: CommandRunner + ?Sized, S: AuthSources + ?Sized> Workflow<'a, R, S> {
    pub fn new(runner: &'a R, auth: &'a S) -> Self {
        Self { runner, auth }
    }

    fn git(&self) -> Git<'a, R> {
        Git::new(self.runner)
    }

    fn github(&self) -> GitHub<'a, R> {
        GitHub::new(self.runner)
    }
}
