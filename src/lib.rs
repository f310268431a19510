//! autopr - commit, push and open pull requests with Claude-written messages.
//!
//! # Overview
//!
//! autopr drives `git`, `gh` and the Claude Code CLI: it stages changes,
//! asks Claude for a conventional commit message, commits, pushes, and opens
//! or updates a GitHub pull request with a generated title and description,
//! optionally enabling squash auto-merge.

pub mod auth;
pub mod claude;
pub mod config;
pub mod diff;
pub mod error;
pub mod exec;
pub mod git;
pub mod github;
pub mod workflow;

// Re-export commonly used types
pub use auth::{AuthMethod, AuthResult, AuthSources, SystemAuthSources};
pub use error::{AuthError, ClaudeError, ExecError, StoreError, WorkflowError};
pub use exec::{Cmd, CommandRunner, ExecOptions, ExecOutput, SystemRunner};
pub use workflow::{CommitOutcome, PullRequestOutcome, Workflow};
