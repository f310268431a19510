//! Error types for autopr modules using thiserror.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from running external commands.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {} seconds", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("`{command}` exited with {}: {stderr}",
             code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// Exit code of the failed process, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

/// Errors from reading or writing the saved credential file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize credentials: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}

/// Errors from resolving AI client credentials.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(
        "An Anthropic API key is required. Set ANTHROPIC_API_KEY, run `claude` to log in, or enter a key when prompted"
    )]
    KeyRequired,

    #[error("Failed to read API key from terminal: {0}")]
    PromptFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from Claude CLI operations.
#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("Claude Code CLI not found. Install with: npm install -g @anthropic-ai/claude-code")]
    NotInstalled,

    #[error(
        "Claude timed out after {0} seconds. The diff may be too large or the API may be responding slowly"
    )]
    Timeout(u64),

    #[error("Claude returned an empty response")]
    EmptyResponse,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Any failure other than a timeout or a missing binary. A missing
    /// binary is a spawn `NotFound` or exit 127 and maps to `NotInstalled`;
    /// every other nonzero exit lands here with claude's stderr.
    #[error("Claude Code CLI failed: {0}")]
    Exec(#[source] ExecError),
}

/// Errors from the commit / push / pull request workflows.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("No staged changes found after staging. Nothing to commit")]
    NoStagedChanges,

    #[error("Branch name is required.\n\nUsage: autopr new-branch <branch-name>")]
    MissingBranchName,

    #[error("Failed to create commit")]
    CommitFailed,

    #[error("Failed to push branch '{0}'")]
    PushFailed(String),

    #[error("Failed to fetch from '{0}'")]
    FetchFailed(String),

    #[error("Failed to create branch '{0}'")]
    BranchFailed(String),

    #[error("Could not determine the current branch (detached HEAD?)")]
    DetachedHead,

    #[error("`{0}` not found on PATH")]
    MissingTool(&'static str),

    #[error("Failed to create pull request: {0}")]
    PrCreateFailed(String),

    #[error("Failed to prepare pull request body file: {0}")]
    BodyFile(#[source] std::io::Error),

    #[error(transparent)]
    Claude(#[from] ClaudeError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}
