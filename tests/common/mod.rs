//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use autopr::auth::SessionProbe;
use autopr::error::{AuthError, StoreError};
use autopr::{AuthSources, Cmd, CommandRunner, ExecError, ExecOptions, ExecOutput};

/// Canned reply for a scripted command.
#[derive(Clone)]
enum Reply {
    Output(ExecOutput),
    /// Time out after whatever the caller configured.
    Timeout,
    NotFound,
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub cmd: Cmd,
    pub options: ExecOptions,
    /// Path passed via `--body-file`, if any.
    pub body_path: Option<PathBuf>,
    /// Contents of the body file at call time.
    pub body: Option<String>,
}

impl Call {
    pub fn line(&self) -> String {
        self.cmd.to_string()
    }
}

/// A [`CommandRunner`] that answers from a script and records every call.
///
/// Replies are matched by command prefix, longest prefix first. Commands
/// with no matching rule succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<(Vec<String>, Reply)>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn rule(mut self, prefix: &[&str], reply: Reply) -> Self {
        self.rules
            .push((prefix.iter().map(|s| s.to_string()).collect(), reply));
        self
    }

    /// Succeed with `stdout`.
    pub fn ok(self, prefix: &[&str], stdout: &str) -> Self {
        self.rule(prefix, Reply::Output(ExecOutput::ok(stdout)))
    }

    /// Exit with `code` and `stderr`.
    pub fn fail(self, prefix: &[&str], code: i32, stderr: &str) -> Self {
        self.rule(prefix, Reply::Output(ExecOutput::failed(code, stderr)))
    }

    pub fn timeout(self, prefix: &[&str]) -> Self {
        self.rule(prefix, Reply::Timeout)
    }

    pub fn not_found(self, prefix: &[&str]) -> Self {
        self.rule(prefix, Reply::NotFound)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(Call::line).collect()
    }

    /// Calls whose command line starts with `prefix`.
    pub fn calls_to(&self, prefix: &[&str]) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.cmd.starts_with(prefix))
            .collect()
    }

    pub fn called(&self, prefix: &[&str]) -> bool {
        !self.calls_to(prefix).is_empty()
    }

    fn reply_for(&self, cmd: &Cmd) -> Option<Reply> {
        self.rules
            .iter()
            .filter(|(prefix, _)| {
                let words: Vec<&str> = prefix.iter().map(String::as_str).collect();
                cmd.starts_with(&words)
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, reply)| reply.clone())
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, cmd: &Cmd, options: &ExecOptions) -> Result<ExecOutput, ExecError> {
        let body_path = cmd.flag_value("--body-file").map(PathBuf::from);
        let body = body_path
            .as_ref()
            .and_then(|p| std::fs::read_to_string(p).ok());
        self.calls.lock().unwrap().push(Call {
            cmd: cmd.clone(),
            options: options.clone(),
            body_path,
            body,
        });

        match self.reply_for(cmd) {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Timeout) => Err(ExecError::Timeout {
                command: cmd.to_string(),
                timeout: options.timeout.unwrap_or(Duration::from_secs(0)),
            }),
            Some(Reply::NotFound) => Err(ExecError::SpawnFailed {
                command: cmd.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            None => Ok(ExecOutput::ok("")),
        }
    }
}

/// Credentials from a logged-in `claude` session. Nothing else is consulted.
pub struct SessionAuth;

#[async_trait]
impl AuthSources for SessionAuth {
    fn env_key(&self) -> Option<String> {
        None
    }

    async fn probe_session(&self) -> SessionProbe {
        SessionProbe::Available
    }

    fn saved_key(&self) -> Option<String> {
        panic!("saved key must not be read when a session exists")
    }

    async fn prompt_key(&self) -> Result<String, AuthError> {
        panic!("prompt must not be shown when a session exists")
    }

    fn persist_key(&self, _key: &str) -> Result<(), StoreError> {
        panic!("nothing to persist when a session exists")
    }
}

/// A repository with one modified, already-staged file on `feature-x`.
pub fn dirty_repo() -> FakeRunner {
    FakeRunner::new()
        .ok(&["git", "status", "--porcelain"], " M src/widget.rs\n")
        .ok(&["git", "diff", "--cached", "--name-only"], "src/widget.rs\n")
        .ok(
            &["git", "diff", "--cached"],
            "diff --git a/src/widget.rs b/src/widget.rs\n--- a/src/widget.rs\n+++ b/src/widget.rs\n@@ -1 +1,2 @@\n+pub struct Widget;\n",
        )
        .ok(&["git", "rev-parse", "--abbrev-ref", "HEAD"], "feature-x\n")
}

/// A repository with a clean working tree on `feature-x`.
pub fn clean_repo() -> FakeRunner {
    FakeRunner::new()
        .ok(&["git", "status", "--porcelain"], "")
        .ok(&["git", "rev-parse", "--abbrev-ref", "HEAD"], "feature-x\n")
}

pub const PR_RESPONSE: &str = "Add widget support\n\n## Summary\nAdds a Widget type.\n\n## Key changes\n- New `Widget` struct\n";
