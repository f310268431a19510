//! External command execution.
//!
//! Every git, gh and claude invocation goes through a [`CommandRunner`].
//! [`capture`] and [`stream`] layer the throw/suppress error policy on top
//! of the raw runner result.

pub mod runner;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ExecError;

pub use runner::SystemRunner;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// True when the command line starts with the given words.
    ///
    /// `Cmd::new("git").args(["push", "-u"]).starts_with(&["git", "push"])` is true.
    pub fn starts_with(&self, words: &[&str]) -> bool {
        let mut parts = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        words.iter().all(|w| parts.next() == Some(*w))
    }

    /// Value following `flag` in the argument list.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Arguments longer than this, or spanning lines, are shortened for display.
const DISPLAY_ARG_MAX: usize = 80;

/// Characters of an elided argument kept before the ellipsis.
const DISPLAY_ARG_PREVIEW: usize = 40;

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains('\n') || arg.chars().count() > DISPLAY_ARG_MAX {
                let first_line = arg.lines().next().unwrap_or_default();
                let preview: String = first_line.chars().take(DISPLAY_ARG_PREVIEW).collect();
                write!(f, " {:?}", format!("{preview}..."))?;
            } else if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How the child's stdout/stderr are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// Pipe stdout and stderr back to the caller.
    #[default]
    Capture,
    /// Share the terminal so the user sees output live.
    Inherit,
}

/// Options for a single command execution.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Return the failure as an error (`true`) or as a sentinel (`false`).
    pub throw_on_error: bool,
    pub stdio: StdioMode,
    pub timeout: Option<Duration>,
    /// Text written to the child's stdin.
    pub input: Option<String>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            throw_on_error: true,
            stdio: StdioMode::Capture,
            timeout: None,
            input: None,
            env: Vec::new(),
        }
    }
}

impl ExecOptions {
    pub fn allow_failure(mut self) -> Self {
        self.throw_on_error = false;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub success: bool,
    /// Empty in [`StdioMode::Inherit`].
    pub stdout: String,
    /// Empty in [`StdioMode::Inherit`].
    pub stderr: String,
}

impl ExecOutput {
    /// A successful run that printed `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs external commands.
///
/// This abstraction allows mocking git, gh and claude in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    ///
    /// A nonzero exit is reported through [`ExecOutput::success`], not as an
    /// error. Errors are reserved for spawn failures, I/O failures and
    /// timeouts.
    async fn run(&self, cmd: &Cmd, options: &ExecOptions) -> Result<ExecOutput, ExecError>;
}

/// Run a command and return its captured stdout.
///
/// Returns `Ok(None)` instead of an error when the command fails and
/// `options.throw_on_error` is `false`.
pub async fn capture<R: CommandRunner + ?Sized>(
    runner: &R,
    cmd: &Cmd,
    mut options: ExecOptions,
) -> Result<Option<String>, ExecError> {
    options.stdio = StdioMode::Capture;
    debug!("exec (capture): {}", cmd);

    match run_checked(runner, cmd, &options).await {
        Ok(output) => Ok(Some(output.stdout)),
        Err(e) if !options.throw_on_error => {
            debug!("suppressed failure: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Run a command with the terminal attached and report whether it succeeded.
///
/// Returns `Ok(false)` instead of an error when the command fails and
/// `options.throw_on_error` is `false`.
pub async fn stream<R: CommandRunner + ?Sized>(
    runner: &R,
    cmd: &Cmd,
    mut options: ExecOptions,
) -> Result<bool, ExecError> {
    options.stdio = StdioMode::Inherit;
    debug!("exec (stream): {}", cmd);

    match run_checked(runner, cmd, &options).await {
        Ok(_) => Ok(true),
        Err(e) if !options.throw_on_error => {
            debug!("suppressed failure: {}", e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Run and turn a nonzero exit into [`ExecError::NonZeroExit`].
async fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    cmd: &Cmd,
    options: &ExecOptions,
) -> Result<ExecOutput, ExecError> {
    let output = runner.run(cmd, options).await?;
    if output.success {
        Ok(output)
    } else {
        Err(ExecError::NonZeroExit {
            command: cmd.to_string(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}
