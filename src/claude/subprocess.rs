//! Claude CLI invocation.

use std::time::Duration;

use tracing::{debug, error};

use crate::auth::AuthResult;
use crate::config::API_KEY_ENV_VAR;
use crate::error::{ClaudeError, ExecError};
use crate::exec::{self, Cmd, CommandRunner, ExecOptions};

/// Exit status a shell reports for a missing command.
const COMMAND_NOT_FOUND_EXIT: i32 = 127;

/// Run `claude -p <prompt>` with `input` on stdin and return the trimmed
/// response.
///
/// When `auth` carries a key it is passed to the child as
/// ANTHROPIC_API_KEY; a CLI session needs nothing extra.
///
/// If the timeout is exceeded, returns `ClaudeError::Timeout`.
pub async fn run_claude<R: CommandRunner + ?Sized>(
    runner: &R,
    auth: &AuthResult,
    prompt: &str,
    input: &str,
    timeout: Duration,
) -> Result<String, ClaudeError> {
    let cmd = Cmd::new("claude").arg("-p").arg(prompt);

    let mut options = ExecOptions::default().input(input).timeout(timeout);
    if let Some(key) = auth.key() {
        options = options.env(API_KEY_ENV_VAR, key);
    }

    debug!(
        "Invoking claude (auth: {}, input: {} chars, timeout: {}s)",
        auth.method(),
        input.len(),
        timeout.as_secs()
    );

    let output = exec::capture(runner, &cmd, options)
        .await
        .map_err(classify_error)?
        .unwrap_or_default();

    let response = output.trim();
    if response.is_empty() {
        return Err(ClaudeError::EmptyResponse);
    }
    Ok(response.to_string())
}

/// Map an execution failure onto the Claude error taxonomy.
fn classify_error(err: ExecError) -> ClaudeError {
    if err.exit_code() == Some(COMMAND_NOT_FOUND_EXIT) {
        return ClaudeError::NotInstalled;
    }
    match err {
        ExecError::Timeout { timeout, .. } => ClaudeError::Timeout(timeout.as_secs()),
        ExecError::SpawnFailed { ref source, .. }
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            ClaudeError::NotInstalled
        }
        other => {
            error!("Claude invocation failed: {}", other);
            ClaudeError::Exec(other)
        }
    }
}
