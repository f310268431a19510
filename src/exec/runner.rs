//! Child process spawning on tokio.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::error::ExecError;

use super::{Cmd, CommandRunner, ExecOptions, ExecOutput, StdioMode};

/// Runner that spawns real processes.
///
/// Programs are spawned directly with their argument vector, so commit
/// messages and PR titles never pass through a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &Cmd, options: &ExecOptions) -> Result<ExecOutput, ExecError> {
        let command_line = cmd.to_string();

        let mut command = Command::new(cmd.program());
        command.args(cmd.arguments()).kill_on_drop(true);
        for (key, value) in &options.env {
            command.env(key, value);
        }

        match options.stdio {
            StdioMode::Capture => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            StdioMode::Inherit => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        if options.input.is_some() {
            command.stdin(Stdio::piped());
        } else if options.stdio == StdioMode::Capture {
            command.stdin(Stdio::null());
        }

        let mut child = command.spawn().map_err(|source| ExecError::SpawnFailed {
            command: command_line.clone(),
            source,
        })?;

        // Feed stdin from its own task so a child that writes while it
        // reads cannot fill the stdout pipe and stall us.
        let writer = match (options.input.clone(), child.stdin.take()) {
            (Some(input), Some(mut stdin)) => Some(tokio::spawn(async move {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await
            })),
            _ => None,
        };

        let output = match options.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecError::Timeout {
                    command: command_line.clone(),
                    timeout: limit,
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| ExecError::Io {
            command: command_line.clone(),
            source,
        })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit before consuming its input.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => warn!("Failed to write stdin of `{}`: {}", command_line, e),
                Err(e) => warn!("stdin writer for `{}` panicked: {}", command_line, e),
            }
        }

        Ok(ExecOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
