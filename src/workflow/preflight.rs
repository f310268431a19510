//! Tool availability checks run before a workflow starts.

use tracing::debug;

use crate::error::WorkflowError;

/// Fail with [`WorkflowError::MissingTool`] for the first tool not on PATH.
pub fn require_tools(tools: &[&'static str]) -> Result<(), WorkflowError> {
    for &tool in tools {
        match which::which(tool) {
            Ok(path) => debug!("Found {} at {}", tool, path.display()),
            Err(_) => return Err(WorkflowError::MissingTool(tool)),
        }
    }
    Ok(())
}
