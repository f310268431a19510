//! The new-branch workflow.

use crate::auth::AuthSources;
use crate::config::REMOTE;
use crate::error::WorkflowError;
use crate::exec::CommandRunner;
use crate::git::FALLBACK_DEFAULT_BRANCH;

use super::Workflow;

impl<R: CommandRunner + ?Sized, S: AuthSources + ?Sized> Workflow<'_, R, S> {
    /// Fetch the remote and switch to a new branch cut from its default
    /// branch. Returns the start point used.
    pub async fn new_branch(&self, name: Option<&str>) -> Result<String, WorkflowError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(WorkflowError::MissingBranchName)?;

        let git = self.git();
        println!("Fetching {}...", REMOTE);
        if !git.fetch(REMOTE).await? {
            return Err(WorkflowError::FetchFailed(REMOTE.to_string()));
        }

        let default = git
            .remote_default_branch(REMOTE)
            .await
            .unwrap_or_else(|| FALLBACK_DEFAULT_BRANCH.to_string());
        let start_point = format!("{REMOTE}/{default}");

        if !git.create_branch(name, &start_point).await? {
            return Err(WorkflowError::BranchFailed(name.to_string()));
        }
        println!("✓ Created branch {} from {}", name, start_point);
        Ok(start_point)
    }
}
