//! The commit and commit-and-push workflows.

use tracing::debug;

use crate::auth::AuthSources;
use crate::claude::generate_commit_message;
use crate::error::WorkflowError;
use crate::exec::CommandRunner;

use super::{CommitOutcome, CommitPushReport, Workflow};

impl<R: CommandRunner + ?Sized, S: AuthSources + ?Sized> Workflow<'_, R, S> {
    /// Stage, generate a message, commit, and show the branch's PR if any.
    pub async fn commit(&self) -> Result<CommitOutcome, WorkflowError> {
        let outcome = self.commit_changes().await?;

        if let CommitOutcome::Committed { message, .. } = outcome {
            let pr_url = self.report_existing_pr().await;
            return Ok(CommitOutcome::Committed { message, pr_url });
        }
        Ok(outcome)
    }

    /// Commit, push with upstream tracking, and show the branch's PR if any.
    ///
    /// Never opens or edits a PR.
    pub async fn commit_push(&self) -> Result<CommitPushReport, WorkflowError> {
        let commit = self.commit_changes().await?;
        let branch = self.push_current_branch().await?;
        let pr_url = self.report_existing_pr().await;

        Ok(CommitPushReport {
            commit,
            branch,
            pr_url,
        })
    }

    /// The commit step shared by every workflow that commits.
    pub(super) async fn commit_changes(&self) -> Result<CommitOutcome, WorkflowError> {
        let git = self.git();

        if !git.has_uncommitted_changes().await? {
            println!("No changes to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        if !git.has_staged_changes().await? {
            debug!("Nothing staged, staging all changes");
            git.stage_all().await?;
        }

        let diff = git.staged_diff().await?;
        if diff.trim().is_empty() {
            return Err(WorkflowError::NoStagedChanges);
        }

        println!("Generating commit message...");
        let message = generate_commit_message(self.runner, self.auth, &diff).await?;

        if !git.commit(&message).await? {
            return Err(WorkflowError::CommitFailed);
        }
        println!("✓ Committed: {}", message);

        Ok(CommitOutcome::Committed {
            message,
            pr_url: None,
        })
    }

    /// Push the current branch. Returns the branch name.
    pub(super) async fn push_current_branch(&self) -> Result<String, WorkflowError> {
        let git = self.git();
        let branch = git
            .current_branch()
            .await?
            .ok_or(WorkflowError::DetachedHead)?;

        println!("Pushing {}...", branch);
        if !git.push(&branch).await? {
            return Err(WorkflowError::PushFailed(branch));
        }
        println!("✓ Pushed {}", branch);
        Ok(branch)
    }

    async fn report_existing_pr(&self) -> Option<String> {
        let url = self.github().current_pr_url().await;
        if let Some(url) = &url {
            println!("PR: {}", url);
        }
        url
    }
}
