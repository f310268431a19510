//! The push-and-PR workflow, with optional squash auto-merge.

use tracing::{debug, warn};

use crate::auth::AuthSources;
use crate::claude::{PrInput, generate_pr_content};
use crate::config::REMOTE;
use crate::error::WorkflowError;
use crate::exec::CommandRunner;
use crate::git::FALLBACK_DEFAULT_BRANCH;
use crate::github::PrBodyFile;

use super::{PullRequestOutcome, PushPrReport, Workflow};

impl<R: CommandRunner + ?Sized, S: AuthSources + ?Sized> Workflow<'_, R, S> {
    /// Commit pending changes, push, then open a PR or refresh the
    /// description of the existing one.
    ///
    /// With `automerge`, squash auto-merge is requested afterwards. A refusal
    /// from GitHub is reported as a warning and does not fail the run.
    pub async fn push_pr(&self, automerge: bool) -> Result<PushPrReport, WorkflowError> {
        let commit = self.commit_changes().await?;
        let branch = self.push_current_branch().await?;

        let github = self.github();
        let existing = github.current_pr_url().await;
        let base = self.base_branch().await;
        debug!("PR base branch: {}", base);

        println!("Generating PR description...");
        let input = self.pr_input(&base).await;
        let content = generate_pr_content(self.runner, self.auth, &input).await?;
        let body = PrBodyFile::create(&content.body).map_err(WorkflowError::BodyFile)?;

        let pull_request = match existing {
            Some(url) => {
                github.update_pr_body(&url, &body).await?;
                println!("✓ Updated PR description: {}", url);
                PullRequestOutcome::Updated { url }
            }
            None => {
                let url = github
                    .create_pr(&base, &branch, &content.title, &body)
                    .await
                    .map_err(|e| WorkflowError::PrCreateFailed(e.to_string()))?;
                if url.is_empty() {
                    return Err(WorkflowError::PrCreateFailed(
                        "gh did not report a PR URL".to_string(),
                    ));
                }
                println!("✓ Created PR: {}", url);
                PullRequestOutcome::Created { url }
            }
        };
        drop(body);

        let automerge = if automerge {
            Some(self.enable_automerge(pull_request.url()).await)
        } else {
            None
        };

        Ok(PushPrReport {
            commit,
            pull_request,
            automerge,
        })
    }

    async fn enable_automerge(&self, url: &str) -> bool {
        println!("Enabling auto-merge...");
        let enabled = self.github().enable_automerge(url).await;
        if enabled {
            println!("✓ Auto-merge enabled (squash)");
        } else {
            warn!("Could not enable auto-merge for {}", url);
            eprintln!("Warning: could not enable auto-merge (it may already be enabled or checks may be pending)");
        }
        enabled
    }

    /// Branch a new PR targets: GitHub's default branch, then the remote's
    /// HEAD, then `main`.
    async fn base_branch(&self) -> String {
        if let Some(branch) = self.github().default_branch().await {
            return branch;
        }
        if let Some(branch) = self.git().remote_default_branch(REMOTE).await {
            return branch;
        }
        debug!("Falling back to {}", FALLBACK_DEFAULT_BRANCH);
        FALLBACK_DEFAULT_BRANCH.to_string()
    }

    async fn pr_input(&self, base: &str) -> PrInput {
        let git = self.git();
        let base_ref = format!("{REMOTE}/{base}");
        PrInput {
            diff_stat: git.diff_stat_against(&base_ref).await,
            commit_log: git.log_against(&base_ref).await,
            diff: git.diff_against(&base_ref).await,
        }
    }
}
