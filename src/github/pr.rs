//! Pull request operations through the `gh` CLI.

use tracing::debug;

use crate::error::ExecError;
use crate::exec::{self, Cmd, CommandRunner, ExecOptions};

use super::body::PrBodyFile;

/// GitHub operations for the current repository.
pub struct GitHub<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
}

fn gh<I, S>(args: I) -> Cmd
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Cmd::new("gh").args(args)
}

impl<'a, R: CommandRunner + ?Sized> GitHub<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// URL of the open PR for the current branch, if there is one.
    ///
    /// Any failure (no PR, gh missing, not authenticated) reads as `None`.
    pub async fn current_pr_url(&self) -> Option<String> {
        let url = exec::capture(
            self.runner,
            &gh(["pr", "view", "--json", "url", "-q", ".url"]),
            ExecOptions::default().allow_failure(),
        )
        .await
        .ok()
        .flatten()?;

        let url = url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        }
    }

    /// The repository's default branch as reported by GitHub.
    pub async fn default_branch(&self) -> Option<String> {
        let name = exec::capture(
            self.runner,
            &gh([
                "repo",
                "view",
                "--json",
                "defaultBranchRef",
                "-q",
                ".defaultBranchRef.name",
            ]),
            ExecOptions::default().allow_failure(),
        )
        .await
        .ok()
        .flatten()?;

        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Open a PR from `head` into `base`. Returns the new PR's URL.
    pub async fn create_pr(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &PrBodyFile,
    ) -> Result<String, ExecError> {
        let cmd = gh(["pr", "create", "--base", base, "--head", head, "--title", title])
            .arg("--body-file")
            .arg(body.path().to_string_lossy());

        let stdout = exec::capture(self.runner, &cmd, ExecOptions::default())
            .await?
            .unwrap_or_default();

        // gh prints progress before the URL; the URL is the last line.
        let url = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();
        debug!("Created PR: {}", url);
        Ok(url)
    }

    /// Replace the description of the PR at `url`. The title is untouched.
    pub async fn update_pr_body(&self, url: &str, body: &PrBodyFile) -> Result<(), ExecError> {
        let cmd = gh(["pr", "edit", url])
            .arg("--body-file")
            .arg(body.path().to_string_lossy());
        exec::capture(self.runner, &cmd, ExecOptions::default()).await?;
        Ok(())
    }

    /// Turn on squash auto-merge. Returns `false` when gh refuses, e.g.
    /// because auto-merge is already on or checks are still pending.
    pub async fn enable_automerge(&self, url: &str) -> bool {
        exec::stream(
            self.runner,
            &gh(["pr", "merge", url, "--auto", "--squash"]),
            ExecOptions::default().allow_failure(),
        )
        .await
        .unwrap_or(false)
    }
}
