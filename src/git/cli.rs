//! Thin wrapper over the `git` command line.
//!
//! All operations shell out to the system `git` binary, inheriting the
//! user's existing git config, SSH agent, and credential store.

use tracing::debug;

use crate::config::REMOTE;
use crate::error::ExecError;
use crate::exec::{self, Cmd, CommandRunner, ExecOptions};

/// Default branch used when the remote's HEAD cannot be resolved.
pub const FALLBACK_DEFAULT_BRANCH: &str = "main";

/// Git operations for one working directory.
pub struct Git<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
}

fn git<I, S>(args: I) -> Cmd
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Cmd::new("git").args(args)
}

impl<'a, R: CommandRunner + ?Sized> Git<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    async fn output(&self, cmd: Cmd) -> Result<String, ExecError> {
        Ok(exec::capture(self.runner, &cmd, ExecOptions::default())
            .await?
            .unwrap_or_default())
    }

    async fn try_output(&self, cmd: Cmd) -> Option<String> {
        exec::capture(self.runner, &cmd, ExecOptions::default().allow_failure())
            .await
            .ok()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    async fn stream(&self, cmd: Cmd) -> Result<bool, ExecError> {
        exec::stream(self.runner, &cmd, ExecOptions::default().allow_failure()).await
    }

    /// Whether the working tree has staged, unstaged or untracked changes.
    pub async fn has_uncommitted_changes(&self) -> Result<bool, ExecError> {
        let status = self.output(git(["status", "--porcelain"])).await?;
        Ok(!status.trim().is_empty())
    }

    /// Whether anything is staged for the next commit.
    pub async fn has_staged_changes(&self) -> Result<bool, ExecError> {
        let names = self.output(git(["diff", "--cached", "--name-only"])).await?;
        Ok(!names.trim().is_empty())
    }

    /// `git add -A`.
    pub async fn stage_all(&self) -> Result<(), ExecError> {
        exec::stream(self.runner, &git(["add", "-A"]), ExecOptions::default()).await?;
        Ok(())
    }

    pub async fn staged_diff(&self) -> Result<String, ExecError> {
        self.output(git(["diff", "--cached"])).await
    }

    /// Commit staged changes. Git's own output is shown to the user.
    pub async fn commit(&self, message: &str) -> Result<bool, ExecError> {
        self.stream(git(["commit", "-m", message])).await
    }

    /// Current branch name, `None` on a detached HEAD.
    pub async fn current_branch(&self) -> Result<Option<String>, ExecError> {
        let branch = self
            .output(git(["rev-parse", "--abbrev-ref", "HEAD"]))
            .await?;
        let branch = branch.trim();
        if branch.is_empty() || branch == "HEAD" {
            Ok(None)
        } else {
            Ok(Some(branch.to_string()))
        }
    }

    /// Whether the current branch tracks a remote branch.
    pub async fn has_upstream(&self) -> bool {
        self.try_output(git([
            "rev-parse",
            "--abbrev-ref",
            "--symbolic-full-name",
            "@{u}",
        ]))
        .await
        .is_some()
    }

    /// Push the branch, setting upstream tracking when it has none.
    pub async fn push(&self, branch: &str) -> Result<bool, ExecError> {
        if self.has_upstream().await {
            self.stream(git(["push"])).await
        } else {
            debug!("No upstream for {}, pushing with -u", branch);
            self.stream(git(["push", "-u", REMOTE, branch])).await
        }
    }

    pub async fn fetch(&self, remote: &str) -> Result<bool, ExecError> {
        self.stream(git(["fetch", remote])).await
    }

    /// Create `name` from `start_point` and switch to it.
    pub async fn create_branch(&self, name: &str, start_point: &str) -> Result<bool, ExecError> {
        self.stream(git(["checkout", "-b", name, start_point])).await
    }

    /// The remote's default branch name from `refs/remotes/<remote>/HEAD`.
    pub async fn remote_default_branch(&self, remote: &str) -> Option<String> {
        let symref = self
            .try_output(git([
                "symbolic-ref".to_string(),
                "--short".to_string(),
                format!("refs/remotes/{remote}/HEAD"),
            ]))
            .await?;
        let prefix = format!("{remote}/");
        Some(
            symref
                .strip_prefix(&prefix)
                .unwrap_or(&symref)
                .to_string(),
        )
    }

    /// `git diff --stat <base>...HEAD`.
    pub async fn diff_stat_against(&self, base: &str) -> String {
        self.try_output(git(["diff".to_string(), "--stat".to_string(), format!("{base}...HEAD")]))
            .await
            .unwrap_or_default()
    }

    /// `git log --oneline <base>..HEAD`.
    pub async fn log_against(&self, base: &str) -> String {
        self.try_output(git(["log".to_string(), "--oneline".to_string(), format!("{base}..HEAD")]))
            .await
            .unwrap_or_default()
    }

    /// `git diff <base>...HEAD`.
    pub async fn diff_against(&self, base: &str) -> String {
        self.try_output(git(["diff".to_string(), format!("{base}...HEAD")]))
            .await
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecOutput, MockCommandRunner, StdioMode};

    #[tokio::test]
    async fn test_has_uncommitted_changes() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.starts_with(&["git", "status", "--porcelain"]))
            .returning(|_, _| Ok(ExecOutput::ok(" M src/lib.rs\n")));

        assert!(Git::new(&runner).has_uncommitted_changes().await.unwrap());
    }

    #[tokio::test]
    async fn test_clean_tree_has_no_changes() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| Ok(ExecOutput::ok("\n")));

        assert!(!Git::new(&runner).has_uncommitted_changes().await.unwrap());
    }

    #[tokio::test]
    async fn test_current_branch_detached() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| Ok(ExecOutput::ok("HEAD\n")));

        assert_eq!(Git::new(&runner).current_branch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_push_sets_upstream_when_missing() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.starts_with(&["git", "rev-parse"]))
            .returning(|_, _| Ok(ExecOutput::failed(128, "fatal: no upstream configured")));
        runner
            .expect_run()
            .withf(|cmd, opts| {
                cmd.starts_with(&["git", "push", "-u", "origin", "feature-x"])
                    && opts.stdio == StdioMode::Inherit
            })
            .times(1)
            .returning(|_, _| Ok(ExecOutput::ok("")));

        assert!(Git::new(&runner).push("feature-x").await.unwrap());
    }

    #[tokio::test]
    async fn test_push_plain_when_tracking() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.starts_with(&["git", "rev-parse"]))
            .returning(|_, _| Ok(ExecOutput::ok("origin/feature-x\n")));
        runner
            .expect_run()
            .withf(|cmd, _| cmd.to_string() == "git push")
            .times(1)
            .returning(|_, _| Ok(ExecOutput::ok("")));

        assert!(Git::new(&runner).push("feature-x").await.unwrap());
    }

    #[tokio::test]
    async fn test_remote_default_branch_strips_remote() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.starts_with(&["git", "symbolic-ref", "--short", "refs/remotes/origin/HEAD"]))
            .returning(|_, _| Ok(ExecOutput::ok("origin/develop\n")));

        assert_eq!(
            Git::new(&runner).remote_default_branch("origin").await.as_deref(),
            Some("develop")
        );
    }

    #[tokio::test]
    async fn test_remote_default_branch_missing() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _| Ok(ExecOutput::failed(128, "fatal: ref refs/remotes/origin/HEAD is not a symbolic ref")));

        assert!(Git::new(&runner).remote_default_branch("origin").await.is_none());
    }

    #[tokio::test]
    async fn test_commit_passes_message_as_single_argument() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| {
                cmd.starts_with(&["git", "commit", "-m"])
                    && cmd.flag_value("-m") == Some("feat: add widget support")
            })
            .times(1)
            .returning(|_, _| Ok(ExecOutput::ok("")));

        assert!(Git::new(&runner).commit("feat: add widget support").await.unwrap());
    }
}
