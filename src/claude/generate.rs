//! Commit message and pull request generation.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, warn};

use crate::auth::{self, AuthSources};
use crate::config::claude_timeout;
use crate::diff::{truncate_for_commit, truncate_for_pr};
use crate::error::ClaudeError;
use crate::exec::CommandRunner;

use super::prompt::{COMMIT_TYPES, commit_message_prompt, pr_context, pr_prompt};
use super::subprocess::run_claude;

static CONVENTIONAL_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^({})(\([^)]+\))?!?: \S.*$", COMMIT_TYPES.join("|"));
    Regex::new(&pattern).expect("Invalid regex")
});

/// Title and markdown description for a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrContent {
    pub title: String,
    pub body: String,
}

impl PrContent {
    /// Split a response into title (first non-empty line) and body.
    pub fn parse(response: &str) -> Self {
        let mut lines = response.lines().skip_while(|l| l.trim().is_empty());
        let title = lines
            .next()
            .map(clean_title)
            .unwrap_or_default();
        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        Self { title, body }
    }
}

/// Repository context for a pull request.
#[derive(Debug, Clone, Default)]
pub struct PrInput {
    pub diff_stat: String,
    pub commit_log: String,
    pub diff: String,
}

/// Generate a one-line conventional commit message for the staged diff.
pub async fn generate_commit_message<R, S>(
    runner: &R,
    sources: &S,
    staged_diff: &str,
) -> Result<String, ClaudeError>
where
    R: CommandRunner + ?Sized,
    S: AuthSources + ?Sized,
{
    let auth = auth::resolve(sources).await?;
    let payload = truncate_for_commit(staged_diff);

    let response = run_claude(
        runner,
        &auth,
        &commit_message_prompt(),
        &payload,
        claude_timeout(),
    )
    .await?;

    let message = clean_commit_message(&response);
    if message.is_empty() {
        return Err(ClaudeError::EmptyResponse);
    }
    if !is_conventional(&message) {
        warn!("Generated message is not a conventional commit: {}", message);
    }
    debug!("Generated commit message: {}", message);
    Ok(message)
}

/// Generate a PR title and description from branch context.
pub async fn generate_pr_content<R, S>(
    runner: &R,
    sources: &S,
    input: &PrInput,
) -> Result<PrContent, ClaudeError>
where
    R: CommandRunner + ?Sized,
    S: AuthSources + ?Sized,
{
    let auth = auth::resolve(sources).await?;
    let diff = truncate_for_pr(&input.diff);
    let context = pr_context(&input.diff_stat, &input.commit_log, &diff);

    let response = run_claude(runner, &auth, &pr_prompt(), &context, claude_timeout()).await?;

    let content = PrContent::parse(&response);
    if content.title.is_empty() {
        return Err(ClaudeError::EmptyResponse);
    }
    debug!("Generated PR title: {}", content.title);
    Ok(content)
}

/// Whether `message` has the `type(scope)!: description` shape.
pub fn is_conventional(message: &str) -> bool {
    CONVENTIONAL_SUBJECT.is_match(message)
}

/// Reduce a response to one commit message line.
///
/// Drops code fences and wrapping quotes/backticks, then keeps the first
/// non-empty line.
fn clean_commit_message(response: &str) -> String {
    response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .map(strip_wrapping)
        .next()
        .unwrap_or_default()
        .to_string()
}

fn clean_title(line: &str) -> String {
    let line = line.trim().trim_start_matches('#').trim();
    let line = line
        .strip_prefix("Title:")
        .or_else(|| line.strip_prefix("title:"))
        .unwrap_or(line)
        .trim();
    strip_wrapping(line).to_string()
}

fn strip_wrapping(s: &str) -> &str {
    for wrap in ['"', '\'', '`'] {
        if s.len() >= 2 && s.starts_with(wrap) && s.ends_with(wrap) {
            return s[1..s.len() - 1].trim();
        }
    }
    s
}
