//! Prompt construction for commit messages and pull requests.

/// Conventional commit types Claude may choose from.
pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore",
];

/// Maximum length asked for in commit descriptions and PR titles.
pub const MAX_SUBJECT_LENGTH: usize = 72;

/// Instructions for a single-line commit message. The staged diff is piped
/// on stdin.
pub fn commit_message_prompt() -> String {
    format!(
        "Generate a git commit message for the staged changes in the diff provided on stdin.\n\
         \n\
         Rules:\n\
         - Use the Conventional Commits format: `type: description` or `type(scope): description`\n\
         - type must be one of: {types}\n\
         - The description must be under {max} characters, in imperative mood, lowercase, with no trailing period\n\
         - Output ONLY the commit message on a single line\n\
         - Do not add explanations, quotes, code fences or a body",
        types = COMMIT_TYPES.join(", "),
        max = MAX_SUBJECT_LENGTH,
    )
}

/// Instructions for a PR title and description. The context block built
/// by [`pr_context`] is piped on stdin.
pub fn pr_prompt() -> String {
    format!(
        "Generate a GitHub pull request title and description for the branch described on stdin \
         (diff statistics, commit log and diff).\n\
         \n\
         Output format:\n\
         - Line 1: the pull request title, under {max} characters, with no prefix, quotes or markdown\n\
         - Line 2: blank\n\
         - Then a markdown description with:\n\
         \x20 ## Summary\n\
         \x20 One or two sentences on what this change does and why.\n\
         \x20 ## Key changes\n\
         \x20 A bulleted list of the most important changes.\n\
         \n\
         Output ONLY the title and description, with no preamble.",
        max = MAX_SUBJECT_LENGTH,
    )
}

/// Assemble the stdin payload for PR generation.
pub fn pr_context(diff_stat: &str, commit_log: &str, diff: &str) -> String {
    format!(
        "## Diff statistics\n{}\n\n## Commits\n{}\n\n## Diff\n{}\n",
        or_none(diff_stat),
        or_none(commit_log),
        or_none(diff),
    )
}

fn or_none(text: &str) -> &str {
    let trimmed = text.trim_end();
    if trimmed.is_empty() { "(none)" } else { trimmed }
}
