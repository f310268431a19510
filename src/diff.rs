//! Size limits for diffs sent to Claude.
//!
//! Both policies favour breadth over depth: every file header survives
//! while the changed lines under it are thinned out, so the model still
//! sees the shape of the change when content has to be dropped.
//!
//! All sizes are counted in characters, not bytes.

use std::borrow::Cow;

use tracing::debug;

/// Character ceiling for the commit message payload.
pub const COMMIT_DIFF_LIMIT: usize = 15_000;

/// Changed lines kept by the commit policy across the whole diff.
pub const COMMIT_MAX_CHANGE_LINES: usize = 200;

/// Character ceiling for the pull request payload.
pub const PR_DIFF_LIMIT: usize = 30_000;

/// Above this many characters the PR policy skips per-file bucketing.
pub const PR_HARD_TRUNCATE_THRESHOLD: usize = 100_000;

/// Changed lines kept per file by the PR policy.
pub const PR_MAX_LINES_PER_FILE: usize = 20;

/// Appended whenever content is cut off.
pub const TRUNCATION_MARKER: &str = "\n... [diff truncated due to size]";

/// Bound a staged diff for commit message generation.
///
/// Diffs within [`COMMIT_DIFF_LIMIT`] are returned untouched. Larger diffs
/// keep every file header plus the first [`COMMIT_MAX_CHANGE_LINES`]
/// changed lines; if that is still too big, the raw diff is cut at the
/// limit and marked.
pub fn truncate_for_commit(diff: &str) -> Cow<'_, str> {
    let size = char_len(diff);
    if size <= COMMIT_DIFF_LIMIT {
        return Cow::Borrowed(diff);
    }

    let mut change_lines = 0usize;
    let kept: Vec<&str> = classify(diff)
        .filter(|(kind, _)| match kind {
            LineKind::Header => true,
            LineKind::Change if change_lines < COMMIT_MAX_CHANGE_LINES => {
                change_lines += 1;
                true
            }
            _ => false,
        })
        .map(|(_, line)| line)
        .collect();
    let condensed = kept.join("\n");
    let condensed_size = char_len(&condensed);

    if condensed_size <= COMMIT_DIFF_LIMIT {
        debug!(
            "Commit diff condensed from {} to {} chars",
            size, condensed_size
        );
        return Cow::Owned(condensed);
    }

    debug!(
        "Commit diff still {} chars after condensing, hard truncating",
        condensed_size
    );
    Cow::Owned(hard_truncate(diff, COMMIT_DIFF_LIMIT))
}

/// Bound a branch diff for pull request generation.
///
/// Diffs within [`PR_DIFF_LIMIT`] are returned untouched. Diffs over
/// [`PR_HARD_TRUNCATE_THRESHOLD`] are cut at the limit directly. Anything
/// in between is bucketed per file, keeping headers and up to
/// [`PR_MAX_LINES_PER_FILE`] changed lines each, and files are added in
/// order until the next one would not fit.
pub fn truncate_for_pr(diff: &str) -> Cow<'_, str> {
    let size = char_len(diff);
    if size <= PR_DIFF_LIMIT {
        return Cow::Borrowed(diff);
    }

    if size > PR_HARD_TRUNCATE_THRESHOLD {
        debug!(
            "PR diff is {} chars, over {}; hard truncating",
            size, PR_HARD_TRUNCATE_THRESHOLD
        );
        return Cow::Owned(hard_truncate(diff, PR_DIFF_LIMIT));
    }

    let sections = file_sections(diff);
    let budget = PR_DIFF_LIMIT - char_len(TRUNCATION_MARKER);

    let mut out = String::new();
    let mut out_size = 0usize;
    let mut included = 0usize;
    for section in &sections {
        let separator = usize::from(!out.is_empty());
        let section_size = char_len(section);
        if out_size + separator + section_size > budget {
            break;
        }
        if separator == 1 {
            out.push('\n');
        }
        out.push_str(section);
        out_size += separator + section_size;
        included += 1;
    }

    if included == 0 {
        debug!("First file section alone exceeds the PR limit; hard truncating");
        return Cow::Owned(hard_truncate(diff, PR_DIFF_LIMIT));
    }

    if included < sections.len() {
        out.push_str(TRUNCATION_MARKER);
    }

    debug!(
        "PR diff condensed from {} to {} chars ({} of {} files)",
        size,
        char_len(&out),
        included,
        sections.len()
    );
    Cow::Owned(out)
}

/// Group headers and capped change lines by the file they belong to.
fn file_sections(diff: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut changes_in_file = 0usize;

    for (kind, line) in classify(diff) {
        if line.starts_with("diff --git") {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            changes_in_file = 0;
            current.push_str(line);
            continue;
        }

        let keep = match kind {
            LineKind::Header => true,
            LineKind::Change if changes_in_file < PR_MAX_LINES_PER_FILE => {
                changes_in_file += 1;
                true
            }
            _ => false,
        };

        if keep {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// `diff --git`, or a `---`/`+++` file marker before the first hunk.
    Header,
    /// Added or removed content inside a hunk.
    Change,
    /// Context, hunk ranges, `index` and mode lines.
    Other,
}

/// Classify each line, tracking whether it sits inside a hunk.
///
/// Inside a hunk `--- x` is a removed line starting with `-- `, not a file
/// marker, so hunk state is reset only by the next `diff --git`.
fn classify(diff: &str) -> impl Iterator<Item = (LineKind, &str)> {
    let mut in_hunk = false;
    diff.lines().map(move |line| {
        let kind = if line.starts_with("diff --git") {
            in_hunk = false;
            LineKind::Header
        } else if line.starts_with("@@") {
            in_hunk = true;
            LineKind::Other
        } else if !in_hunk && is_file_marker(line) {
            LineKind::Header
        } else if line.starts_with('+') || line.starts_with('-') {
            LineKind::Change
        } else {
            LineKind::Other
        };
        (kind, line)
    })
}

fn is_file_marker(line: &str) -> bool {
    line.starts_with("+++ ") || line.starts_with("--- ") || line == "+++" || line == "---"
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` so that text plus marker fits in `limit` characters.
fn hard_truncate(text: &str, limit: usize) -> String {
    let keep = limit.saturating_sub(char_len(TRUNCATION_MARKER));
    let end = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(i, _)| i);
    let mut out = String::with_capacity(end + TRUNCATION_MARKER.len());
    out.push_str(&text[..end]);
    out.push_str(TRUNCATION_MARKER);
    out
}
