pub mod types;

pub use types::{InputPaths, PreparedComment, Truncation};

use crate::github::{CommentSink, GitHubError, RepoRef};
use colored::Colorize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Keeps the comment under GitHub's body size limit. Measured in UTF-16
/// code units.
pub const MAX_REPORT_UNITS: usize = 30_000;

pub const FINDINGS_HEADER: &str = "🚩🚩 Stubs clippy found the following red flags for this PR: ";
pub const NO_FINDINGS_MESSAGE: &str = "✅ Stubs clippy found no red flags for this PR!";

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Failed to read {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PR number: {0:?}")]
    InvalidPrNumber(String),

    #[error("Failed to post comment: {0}")]
    Post(#[from] GitHubError),
}

/// Cut `text` to its first [`MAX_REPORT_UNITS`] UTF-16 code units and
/// append a note saying how many lines were dropped.
///
/// The cut is by length, not by line, so the last kept line may end
/// mid-line. That partial line is not counted as dropped. A character
/// that would straddle the limit (a surrogate pair) is left out whole.
pub fn truncate_report(text: &str) -> (Cow<'_, str>, Option<Truncation>) {
    if text.encode_utf16().count() <= MAX_REPORT_UNITS {
        return (Cow::Borrowed(text), None);
    }

    let mut kept_units = 0;
    let mut cut = text.len();
    for (idx, c) in text.char_indices() {
        if kept_units + c.len_utf16() > MAX_REPORT_UNITS {
            cut = idx;
            break;
        }
        kept_units += c.len_utf16();
    }

    let prefix = &text[..cut];
    let dropped_lines = line_count(text) - line_count(prefix);
    let truncated = format!("{prefix}\n\n... (truncated {dropped_lines} lines) ...\n");

    (
        Cow::Owned(truncated),
        Some(Truncation {
            kept_units,
            dropped_lines,
        }),
    )
}

fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// Build the comment body for an already truncated report.
pub fn compose_body(report: &str) -> String {
    // A stray byte-order mark counts as blank too.
    if report
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .is_empty()
    {
        NO_FINDINGS_MESSAGE.to_string()
    } else {
        format!("{FINDINGS_HEADER}\n```\n{report}\n```")
    }
}

/// Parse the contents of the PR number file.
///
/// Surrounding whitespace is ignored. Anything that is not a positive
/// base-10 integer is rejected.
pub fn parse_pr_number(raw: &str) -> Result<u64, CommentError> {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommentError::InvalidPrNumber(trimmed.to_string())),
    }
}

/// Turn the raw file contents into a postable comment. No I/O.
pub fn prepare(report: &str, pr_number: &str) -> Result<PreparedComment, CommentError> {
    let (report, truncation) = truncate_report(report);
    let body = compose_body(&report);
    let issue_number = parse_pr_number(pr_number)?;

    Ok(PreparedComment {
        issue_number,
        body,
        truncation,
    })
}

fn read_input(path: &Path) -> Result<String, CommentError> {
    std::fs::read_to_string(path).map_err(|source| CommentError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Read both input files and prepare the comment.
#[instrument(skip(inputs), fields(report = %inputs.report.display(), pr_number = %inputs.pr_number.display()))]
pub fn load(inputs: &InputPaths) -> Result<PreparedComment, CommentError> {
    let report = read_input(&inputs.report)?;
    debug!(report_bytes = report.len(), "read lint report");

    let pr_number = read_input(&inputs.pr_number)?;

    let prepared = prepare(&report, &pr_number)?;
    if let Some(t) = prepared.truncation {
        warn!(kept_units = t.kept_units, dropped_lines = t.dropped_lines, "report truncated to fit comment limit");
    }
    debug!(issue_number = prepared.issue_number, body_chars = prepared.body.chars().count(), "prepared comment");
    Ok(prepared)
}

/// Read the inputs, post exactly one new comment, and return the PR number.
#[instrument(skip(sink, inputs), fields(repo = %repo))]
pub async fn post(
    sink: &dyn CommentSink,
    repo: &RepoRef,
    inputs: &InputPaths,
) -> Result<u64, CommentError> {
    let prepared = load(inputs)?;

    info!(issue_number = prepared.issue_number, "posting comment");
    sink.create_comment(&repo.owner, &repo.repo, prepared.issue_number, &prepared.body)
        .await?;

    Ok(prepared.issue_number)
}

/// Where a dry run would have posted. The repository may be unknown
/// since previewing does not need one.
pub fn preview_target(repo: Option<&RepoRef>, issue_number: u64) -> String {
    match repo {
        Some(repo) => format!("{repo}#{issue_number}"),
        None => format!("#{issue_number} (repository not configured)"),
    }
}

/// Print what would be posted, for `--dry-run`.
pub fn print_preview(repo: Option<&RepoRef>, prepared: &PreparedComment) {
    eprintln!();
    eprintln!(
        "{} {}",
        "Would comment on".bold(),
        preview_target(repo, prepared.issue_number)
    );
    if let Some(t) = prepared.truncation {
        eprintln!(
            "{}",
            format!(
                "Report truncated to {} UTF-16 units ({} lines dropped)",
                t.kept_units, t.dropped_lines
            )
            .yellow()
        );
    }
    eprintln!("{}", "─".repeat(40).dimmed());
    eprintln!("{}", prepared.body);
    eprintln!("{}", "─".repeat(40).dimmed());
}
