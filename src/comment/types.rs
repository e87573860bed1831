use std::path::PathBuf;

/// Conventional file the lint job writes its report to.
pub const DEFAULT_REPORT_PATH: &str = "stubs_clippy_errors.txt";
/// Conventional file holding the pull request number.
pub const DEFAULT_PR_NUMBER_PATH: &str = "pr_number.txt";

/// Locations of the two files handed over by the lint job.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub report: PathBuf,
    pub pr_number: PathBuf,
}

/// Record of a report cut down to the comment size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    /// UTF-16 code units kept from the start of the report
    pub kept_units: usize,
    /// Lines in the full report minus lines in the kept prefix
    pub dropped_lines: usize,
}

/// A comment ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedComment {
    pub issue_number: u64,
    pub body: String,
    pub truncation: Option<Truncation>,
}

