//! Error types for the jira2report library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the conversion or fetch cannot proceed
//!   at all (missing input file, required columns absent, credentials not
//!   configured). Returned as `Err(ConvertError)` from the top-level
//!   `convert*` and `fetch*` functions.
//!
//! * [`RowSkip`] — **Non-fatal**: a single source row was dropped (blank
//!   ticket id) but every other row is fine. Stored inside
//!   [`crate::output::ConversionOutput`] so callers can inspect partial
//!   success rather than losing the whole report to one bad row.
//!
//! The separation lets callers decide their own tolerance: abort when any
//! row is dropped, log and continue, or collect the skips for an audit
//! report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the jira2report library.
///
/// Row-level drops use [`RowSkip`] and are stored in
/// [`crate::output::ConversionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The CSV reader could not make sense of the file.
    #[error("Failed to parse CSV '{path}': {detail}")]
    InvalidCsv { path: PathBuf, detail: String },

    /// Columns the selected conversion requires were not present.
    ///
    /// Matching is case-insensitive on trimmed header names, so this only
    /// fires when a column is genuinely absent, not merely cased oddly.
    #[error(
        "Missing required columns (checked case-insensitive): {missing:?}\n\
         Found headers: {found:?}\n\
         Export the Jira filter again with all fields included."
    )]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output extension is neither `.csv` nor `.xlsx`.
    #[error("Unsupported output format for '{path}'\nUse a .xlsx or .csv file name.")]
    UnsupportedOutputFormat { path: PathBuf },

    /// Could not create or write the output report file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet writer rejected the workbook.
    #[error("Failed to build workbook for '{path}': {detail}")]
    WorkbookFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Jira errors ───────────────────────────────────────────────────────
    /// One or more credential keys are missing from the environment.
    #[error(
        "Missing Jira credentials: {keys:?}\n\
         Set them in the environment or a .env file next to the binary.\n\
         Recognised keys: JIRA_URL, JIRA_EMAIL, JIRA_API_TOKEN, JIRA_WORKLOG_AUTHORS."
    )]
    CredentialsMissing { keys: Vec<&'static str> },

    /// A worklog date endpoint was not a valid `YYYY-MM-DD` date, or the
    /// range was inverted.
    #[error("Invalid worklog date range '{start}'..'{end}': {detail}")]
    InvalidDateRange {
        start: String,
        end: String,
        detail: String,
    },

    /// Jira rejected the credentials (HTTP 401/403).
    #[error(
        "Jira authentication failed ({status})\n\
         Your API token may have expired or is invalid.\n\
         Generate a new one at https://id.atlassian.com/manage-profile/security/api-tokens"
    )]
    JiraAuthFailed { status: u16 },

    /// Jira returned any other non-success status.
    #[error("Jira API error {status}: {body}")]
    JiraApi { status: u16, body: String },

    /// The request to Jira timed out.
    #[error("Jira request timed out: {0}")]
    Timeout(String),

    /// Could not reach Jira at all.
    #[error("Network error talking to Jira: {0}\nCheck your internet connection and JIRA_URL.")]
    Network(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for ConvertError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConvertError::Timeout(err.to_string())
        } else if err.is_connect() {
            ConvertError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            ConvertError::JiraApi {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ConvertError::Internal(err.to_string())
        }
    }
}

/// A non-fatal drop of a single source row.
///
/// Stored in [`crate::output::ConversionOutput`] when validation removes a
/// row. The overall conversion always continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RowSkip {
    /// The row had no ticket id, so there is nothing to upload.
    ///
    /// `row` is the 1-indexed data row (the header is not counted).
    #[error("Row {row}: missing ticket id")]
    MissingTicketId { row: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_both_sets() {
        let e = ConvertError::MissingColumns {
            missing: vec!["Issue Key".into()],
            found: vec!["Summary".into(), "Status".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("Issue Key"), "got: {msg}");
        assert!(msg.contains("Summary"), "got: {msg}");
    }

    #[test]
    fn credentials_missing_names_env_keys() {
        let e = ConvertError::CredentialsMissing {
            keys: vec!["JIRA_URL", "JIRA_API_TOKEN"],
        };
        let msg = e.to_string();
        assert!(msg.contains("JIRA_URL"));
        assert!(msg.contains(".env"));
    }

    #[test]
    fn auth_failed_mentions_token_page() {
        let e = ConvertError::JiraAuthFailed { status: 401 };
        assert!(e.to_string().contains("401"));
        assert!(e.to_string().contains("api-tokens"));
    }

    #[test]
    fn row_skip_display() {
        let s = RowSkip::MissingTicketId { row: 7 };
        assert_eq!(s.to_string(), "Row 7: missing ticket id");
    }
}
