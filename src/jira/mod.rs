//! Jira Cloud worklog fetch: settings, wire models, client, and the
//! fetch-to-dump orchestration.
//!
//! The dump this module writes has the same column set the conversion
//! pipelines consume, so `fetch` output feeds straight into `convert`.

pub mod client;
pub mod models;
pub mod settings;

pub use client::{build_jql, DateRange, JiraClient};
pub use models::{JiraIssue, DUMP_HEADERS};
pub use settings::JiraSettings;

use crate::config::ConversionMode;
use crate::error::ConvertError;
use crate::output::Report;
use crate::pipeline::write;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Result of a fetch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchStats {
    /// Issues matching the worklog query.
    pub issues: usize,
    /// Whether a dump file was written. False when nothing matched —
    /// an empty dump would only feed an empty conversion.
    pub written: bool,
}

/// Fetch worklog-bearing issues and write them as a dump CSV.
///
/// Returns `Ok` with `written: false` (and a WARN log) when the query
/// matches nothing; every transport or API failure is an `Err`.
pub async fn fetch_to_csv(
    settings: &JiraSettings,
    range: &DateRange,
    output_path: impl AsRef<Path>,
) -> Result<FetchStats, ConvertError> {
    let output_path = output_path.as_ref();
    let client = JiraClient::new(settings.clone())?;
    let issues = client.search_worklogs(range).await?;

    if issues.is_empty() {
        warn!("No tickets found matching criteria.");
        return Ok(FetchStats {
            issues: 0,
            written: false,
        });
    }

    let report = Report {
        headers: DUMP_HEADERS.iter().map(|s| s.to_string()).collect(),
        rows: issues
            .iter()
            .map(|issue| issue.to_row(&settings.platform_field))
            .collect(),
    };

    write::write_report(&report, output_path, ConversionMode::Applens)?;
    info!("Saved Jira dump to {}", output_path.display());

    Ok(FetchStats {
        issues: issues.len(),
        written: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_writes_dump_consumable_by_convert() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/search/jql")
            .with_status(200)
            .with_body(
                r#"{"issues": [{
                    "key": "CSI-9",
                    "fields": {
                        "issuetype": {"name": "Bug"},
                        "status": {"name": "Done"},
                        "updated": "2025-12-01T10:00:00.000+0000",
                        "timespent": 3600
                    }
                }]}"#,
            )
            .create_async()
            .await;

        let settings = JiraSettings::new(server.url(), "a@b.c", "t", "\"alice\"");
        let range = DateRange::parse("2025-12-01", "2025-12-31").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("jira_dump.csv");

        let stats = fetch_to_csv(&settings, &range, &dump).await.unwrap();
        assert_eq!(stats.issues, 1);
        assert!(stats.written);

        // The dump feeds the Applens conversion directly.
        let config = crate::ConversionConfig::builder().build().unwrap();
        let out = crate::convert(&dump, &config).await.unwrap();
        assert_eq!(out.stats.rows_written, 1);
        assert_eq!(out.report.rows[0][0], "CSI-9");
    }

    #[tokio::test]
    async fn fetch_skips_write_when_nothing_matches() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/search/jql")
            .with_status(200)
            .with_body(r#"{"issues": []}"#)
            .create_async()
            .await;

        let settings = JiraSettings::new(server.url(), "a@b.c", "t", "\"alice\"");
        let range = DateRange::parse("2025-12-01", "2025-12-31").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("jira_dump.csv");

        let stats = fetch_to_csv(&settings, &range, &dump).await.unwrap();
        assert_eq!(stats.issues, 0);
        assert!(!stats.written);
        assert!(!dump.exists());
    }
}
