//! Jira Cloud search client.
//!
//! Uses the `/rest/api/3/search/jql` endpoint with cursor-based
//! pagination. The older offset-based search API is deprecated and
//! answers 410 for new sites, so it is deliberately not used here.

use crate::error::ConvertError;
use crate::jira::models::{SearchRequest, SearchResponse, FETCH_FIELDS};
use crate::jira::settings::JiraSettings;
use crate::jira::JiraIssue;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::info;

/// Batch size per search page.
const MAX_RESULTS: u32 = 100;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// An inclusive worklog date window, validated up front so a typo fails
/// before any network traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` endpoints and require `start <= end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConvertError> {
        let err = |detail: &str| ConvertError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
            detail: detail.to_string(),
        };

        let start_date = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
            .map_err(|_| err("start is not a YYYY-MM-DD date"))?;
        let end_date = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
            .map_err(|_| err("end is not a YYYY-MM-DD date"))?;
        if start_date > end_date {
            return Err(err("start is after end"));
        }
        Ok(Self {
            start: start_date,
            end: end_date,
        })
    }

    pub fn start(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Build the worklog JQL for the configured authors and window.
pub fn build_jql(authors: &str, range: &DateRange) -> String {
    format!(
        "timespent is not null AND worklogAuthor in ({}) \
         AND worklogDate >= '{}' AND worklogDate <= '{}'",
        authors,
        range.start(),
        range.end()
    )
}

/// HTTP client for the Jira Cloud REST API, authenticated with the
/// email + API token pair.
pub struct JiraClient {
    http: reqwest::Client,
    settings: JiraSettings,
}

impl JiraClient {
    pub fn new(settings: JiraSettings) -> Result<Self, ConvertError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConvertError::Internal(e.to_string()))?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &JiraSettings {
        &self.settings
    }

    /// Fetch every issue with worklog activity in `range` by the
    /// configured authors, following the pagination cursor to the end.
    pub async fn search_worklogs(&self, range: &DateRange) -> Result<Vec<JiraIssue>, ConvertError> {
        let jql = build_jql(&self.settings.worklog_authors, range);
        info!("Connecting to Jira: {}", self.settings.base_url);
        info!("JQL Length: {} chars", jql.len());

        let url = format!("{}/rest/api/3/search/jql", self.settings.base_url);
        let mut fields: Vec<String> = FETCH_FIELDS.iter().map(|s| s.to_string()).collect();
        fields.push(self.settings.platform_field.clone());

        let mut all_issues = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            match &next_page_token {
                Some(token) => {
                    let prefix: String = token.chars().take(10).collect();
                    info!("Fetching page with token: {prefix}...");
                }
                None => info!("Fetching first page..."),
            }

            let body = SearchRequest {
                jql: jql.clone(),
                max_results: MAX_RESULTS,
                fields: fields.clone(),
                next_page_token: next_page_token.clone(),
            };

            let response = self
                .http
                .post(&url)
                .basic_auth(&self.settings.email, Some(&self.settings.api_token))
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(ConvertError::JiraAuthFailed {
                    status: status.as_u16(),
                });
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ConvertError::JiraApi {
                    status: status.as_u16(),
                    body,
                });
            }

            let page: SearchResponse = response
                .json()
                .await
                .map_err(|e| ConvertError::Internal(format!("Bad search response: {e}")))?;

            next_page_token = page.next_page_token;
            if page.issues.is_empty() {
                break;
            }
            all_issues.extend(page.issues);
            if next_page_token.is_none() {
                break;
            }
        }

        info!("Total issues fetched: {}", all_issues.len());
        Ok(all_issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn range() -> DateRange {
        DateRange::parse("2025-12-01", "2025-12-31").unwrap()
    }

    fn settings(base_url: &str) -> JiraSettings {
        JiraSettings::new(base_url, "bot@example.com", "token", "\"alice\", \"bob\"")
    }

    #[test]
    fn date_range_validates() {
        assert!(DateRange::parse("2025-12-01", "2025-12-31").is_ok());
        assert!(matches!(
            DateRange::parse("12/01/2025", "2025-12-31"),
            Err(ConvertError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            DateRange::parse("2025-12-31", "2025-12-01"),
            Err(ConvertError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn jql_embeds_authors_and_window() {
        let jql = build_jql("\"alice\", \"bob\"", &range());
        assert_eq!(
            jql,
            "timespent is not null AND worklogAuthor in (\"alice\", \"bob\") \
             AND worklogDate >= '2025-12-01' AND worklogDate <= '2025-12-31'"
        );
    }

    #[tokio::test]
    async fn search_follows_pagination_cursor() {
        let mut server = mockito::Server::new_async().await;

        let first = server
            .mock("POST", "/rest/api/3/search/jql")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJsonString(r#"{"maxResults": 100}"#.into()),
                Matcher::Regex("worklogAuthor".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"issues": [{"key": "CSI-1", "fields": {}}], "nextPageToken": "tok-2"}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("POST", "/rest/api/3/search/jql")
            .match_body(Matcher::PartialJsonString(
                r#"{"nextPageToken": "tok-2"}"#.into(),
            ))
            .with_status(200)
            .with_body(r#"{"issues": [{"key": "CSI-2", "fields": {}}]}"#)
            .create_async()
            .await;

        let client = JiraClient::new(settings(&server.url())).unwrap();
        let issues = client.search_worklogs(&range()).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let keys: Vec<_> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["CSI-1", "CSI-2"]);
    }

    #[tokio::test]
    async fn search_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // base64("bot@example.com:token")
        let mock = server
            .mock("POST", "/rest/api/3/search/jql")
            .match_header(
                "authorization",
                "Basic Ym90QGV4YW1wbGUuY29tOnRva2Vu",
            )
            .with_status(200)
            .with_body(r#"{"issues": []}"#)
            .create_async()
            .await;

        let client = JiraClient::new(settings(&server.url())).unwrap();
        let issues = client.search_worklogs(&range()).await.unwrap();

        mock.assert_async().await;
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/search/jql")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client = JiraClient::new(settings(&server.url())).unwrap();
        let result = client.search_worklogs(&range()).await;
        assert!(matches!(
            result,
            Err(ConvertError::JiraAuthFailed { status: 401 })
        ));
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/search/jql")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = JiraClient::new(settings(&server.url())).unwrap();
        match client.search_worklogs(&range()).await {
            Err(ConvertError::JiraApi { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected JiraApi, got {other:?}"),
        }
    }
}
