//! Wire models for the Jira Cloud search API and their flattening into
//! dump rows.

use crate::pipeline::dates;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column order of the worklog dump CSV, matching what the conversion
/// pipelines expect to find.
pub const DUMP_HEADERS: [&str; 12] = [
    "Issue Key",
    "Issue Type",
    "Updated",
    "Status",
    "Resolved",
    "Project Name",
    "Summary",
    "Assignee",
    "Priority",
    "Created",
    "Platform",
    "Worklog",
];

/// Fields requested from the search API, besides the site-specific
/// Platform custom field which is appended at request time.
pub const FETCH_FIELDS: [&str; 12] = [
    "key",
    "issuetype",
    "updated",
    "status",
    "resolutiondate",
    "project",
    "summary",
    "assignee",
    "priority",
    "created",
    "worklog",
    "timespent",
];

/// Body of `POST /rest/api/3/search/jql`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub max_results: u32,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// One page of search results. The cursor token is absent on the last
/// page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A named Jira entity (`{"name": "..."}`) such as status or priority.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Named {
    #[serde(default)]
    pub name: String,
}

/// A Jira user reference; only the display name matters here.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct User {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// An issue as returned by the search endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct JiraIssue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

/// The subset of issue fields the dump needs.
///
/// Custom fields keep their site-specific ids, so the Platform value
/// lands in `extra` and is looked up by id when flattening.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssueFields {
    #[serde(default)]
    pub issuetype: Option<Named>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub status: Option<Named>,
    #[serde(rename = "resolutiondate", default)]
    pub resolution_date: Option<String>,
    #[serde(default)]
    pub project: Option<Named>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub priority: Option<Named>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub timespent: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl JiraIssue {
    /// Flatten the issue into a dump row aligned to [`DUMP_HEADERS`].
    ///
    /// Timestamps lose their timezone offset for spreadsheet
    /// compatibility; absent fields become empty cells; a missing
    /// `timespent` becomes `0`.
    pub fn to_row(&self, platform_field: &str) -> Vec<String> {
        let f = &self.fields;
        let named = |n: &Option<Named>| n.as_ref().map(|v| v.name.clone()).unwrap_or_default();
        let date = |v: &Option<String>| {
            v.as_deref().map(dates::strip_timezone).unwrap_or_default()
        };

        vec![
            self.key.clone(),
            named(&f.issuetype),
            date(&f.updated),
            named(&f.status),
            date(&f.resolution_date),
            named(&f.project),
            f.summary.clone().unwrap_or_default(),
            f.assignee
                .as_ref()
                .map(|a| a.display_name.clone())
                .unwrap_or_default(),
            named(&f.priority),
            date(&f.created),
            f.platform(platform_field),
            f.timespent.unwrap_or(0).to_string(),
        ]
    }
}

impl IssueFields {
    /// Extract the Platform value from the configured custom field.
    ///
    /// The field may be a named object or a bare string depending on the
    /// field type configured on the site.
    fn platform(&self, field_id: &str) -> String {
        match self.extra.get(field_id) {
            Some(Value::Object(map)) => map
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_json() -> &'static str {
        r#"{
            "key": "CSI-101",
            "fields": {
                "issuetype": {"name": "Bug"},
                "updated": "2025-12-01T10:00:00.000+0000",
                "status": {"name": "Done"},
                "resolutiondate": "2025-12-02T08:30:00.000+0000",
                "project": {"name": "Alpha Tower"},
                "summary": "Login broken",
                "assignee": {"displayName": "Dana Park"},
                "priority": {"name": "Major"},
                "created": "2025-11-30T09:00:00.000+0000",
                "timespent": 5400,
                "customfield_12345": {"name": "Platform"}
            }
        }"#
    }

    #[test]
    fn deserialises_and_flattens() {
        let issue: JiraIssue = serde_json::from_str(issue_json()).unwrap();
        let row = issue.to_row("customfield_12345");

        assert_eq!(row.len(), DUMP_HEADERS.len());
        assert_eq!(row[0], "CSI-101");
        assert_eq!(row[1], "Bug");
        assert_eq!(row[2], "2025-12-01 10:00:00"); // offset stripped
        assert_eq!(row[4], "2025-12-02 08:30:00");
        assert_eq!(row[7], "Dana Park");
        assert_eq!(row[10], "Platform");
        assert_eq!(row[11], "5400");
    }

    #[test]
    fn missing_fields_become_empty_or_zero() {
        let issue: JiraIssue =
            serde_json::from_str(r#"{"key": "OPS-1", "fields": {}}"#).unwrap();
        let row = issue.to_row("customfield_12345");

        assert_eq!(row[0], "OPS-1");
        assert!(row[1..11].iter().all(|c| c.is_empty()));
        assert_eq!(row[11], "0");
    }

    #[test]
    fn null_fields_tolerated() {
        let issue: JiraIssue = serde_json::from_str(
            r#"{"key": "OPS-2", "fields": {"assignee": null, "timespent": null, "status": null}}"#,
        )
        .unwrap();
        let row = issue.to_row("customfield_12345");
        assert_eq!(row[3], "");
        assert_eq!(row[7], "");
        assert_eq!(row[11], "0");
    }

    #[test]
    fn platform_accepts_bare_string_field() {
        let issue: JiraIssue = serde_json::from_str(
            r#"{"key": "OPS-3", "fields": {"customfield_99": "Content"}}"#,
        )
        .unwrap();
        assert_eq!(issue.to_row("customfield_99")[10], "Content");
        assert_eq!(issue.to_row("customfield_12345")[10], "");
    }

    #[test]
    fn search_request_serialises_camel_case() {
        let req = SearchRequest {
            jql: "timespent is not null".into(),
            max_results: 100,
            fields: vec!["key".into()],
            next_page_token: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("maxResults"));
        assert!(!json.contains("nextPageToken")); // skipped when None

        let req = SearchRequest {
            next_page_token: Some("abc".into()),
            ..req
        };
        assert!(serde_json::to_string(&req).unwrap().contains("nextPageToken"));
    }

    #[test]
    fn search_response_defaults() {
        let page: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(page.issues.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
