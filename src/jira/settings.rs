//! Jira credentials, read from the process environment.
//!
//! The desktop tool shipped with a `.env` file holding four keys; the CLI
//! loads that file (dotenvy) before calling [`JiraSettings::from_env`], so
//! the same file keeps working. Library callers can also construct
//! settings directly for tests or embedding.

use crate::error::ConvertError;
use std::fmt;

pub const ENV_URL: &str = "JIRA_URL";
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_WORKLOG_AUTHORS: &str = "JIRA_WORKLOG_AUTHORS";
/// Optional override for the Platform custom field id; field ids are
/// site-specific.
pub const ENV_PLATFORM_FIELD: &str = "JIRA_PLATFORM_FIELD";

const DEFAULT_PLATFORM_FIELD: &str = "customfield_12345";

/// Connection and query settings for the Jira Cloud REST API.
#[derive(Clone)]
pub struct JiraSettings {
    /// Site base URL, stored without a trailing slash.
    pub base_url: String,
    /// Account email for basic auth.
    pub email: String,
    /// API token paired with the email.
    pub api_token: String,
    /// Comma-separated author list, inserted verbatim into the JQL
    /// `worklogAuthor in (...)` clause.
    pub worklog_authors: String,
    /// Custom field id that carries the Platform value.
    pub platform_field: String,
}

impl JiraSettings {
    /// Build settings explicitly (tests, embedding).
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
        worklog_authors: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            api_token: api_token.into(),
            worklog_authors: worklog_authors.into(),
            platform_field: DEFAULT_PLATFORM_FIELD.to_string(),
        }
    }

    /// Read settings from the environment.
    ///
    /// Every missing or empty key is collected before erroring so the
    /// operator fixes the `.env` file in one pass, not one key at a time.
    pub fn from_env() -> Result<Self, ConvertError> {
        let get = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let base_url = get(ENV_URL).unwrap_or_else(|| {
            missing.push(ENV_URL);
            String::new()
        });
        let email = get(ENV_EMAIL).unwrap_or_else(|| {
            missing.push(ENV_EMAIL);
            String::new()
        });
        let api_token = get(ENV_API_TOKEN).unwrap_or_else(|| {
            missing.push(ENV_API_TOKEN);
            String::new()
        });
        let worklog_authors = get(ENV_WORKLOG_AUTHORS).unwrap_or_else(|| {
            missing.push(ENV_WORKLOG_AUTHORS);
            String::new()
        });

        if !missing.is_empty() {
            return Err(ConvertError::CredentialsMissing { keys: missing });
        }

        let mut settings = Self::new(base_url, email, api_token, worklog_authors);
        if let Some(field) = get(ENV_PLATFORM_FIELD) {
            settings.platform_field = field;
        }
        Ok(settings)
    }
}

impl fmt::Debug for JiraSettings {
    // The token never reaches logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraSettings")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .field("worklog_authors", &self.worklog_authors)
            .field("platform_field", &self.platform_field)
            .finish()
    }
}
