//! Input loading: read a Jira CSV dump into a [`SourceTable`] and resolve
//! the columns each conversion needs.
//!
//! ## Why decode before parsing?
//!
//! Jira Cloud exports UTF-8, but dumps that have round-tripped through
//! Excel on Windows arrive as Latin-1 and fail UTF-8 validation on the
//! first accented character. The loader reads the raw bytes once, tries
//! UTF-8, and falls back to Latin-1 (every byte maps to the same code
//! point, so the fallback cannot fail) with a WARN so the operator knows
//! the file was re-encoded.
//!
//! Header matching is case-insensitive on trimmed names throughout:
//! `issue KEY` binds the same as `Issue Key`.

use crate::error::ConvertError;
use std::path::Path;
use tracing::{debug, info, warn};

/// A loaded CSV dump: raw headers and rows aligned to them.
///
/// Short records are padded with empty cells and long records truncated,
/// so every row has exactly `headers.len()` cells.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Cell accessor tolerating unbound columns.
    pub fn cell<'a>(&'a self, row: &'a [String], col: Option<usize>) -> &'a str {
        col.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
    }
}

/// Read and decode the dump at `path`.
pub fn load_table(path: &Path) -> Result<SourceTable, ConvertError> {
    info!("Reading input CSV file from {}", path.display());

    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConvertError::InvalidCsv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            warn!("UTF-8 decode failed, retrying with latin1 encoding.");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ConvertError::InvalidCsv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
        .iter()
        .map(str::to_string)
        .collect();
    debug!("Found {} total columns in file", headers.len());

    let width = headers.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ConvertError::InvalidCsv {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    info!("Successfully loaded {} rows.", rows.len());
    Ok(SourceTable { headers, rows })
}

fn norm(header: &str) -> String {
    header.trim().to_lowercase()
}

// ── Applens column resolution ────────────────────────────────────────────

/// Source columns the Applens mapping requires, in mapping order.
pub const APPLENS_REQUIRED: [&str; 5] =
    ["Issue Key", "Issue Type", "Updated", "Status", "Resolved"];

/// Indexes of the five required Applens source columns.
#[derive(Debug, Clone, Copy)]
pub struct ApplensColumns {
    pub issue_key: usize,
    pub issue_type: usize,
    pub updated: usize,
    pub status: usize,
    pub resolved: usize,
}

impl ApplensColumns {
    /// The `(canonical, actual header)` pairs this binding resolved.
    pub fn bindings(&self, headers: &[String]) -> Vec<(String, String)> {
        [
            ("Issue Key", self.issue_key),
            ("Issue Type", self.issue_type),
            ("Updated", self.updated),
            ("Status", self.status),
            ("Resolved", self.resolved),
        ]
        .into_iter()
        .map(|(name, i)| (name.to_string(), headers[i].clone()))
        .collect()
    }
}

/// Resolve the Applens source columns, case-insensitively.
///
/// Every required column must be present; the error lists both what is
/// missing and what the file actually contains.
pub fn resolve_applens(headers: &[String]) -> Result<ApplensColumns, ConvertError> {
    let lookup = |name: &str| headers.iter().position(|h| norm(h) == norm(name));

    match (
        lookup("Issue Key"),
        lookup("Issue Type"),
        lookup("Updated"),
        lookup("Status"),
        lookup("Resolved"),
    ) {
        (Some(issue_key), Some(issue_type), Some(updated), Some(status), Some(resolved)) => {
            Ok(ApplensColumns {
                issue_key,
                issue_type,
                updated,
                status,
                resolved,
            })
        }
        _ => Err(ConvertError::MissingColumns {
            missing: APPLENS_REQUIRED
                .into_iter()
                .filter(|name| lookup(name).is_none())
                .map(str::to_string)
                .collect(),
            found: headers.to_vec(),
        }),
    }
}

// ── MSM column resolution ────────────────────────────────────────────────

/// One canonical MSM source column and how to recognise it.
///
/// `exact` candidates are tried before `contains` substrings; the split
/// keeps short names like `key` from being swallowed by columns such as
/// `Keywords` while still letting `Custom field (Platform)` bind to
/// Platform.
struct MsmRule {
    canonical: &'static str,
    exact: &'static [&'static str],
    contains: &'static [&'static str],
}

const MSM_RULES: [MsmRule; 11] = [
    MsmRule { canonical: "Issue Key", exact: &["issue key", "key"], contains: &[] },
    MsmRule { canonical: "Project Name", exact: &["project name", "project"], contains: &[] },
    MsmRule { canonical: "Summary", exact: &["summary"], contains: &[] },
    MsmRule { canonical: "Assignee", exact: &[], contains: &["assignee"] },
    MsmRule { canonical: "Priority", exact: &["priority"], contains: &[] },
    MsmRule { canonical: "Status", exact: &["status"], contains: &[] },
    MsmRule { canonical: "Platform", exact: &[], contains: &["platform"] },
    MsmRule { canonical: "Created", exact: &[], contains: &["created"] },
    MsmRule { canonical: "Updated", exact: &[], contains: &["updated"] },
    MsmRule { canonical: "Resolved", exact: &[], contains: &["resolved"] },
    MsmRule { canonical: "Worklog", exact: &[], contains: &["worklog", "time spent"] },
];

/// Indexes of the MSM source columns that resolved. All optional: an
/// unmatched column simply yields empty cells in the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsmColumns {
    pub issue_key: Option<usize>,
    pub project_name: Option<usize>,
    pub summary: Option<usize>,
    pub assignee: Option<usize>,
    pub priority: Option<usize>,
    pub status: Option<usize>,
    pub platform: Option<usize>,
    pub created: Option<usize>,
    pub updated: Option<usize>,
    pub resolved: Option<usize>,
    pub worklog: Option<usize>,
}

impl MsmColumns {
    fn slot(&mut self, canonical: &str) -> &mut Option<usize> {
        match canonical {
            "Issue Key" => &mut self.issue_key,
            "Project Name" => &mut self.project_name,
            "Summary" => &mut self.summary,
            "Assignee" => &mut self.assignee,
            "Priority" => &mut self.priority,
            "Status" => &mut self.status,
            "Platform" => &mut self.platform,
            "Created" => &mut self.created,
            "Updated" => &mut self.updated,
            "Resolved" => &mut self.resolved,
            "Worklog" => &mut self.worklog,
            other => unreachable!("unknown canonical column {other}"),
        }
    }

    fn get(&self, canonical: &str) -> Option<usize> {
        match canonical {
            "Issue Key" => self.issue_key,
            "Project Name" => self.project_name,
            "Summary" => self.summary,
            "Assignee" => self.assignee,
            "Priority" => self.priority,
            "Status" => self.status,
            "Platform" => self.platform,
            "Created" => self.created,
            "Updated" => self.updated,
            "Resolved" => self.resolved,
            "Worklog" => self.worklog,
            _ => None,
        }
    }

    /// The `(canonical, actual header)` pairs that resolved.
    pub fn bindings(&self, headers: &[String]) -> Vec<(String, String)> {
        MSM_RULES
            .iter()
            .filter_map(|rule| {
                self.get(rule.canonical)
                    .map(|i| (rule.canonical.to_string(), headers[i].clone()))
            })
            .collect()
    }

    /// Canonical columns that did not resolve.
    pub fn unresolved(&self) -> Vec<String> {
        MSM_RULES
            .iter()
            .filter(|rule| self.get(rule.canonical).is_none())
            .map(|rule| rule.canonical.to_string())
            .collect()
    }
}

/// Resolve the MSM source columns.
///
/// File columns are scanned left to right; each binds to the first still
/// unbound canonical column whose rule it satisfies. Each canonical name
/// binds at most once, so a dump with both `Updated` and `Last Updated`
/// cannot produce duplicate bindings.
pub fn resolve_msm(headers: &[String]) -> MsmColumns {
    let mut columns = MsmColumns::default();

    for (index, header) in headers.iter().enumerate() {
        let lower = norm(header);
        for rule in &MSM_RULES {
            let slot = columns.slot(rule.canonical);
            if slot.is_some() {
                continue;
            }
            let exact_hit = rule.exact.iter().any(|c| lower == *c);
            let contains_hit = rule.contains.iter().any(|c| lower.contains(c));
            if exact_hit || contains_hit {
                *slot = Some(index);
                break;
            }
        }
    }

    debug!(
        "Resolved {} MSM columns: {:?}",
        columns.bindings(headers).len(),
        columns.bindings(headers).iter().map(|(c, _)| c).collect::<Vec<_>>()
    );
    columns
}
