//! MSM transformation: detailed monthly tower reporting.
//!
//! Builds the 28-column MSM sheet from whatever subset of source columns
//! the dump provides. Unlike the Applens mapping, every source column is
//! optional here: monthly tower reports are assembled from dumps of very
//! different shapes, so an absent column yields empty cells instead of a
//! hard error.

use crate::config::ConversionConfig;
use crate::error::RowSkip;
use crate::output::Report;
use crate::pipeline::input::{MsmColumns, SourceTable};
use chrono::Local;
use tracing::{info, warn};

/// MSM output column order - exact as the reporting template specifies.
pub const MSM_HEADERS: [&str; 28] = [
    "S.No",
    "Tower",
    "Application",
    "JIRA ID",
    "Priority",
    "Issue Summary",
    "Assignee",
    "Platform / Content / Data",
    "Status",
    "Issue Status",
    "Month",
    "Issue Creation Time mm/dd/yyyy hh:mm:ss am/pm",
    "Issue Assigned Time (CTS)mm/dd/yyyy hh:mm:ss am/pm",
    "CTS Response Time mm/dd/yyyy hh:mm:ss am/pm",
    "Response SLA Met?",
    "CTS Resolution Time mm/dd/yyyy hh:mm:ss am/pm",
    "Resolution SLA Met?",
    "Last updated Date",
    "Service Category",
    "Request Type",
    "Causal Code",
    "Resolution Code",
    "High Level Debt Classification",
    "Technical Debt Classification",
    "Functional Debt Classification",
    "Operational Debt Classification",
    "Knowledge Debt Classification",
    "Time Spent()",
];

/// Jira priority → MSM priority band. Anything unrecognised lands in the
/// lowest band rather than failing the row.
const PRIORITY_MAPPING: [(&str, &str); 4] = [
    ("Not set", "P3 (Low)"),
    ("Minor", "P3 (Low)"),
    ("Medium", "P2 (Medium)"),
    ("Major", "P1 (High)"),
];

const PRIORITY_DEFAULT: &str = "P3 (Low)";

/// Position of `JIRA ID` within [`MSM_HEADERS`].
const COL_JIRA_ID: usize = 3;

fn map_priority(value: &str) -> &'static str {
    PRIORITY_MAPPING
        .iter()
        .find(|(from, _)| *from == value.trim())
        .map(|(_, to)| *to)
        .unwrap_or(PRIORITY_DEFAULT)
}

/// Resolution SLA rule: CSI tickets carry an SLA, everything else is out
/// of scope for the measure.
fn resolution_sla(jira_id: &str) -> &'static str {
    if jira_id.to_uppercase().contains("CSI") {
        "Yes"
    } else {
        "NA"
    }
}

/// Worklog seconds → hours, rounded to 2 decimals. Non-numeric input
/// coerces to zero.
fn worklog_hours(value: &str) -> f64 {
    let seconds: f64 = value.trim().parse().unwrap_or(0.0);
    (seconds / 3600.0 * 100.0).round() / 100.0
}

/// Build the MSM report rows.
///
/// Timestamp cells are verbatim copies of the source values; the report
/// template's own headers describe the expected rendering and dumps
/// produced by the fetcher are already normalised.
pub fn apply(table: &SourceTable, cols: &MsmColumns, config: &ConversionConfig) -> Report {
    info!("Applying MSM transformations...");

    let month = config
        .month
        .clone()
        .unwrap_or_else(|| Local::now().format("%B").to_string());

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cell = |c: Option<usize>| table.cell(row, c).to_string();
            let jira_id = cell(cols.issue_key);
            let status = cell(cols.status);
            let created = cell(cols.created);
            let updated = cell(cols.updated);

            vec![
                (i + 1).to_string(),                       // S.No
                cell(cols.project_name),                   // Tower
                config.application.clone(),                // Application
                jira_id.clone(),                           // JIRA ID
                map_priority(&cell(cols.priority)).into(), // Priority
                cell(cols.summary),                        // Issue Summary
                cell(cols.assignee),                       // Assignee
                cell(cols.platform),                       // Platform / Content / Data
                status.clone(),                            // Status
                status,                                    // Issue Status
                month.clone(),                             // Month
                created.clone(),                           // Issue Creation Time
                created,                                   // Issue Assigned Time (CTS)
                updated.clone(),                           // CTS Response Time
                "Yes".into(),                              // Response SLA Met?
                cell(cols.resolved),                       // CTS Resolution Time
                resolution_sla(&jira_id).into(),           // Resolution SLA Met?
                updated,                                   // Last updated Date
                String::new(),                             // Service Category
                String::new(),                             // Request Type
                String::new(),                             // Causal Code
                String::new(),                             // Resolution Code
                String::new(),                             // High Level Debt Classification
                String::new(),                             // Technical Debt Classification
                String::new(),                             // Functional Debt Classification
                String::new(),                             // Operational Debt Classification
                String::new(),                             // Knowledge Debt Classification
                format!("{:.2}", worklog_hours(&cell(cols.worklog))), // Time Spent()
            ]
        })
        .collect();

    info!("MSM transformation complete. Generated {} rows.", rows.len());

    Report {
        headers: MSM_HEADERS.iter().map(|s| s.to_string()).collect(),
        rows,
    }
}

/// Drop rows without a JIRA ID.
///
/// S.No values assigned before the drop are kept, so the sequence shows a
/// gap where a row was removed — the gap is the audit trail.
pub fn validate(mut report: Report) -> (Report, Vec<RowSkip>) {
    info!("Validating MSM data...");

    let mut skipped = Vec::new();
    let mut kept = Vec::with_capacity(report.rows.len());
    for (i, row) in report.rows.drain(..).enumerate() {
        if row[COL_JIRA_ID].trim().is_empty() {
            skipped.push(RowSkip::MissingTicketId { row: i + 1 });
            continue;
        }
        kept.push(row);
    }

    if !skipped.is_empty() {
        warn!("Dropped {} rows with missing JIRA IDs.", skipped.len());
    }
    info!("MSM validation complete.");

    report.rows = kept;
    (report, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::input::resolve_msm;

    fn fixture() -> (SourceTable, MsmColumns) {
        let headers: Vec<String> = [
            "Issue Key",
            "Project Name",
            "Summary",
            "Assignee",
            "Priority",
            "Status",
            "Custom field (Platform)",
            "Created",
            "Updated",
            "Resolved",
            "Time Spent",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let table = SourceTable {
            rows: vec![
                vec![
                    "CSI-101".into(),
                    "Alpha Tower".into(),
                    "Login broken".into(),
                    "Dana Park".into(),
                    "Major".into(),
                    "Done".into(),
                    "Platform".into(),
                    "2025-12-01 09:00:00".into(),
                    "2025-12-01 10:00:00".into(),
                    "2025-12-02 08:00:00".into(),
                    "5400".into(),
                ],
                vec![
                    "OPS-7".into(),
                    "Beta Tower".into(),
                    "Slow report".into(),
                    "".into(),
                    "Unknown".into(),
                    "Open".into(),
                    "Data".into(),
                    "2025-12-03 09:00:00".into(),
                    "2025-12-03 11:00:00".into(),
                    "".into(),
                    "not-a-number".into(),
                ],
                vec![
                    "".into(),
                    "Gamma Tower".into(),
                    "Orphan row".into(),
                    "".into(),
                    "Minor".into(),
                    "Open".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                ],
            ],
            headers: headers.clone(),
        };
        let cols = resolve_msm(&headers);
        (table, cols)
    }

    fn config() -> ConversionConfig {
        ConversionConfig::builder().month("December").build().unwrap()
    }

    #[test]
    fn header_order_is_exact() {
        let (table, cols) = fixture();
        let report = apply(&table, &cols, &config());
        assert_eq!(report.headers.len(), 28);
        assert_eq!(report.headers[0], "S.No");
        assert_eq!(report.headers[10], "Month");
        assert_eq!(report.headers[27], "Time Spent()");
    }

    #[test]
    fn maps_cells_and_constants() {
        let (table, cols) = fixture();
        let report = apply(&table, &cols, &config());
        let row = &report.rows[0];

        assert_eq!(row[0], "1");
        assert_eq!(row[1], "Alpha Tower");
        assert_eq!(row[2], "HMOF");
        assert_eq!(row[3], "CSI-101");
        assert_eq!(row[4], "P1 (High)");
        assert_eq!(row[8], "Done");
        assert_eq!(row[9], "Done"); // Issue Status mirrors Status
        assert_eq!(row[10], "December");
        assert_eq!(row[11], row[12]); // creation and assigned both from Created
        assert_eq!(row[14], "Yes"); // Response SLA constant
        assert_eq!(row[18], ""); // Service Category left empty
    }

    #[test]
    fn priority_mapping_and_default() {
        assert_eq!(map_priority("Major"), "P1 (High)");
        assert_eq!(map_priority("Medium"), "P2 (Medium)");
        assert_eq!(map_priority("Minor"), "P3 (Low)");
        assert_eq!(map_priority("Not set"), "P3 (Low)");
        assert_eq!(map_priority("Blocker"), "P3 (Low)");
        assert_eq!(map_priority(""), "P3 (Low)");
    }

    #[test]
    fn resolution_sla_follows_csi_rule() {
        let (table, cols) = fixture();
        let report = apply(&table, &cols, &config());
        assert_eq!(report.rows[0][16], "Yes"); // CSI-101
        assert_eq!(report.rows[1][16], "NA"); // OPS-7
        assert_eq!(resolution_sla("abc-csi-9"), "Yes");
    }

    #[test]
    fn worklog_seconds_to_hours() {
        let (table, cols) = fixture();
        let report = apply(&table, &cols, &config());
        assert_eq!(report.rows[0][27], "1.50"); // 5400s
        assert_eq!(report.rows[1][27], "0.00"); // coerced
        assert_eq!(worklog_hours("4500"), 1.25);
        assert_eq!(worklog_hours("1000"), 0.28);
    }

    #[test]
    fn validate_drops_blank_jira_ids_keeping_sno_gaps() {
        let (table, cols) = fixture();
        let (report, skipped) = validate(apply(&table, &cols, &config()));

        assert_eq!(report.rows.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert!(matches!(skipped[0], RowSkip::MissingTicketId { row: 3 }));
        // Remaining sequence numbers are untouched.
        assert_eq!(report.rows[0][0], "1");
        assert_eq!(report.rows[1][0], "2");
    }

    #[test]
    fn absent_columns_yield_empty_cells_and_defaults() {
        let headers: Vec<String> = vec!["Issue Key".to_string()];
        let table = SourceTable {
            rows: vec![vec!["CSI-1".to_string()]],
            headers: headers.clone(),
        };
        let cols = resolve_msm(&headers);
        let report = apply(&table, &cols, &config());
        let row = &report.rows[0];

        assert_eq!(row[1], ""); // Tower
        assert_eq!(row[4], "P3 (Low)"); // Priority default
        assert_eq!(row[27], "0.00"); // Time Spent default
    }
}
