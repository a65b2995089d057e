//! Applens transformation: the standard Ticket ID / Status upload.
//!
//! Five source columns are renamed, three constants are injected, and the
//! result is emitted in the strict column order the Applens upload screen
//! expects. Rows without a ticket id are dropped during validation — an
//! upload row with no key would be rejected server-side anyway.

use crate::config::ConversionConfig;
use crate::error::RowSkip;
use crate::output::Report;
use crate::pipeline::dates;
use crate::pipeline::input::{ApplensColumns, SourceTable};
use tracing::{info, warn};

/// The strictly enforced order of columns for the final output.
pub const APPLENS_HEADERS: [&str; 8] = [
    "Ticket ID",
    "Ticket Type",
    "Open Date",
    "Priority",
    "Status",
    "Application",
    "Assignment Group",
    "Closed Date",
];

/// Constant injected into every row's `Priority` cell.
const PRIORITY_CONSTANT: &str = "NONE";

// Output cell positions within APPLENS_HEADERS.
const COL_TICKET_ID: usize = 0;
const COL_OPEN_DATE: usize = 2;
const COL_CLOSED_DATE: usize = 7;

/// Rename columns and inject the constant cells.
///
/// Dates are carried verbatim here; [`validate`] coerces them.
pub fn apply(table: &SourceTable, cols: &ApplensColumns, config: &ConversionConfig) -> Report {
    info!("Applying transformations...");

    let rows = table
        .rows
        .iter()
        .map(|row| {
            vec![
                row[cols.issue_key].clone(),
                row[cols.issue_type].clone(),
                row[cols.updated].clone(),
                PRIORITY_CONSTANT.to_string(),
                row[cols.status].clone(),
                config.application.clone(),
                config.assignment_group.clone(),
                row[cols.resolved].clone(),
            ]
        })
        .collect();

    Report {
        headers: APPLENS_HEADERS.iter().map(|s| s.to_string()).collect(),
        rows,
    }
}

/// Drop rows without a ticket id and normalise the date columns.
///
/// Unparseable dates coerce to empty cells rather than failing the run;
/// a `Closed Date` is legitimately absent for open tickets.
pub fn validate(mut report: Report) -> (Report, Vec<RowSkip>) {
    info!("Validating data...");

    let mut skipped = Vec::new();
    let mut kept = Vec::with_capacity(report.rows.len());
    for (i, mut row) in report.rows.drain(..).enumerate() {
        if row[COL_TICKET_ID].trim().is_empty() {
            skipped.push(RowSkip::MissingTicketId { row: i + 1 });
            continue;
        }
        row[COL_OPEN_DATE] = dates::coerce(&row[COL_OPEN_DATE]);
        row[COL_CLOSED_DATE] = dates::coerce(&row[COL_CLOSED_DATE]);
        kept.push(row);
    }

    if !skipped.is_empty() {
        warn!("Dropped {} rows due to missing Ticket IDs.", skipped.len());
    }
    info!("Validation complete.");

    report.rows = kept;
    (report, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::input::resolve_applens;

    fn fixture() -> (SourceTable, ApplensColumns) {
        let headers: Vec<String> = ["Issue Key", "Issue Type", "Updated", "Status", "Resolved"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let table = SourceTable {
            rows: vec![
                vec![
                    "CSI-101".into(),
                    "Bug".into(),
                    "2025-12-01T09:30:00.000+0000".into(),
                    "Done".into(),
                    "2025-12-02T10:00:00.000+0000".into(),
                ],
                vec![
                    "".into(),
                    "Task".into(),
                    "2025-12-03".into(),
                    "Open".into(),
                    "".into(),
                ],
                vec![
                    "CSI-102".into(),
                    "Story".into(),
                    "garbage".into(),
                    "In Progress".into(),
                    "".into(),
                ],
            ],
            headers: headers.clone(),
        };
        let cols = resolve_applens(&headers).unwrap();
        (table, cols)
    }

    fn config() -> ConversionConfig {
        ConversionConfig::builder().build().unwrap()
    }

    #[test]
    fn apply_maps_and_injects_constants() {
        let (table, cols) = fixture();
        let report = apply(&table, &cols, &config());

        assert_eq!(report.headers, APPLENS_HEADERS.to_vec());
        let row = &report.rows[0];
        assert_eq!(row[0], "CSI-101"); // Ticket ID <- Issue Key
        assert_eq!(row[1], "Bug"); // Ticket Type <- Issue Type
        assert_eq!(row[3], "NONE"); // Priority constant
        assert_eq!(row[5], "HMOF"); // Application constant
        assert_eq!(row[6], "HMH Support Group"); // Assignment Group constant
    }

    #[test]
    fn validate_drops_blank_ticket_ids() {
        let (table, cols) = fixture();
        let (report, skipped) = validate(apply(&table, &cols, &config()));

        assert_eq!(report.rows.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert!(matches!(skipped[0], RowSkip::MissingTicketId { row: 2 }));
    }

    #[test]
    fn validate_normalises_dates_and_coerces_garbage() {
        let (table, cols) = fixture();
        let (report, _) = validate(apply(&table, &cols, &config()));

        assert_eq!(report.rows[0][2], "2025-12-01 09:30:00");
        assert_eq!(report.rows[0][7], "2025-12-02 10:00:00");
        // Unparseable Open Date and empty Closed Date both coerce to empty.
        assert_eq!(report.rows[1][2], "");
        assert_eq!(report.rows[1][7], "");
    }

    #[test]
    fn custom_constants_flow_through() {
        let (table, cols) = fixture();
        let config = ConversionConfig::builder()
            .application("OTHERAPP")
            .assignment_group("L2 Desk")
            .build()
            .unwrap();
        let report = apply(&table, &cols, &config);
        assert_eq!(report.rows[0][5], "OTHERAPP");
        assert_eq!(report.rows[0][6], "L2 Desk");
    }
}
