//! Output types: the assembled report and its statistics.

use crate::error::RowSkip;
use serde::{Deserialize, Serialize};

/// An assembled report table, ready for a writer.
///
/// Every row has exactly `headers.len()` cells; the transform stages
/// guarantee this, so the writers never have to pad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Output column names, in the strict order the upload target expects.
    pub headers: Vec<String>,
    /// Data rows, aligned to `headers`.
    pub rows: Vec<Vec<String>>,
}

impl Report {
    /// Index of a header by exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Statistics for a completed conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Data rows read from the input CSV.
    pub rows_read: usize,
    /// Rows dropped during validation.
    pub rows_dropped: usize,
    /// Rows in the final report.
    pub rows_written: usize,
    /// Wall-clock time spent reading and decoding the input.
    pub read_duration_ms: u64,
    /// Total wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

/// The result of a full in-memory conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled report table.
    pub report: Report,
    /// Run statistics.
    pub stats: ConversionStats,
    /// Non-fatal row drops, in input order.
    pub skipped: Vec<RowSkip>,
}

/// Per-mode column resolution, as reported by [`crate::convert::inspect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeResolution {
    /// Canonical columns the mode resolved in the file, with the actual
    /// header each one bound to.
    pub resolved: Vec<(String, String)>,
    /// Canonical columns the mode could not find.
    pub unresolved: Vec<String>,
    /// Whether the mode can run against this file. Applens needs every
    /// column; MSM treats them all as optional.
    pub ready: bool,
}

/// Header/row summary of a source CSV, produced without converting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Headers exactly as they appear in the file.
    pub headers: Vec<String>,
    /// Number of data rows.
    pub rows: usize,
    /// Column resolution for the Applens mapping.
    pub applens: ModeResolution,
    /// Column resolution for the MSM mapping.
    pub msm: ModeResolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_column_lookup() {
        let report = Report {
            headers: vec!["Ticket ID".into(), "Status".into()],
            rows: vec![vec!["CSI-1".into(), "Done".into()]],
        };
        assert_eq!(report.column("Status"), Some(1));
        assert_eq!(report.column("status"), None);
    }

    #[test]
    fn output_serialises_to_json() {
        let out = ConversionOutput {
            report: Report {
                headers: vec!["Ticket ID".into()],
                rows: vec![],
            },
            stats: ConversionStats {
                rows_read: 0,
                rows_dropped: 0,
                rows_written: 0,
                read_duration_ms: 1,
                total_duration_ms: 2,
            },
            skipped: vec![],
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("rows_written"));
    }
}
