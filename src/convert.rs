//! Conversion entry points.
//!
//! ## Why an in-memory API and a to-file API?
//!
//! [`convert`] returns the assembled [`ConversionOutput`] so callers can
//! post-process or merge reports before anything touches disk.
//! [`convert_to_file`] is the common path: convert, then write atomically.
//! [`inspect`] answers "will this dump convert?" without converting —
//! useful before queueing a large batch.

use crate::config::{ConversionConfig, ConversionMode};
use crate::error::ConvertError;
use crate::output::{ConversionOutput, ConversionStats, ModeResolution, SourceSummary};
use crate::pipeline::{applens, input, msm, write};
use crate::progress::Phase;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Convert a Jira CSV dump to a report, in memory.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(ConvertError)` only for fatal errors: missing/unreadable
/// input, unparseable CSV, or (in Applens mode) missing required columns.
/// Row-level drops are reported in `ConversionOutput`, not as errors.
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting {} conversion: {}", config.mode, input_path.display());

    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_conversion_start(Phase::ALL.len());
    }

    // ── Phase 1: Read input ──────────────────────────────────────────────
    if let Some(cb) = cb {
        cb.on_phase_start(Phase::Read);
    }
    let read_start = Instant::now();
    let table = input::load_table(input_path)?;
    let read_duration_ms = read_start.elapsed().as_millis() as u64;
    let rows_read = table.rows.len();
    if let Some(cb) = cb {
        cb.on_phase_complete(Phase::Read);
    }

    // ── Phase 2: Transform ───────────────────────────────────────────────
    if let Some(cb) = cb {
        cb.on_phase_start(Phase::Transform);
    }
    let report = match config.mode {
        ConversionMode::Applens => {
            let cols = input::resolve_applens(&table.headers)?;
            applens::apply(&table, &cols, config)
        }
        ConversionMode::Msm => {
            let cols = input::resolve_msm(&table.headers);
            msm::apply(&table, &cols, config)
        }
    };
    if let Some(cb) = cb {
        cb.on_phase_complete(Phase::Transform);
    }

    // ── Phase 3: Validate ────────────────────────────────────────────────
    if let Some(cb) = cb {
        cb.on_phase_start(Phase::Validate);
    }
    let (report, skipped) = match config.mode {
        ConversionMode::Applens => applens::validate(report),
        ConversionMode::Msm => msm::validate(report),
    };
    if let Some(cb) = cb {
        if !skipped.is_empty() {
            cb.on_rows_dropped(skipped.len());
        }
        cb.on_phase_complete(Phase::Validate);
    }

    let stats = ConversionStats {
        rows_read,
        rows_dropped: skipped.len(),
        rows_written: report.rows.len(),
        read_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {}/{} rows, {}ms total",
        stats.rows_written, stats.rows_read, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        report,
        stats,
        skipped,
    })
}

/// Convert a Jira CSV dump and write the report to `output_path`.
///
/// The writer is picked by the output extension (`.xlsx` or `.csv`) and
/// the write is atomic (temp file + rename).
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    let output = convert(input_path, config).await?;
    let path = output_path.as_ref();
    let cb = config.progress_callback.as_ref();

    // ── Phase 4: Write output ────────────────────────────────────────────
    if let Some(cb) = cb {
        cb.on_phase_start(Phase::Write);
    }
    let write_start = Instant::now();
    write::write_report(&output.report, path, config.mode)?;
    let mut stats = output.stats;
    stats.total_duration_ms += write_start.elapsed().as_millis() as u64;
    if let Some(cb) = cb {
        cb.on_phase_complete(Phase::Write);
        cb.on_conversion_complete(&stats);
    }

    Ok(stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(input_path, config))
}

/// Summarise a source dump without converting it.
///
/// Reports the raw headers, the row count, and how each conversion mode's
/// columns resolve against the file. Needs no credentials and writes
/// nothing.
pub async fn inspect(input_path: impl AsRef<Path>) -> Result<SourceSummary, ConvertError> {
    let table = input::load_table(input_path.as_ref())?;

    let applens = match input::resolve_applens(&table.headers) {
        Ok(cols) => ModeResolution {
            resolved: cols.bindings(&table.headers),
            unresolved: Vec::new(),
            ready: true,
        },
        Err(ConvertError::MissingColumns { missing, .. }) => ModeResolution {
            resolved: Vec::new(),
            unresolved: missing,
            ready: false,
        },
        Err(e) => return Err(e),
    };

    let msm_cols = input::resolve_msm(&table.headers);
    let msm = ModeResolution {
        resolved: msm_cols.bindings(&table.headers),
        unresolved: msm_cols.unresolved(),
        // Without an issue key every row would be dropped in validation.
        ready: msm_cols.issue_key.is_some(),
    };

    Ok(SourceSummary {
        headers: table.headers,
        rows: table.rows.len(),
        applens,
        msm,
    })
}
