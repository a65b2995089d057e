//! Progress-callback trait for conversion phase events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its phases.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a GUI log pane, or a
//! database record — without the library knowing anything about how the
//! host application communicates. The trait is `Send + Sync` so the
//! conversion can run on a worker task while the UI thread observes it.

use crate::output::ConversionStats;
use std::sync::Arc;

/// The four phases every conversion passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading and decoding the input CSV.
    Read,
    /// Applying the column mapping and constants.
    Transform,
    /// Dropping invalid rows and coercing dates.
    Validate,
    /// Writing the report file.
    Write,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 4] = [Phase::Read, Phase::Transform, Phase::Validate, Phase::Write];

    /// Human-readable label used in logs and progress bars.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Read => "Reading input",
            Phase::Transform => "Applying transformations",
            Phase::Validate => "Validating data",
            Phase::Write => "Writing output",
        }
    }
}

/// Called by the conversion pipeline at phase boundaries.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first phase starts.
    fn on_conversion_start(&self, total_phases: usize) {
        let _ = total_phases;
    }

    /// Called when a phase begins.
    fn on_phase_start(&self, phase: Phase) {
        let _ = phase;
    }

    /// Called when a phase finishes.
    fn on_phase_complete(&self, phase: Phase) {
        let _ = phase;
    }

    /// Called when validation drops rows (count of rows removed).
    fn on_rows_dropped(&self, count: usize) {
        let _ = count;
    }

    /// Called once after the last phase, with the final statistics.
    fn on_conversion_complete(&self, stats: &ConversionStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
