//! Configuration types for Jira-dump-to-report conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across threads, serialise them
//! for logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The constant cells (`Application`, `Assignment Group`) and the MSM
//! reporting month all have sensible defaults that almost every caller
//! keeps. The builder lets callers set only what they care about.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two named report formats a Jira dump can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Standard Ticket ID / Status upload (8 columns). (default)
    #[default]
    Applens,
    /// Detailed monthly tower reporting (28 columns, styled header).
    Msm,
}

impl ConversionMode {
    /// The output file name the desktop tool suggested for this mode.
    pub fn default_output_name(&self) -> &'static str {
        match self {
            ConversionMode::Applens => "Applens_Upload_Output.xlsx",
            ConversionMode::Msm => "MSM_Upload_Output.xlsx",
        }
    }

    /// The audit log file name historically used for this mode.
    pub fn default_log_name(&self) -> &'static str {
        match self {
            ConversionMode::Applens => "applens_conversion.log",
            ConversionMode::Msm => "msm_conversion.log",
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionMode::Applens => write!(f, "applens"),
            ConversionMode::Msm => write!(f, "msm"),
        }
    }
}

/// Configuration for a single conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use jira2report::{ConversionConfig, ConversionMode};
///
/// let config = ConversionConfig::builder()
///     .mode(ConversionMode::Msm)
///     .month("December")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Which report format to produce. Default: [`ConversionMode::Applens`].
    pub mode: ConversionMode,

    /// Reporting month name written into the MSM `Month` column.
    ///
    /// `None` means "the current month at run time". Tests and re-runs of
    /// historical dumps pass an explicit name so output is reproducible.
    pub month: Option<String>,

    /// Constant for the `Application` column in both modes. Default: `HMOF`.
    pub application: String,

    /// Constant for the Applens `Assignment Group` column.
    /// Default: `HMH Support Group`.
    pub assignment_group: String,

    /// Optional progress callback fired at phase boundaries.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("mode", &self.mode)
            .field("month", &self.month)
            .field("application", &self.application)
            .field("assignment_group", &self.assignment_group)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            mode: ConversionMode::default(),
            month: None,
            application: "HMOF".to_string(),
            assignment_group: "HMH Support Group".to_string(),
            progress_callback: None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn mode(mut self, mode: ConversionMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn month(mut self, month: impl Into<String>) -> Self {
        self.config.month = Some(month.into());
        self
    }

    pub fn application(mut self, app: impl Into<String>) -> Self {
        self.config.application = app.into();
        self
    }

    pub fn assignment_group(mut self, group: impl Into<String>) -> Self {
        self.config.assignment_group = group.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.application.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "Application constant must not be empty".into(),
            ));
        }
        if matches!(&c.month, Some(m) if m.trim().is_empty()) {
            return Err(ConvertError::InvalidConfig(
                "Month, when given, must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
