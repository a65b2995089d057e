//! # jira2report
//!
//! Convert Jira CSV exports into Applens and MSM upload workbooks.
//!
//! ## Why this crate?
//!
//! Monthly support reporting means taking the same Jira dump and
//! reshaping it by hand into two different upload templates — renaming
//! columns, injecting constants, banding priorities, and cleaning dates.
//! Doing that in a spreadsheet is slow and error-prone; this crate makes
//! it a single deterministic run, and can pull the dump straight from
//! Jira's worklog search instead of a manual export.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Jira dump (.csv)            Jira Cloud REST
//!  │                           │
//!  │                           └─ fetch  POST /rest/api/3/search/jql,
//!  │                                     cursor pagination → dump CSV
//!  ├─ 1. Read      decode UTF-8/Latin-1, resolve columns case-insensitively
//!  ├─ 2. Transform Applens (8 cols) or MSM (28 cols) mapping + constants
//!  ├─ 3. Validate  drop keyless rows, coerce dates
//!  └─ 4. Write     .xlsx (styled MSM header) or .csv, atomic replace
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jira2report::{convert_to_file, ConversionConfig, ConversionMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .mode(ConversionMode::Msm)
//!         .month("December")
//!         .build()?;
//!     let stats = convert_to_file("jira_dump.csv", "MSM_Upload_Output.xlsx", &config).await?;
//!     eprintln!("{} rows written ({} dropped)", stats.rows_written, stats.rows_dropped);
//!     Ok(())
//! }
//! ```
//!
//! ## Fetching from Jira
//!
//! Credentials come from the environment (a `.env` file works — the CLI
//! loads it automatically): `JIRA_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`,
//! and `JIRA_WORKLOG_AUTHORS` (a comma-separated author list for the JQL
//! `worklogAuthor in (...)` clause).
//!
//! ```rust,no_run
//! use jira2report::jira::{fetch_to_csv, DateRange, JiraSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = JiraSettings::from_env()?;
//! let range = DateRange::parse("2025-12-01", "2025-12-31")?;
//! let stats = fetch_to_csv(&settings, &range, "jira_dump.csv").await?;
//! eprintln!("{} issues fetched", stats.issues);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `jira2report` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! jira2report = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod jira;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ConversionMode};
pub use convert::{convert, convert_sync, convert_to_file, inspect};
pub use error::{ConvertError, RowSkip};
pub use output::{ConversionOutput, ConversionStats, ModeResolution, Report, SourceSummary};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, Phase, ProgressCallback};
