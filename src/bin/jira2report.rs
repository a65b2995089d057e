//! CLI binary for jira2report.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` / `JiraSettings` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use jira2report::jira::{fetch_to_csv, DateRange, JiraSettings};
use jira2report::{
    convert, convert_to_file, inspect, ConversionConfig, ConversionMode,
    ConversionProgressCallback, ConversionStats, Phase, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one tick per pipeline phase, mirroring the
/// stepped progress bar of the old desktop tool.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_phases: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos}/{len}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_phases as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
    }

    fn on_phase_start(&self, phase: Phase) {
        self.bar.set_message(phase.label());
    }

    fn on_phase_complete(&self, _phase: Phase) {
        self.bar.inc(1);
    }

    fn on_rows_dropped(&self, count: usize) {
        self.bar.println(format!(
            "  {} dropped {count} row(s) with missing ticket ids",
            yellow("⚠"),
        ));
    }

    fn on_conversion_complete(&self, _stats: &ConversionStats) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Applens conversion with the default output name
  jira2report convert jira_dump.csv

  # MSM conversion for a specific reporting month
  jira2report convert jira_dump.csv --mode msm --month December

  # Write CSV instead of a workbook
  jira2report convert jira_dump.csv -o upload.csv

  # Fetch December's worklog issues into a dump, then convert it
  jira2report fetch --from 2025-12-01 --to 2025-12-31 -o jira_dump.csv
  jira2report convert jira_dump.csv --mode msm

  # Will this dump convert? (no credentials needed)
  jira2report inspect jira_dump.csv

  # Structured output for scripting
  jira2report convert jira_dump.csv --json > report.json

ENVIRONMENT VARIABLES:
  JIRA_URL              Jira site URL, e.g. https://acme.atlassian.net
  JIRA_EMAIL            Account email for basic auth
  JIRA_API_TOKEN        API token paired with the email
  JIRA_WORKLOG_AUTHORS  Comma-separated authors for the worklog JQL clause
  JIRA_PLATFORM_FIELD   Platform custom field id (default customfield_12345)

  `fetch` loads a .env file from the working directory (or --env-file)
  before reading these.

SETUP:
  1. Create an API token: https://id.atlassian.com/manage-profile/security/api-tokens
  2. Put the four JIRA_* keys in a .env file
  3. Fetch and convert:   jira2report fetch --from ... --to ... && jira2report convert jira_dump.csv
"#;

/// Convert Jira CSV dumps into Applens and MSM upload reports.
#[derive(Parser, Debug)]
#[command(
    name = "jira2report",
    version,
    about = "Convert Jira CSV dumps into Applens and MSM upload reports",
    long_about = "Convert Jira CSV dumps into the Applens upload format (standard Ticket \
ID/Status uploads) or the MSM format (detailed monthly tower reporting), and fetch \
worklog-bearing issues straight from Jira Cloud into a dump CSV.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "JIRA2REPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "JIRA2REPORT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Jira CSV dump into an upload report.
    Convert {
        /// Path to the Jira dump (.csv).
        input: PathBuf,

        /// Output file (.xlsx or .csv). Defaults to the mode's standard
        /// upload name next to the current directory.
        #[arg(short, long, env = "JIRA2REPORT_OUTPUT")]
        output: Option<PathBuf>,

        /// Report format to produce.
        #[arg(long, value_enum, default_value = "applens", env = "JIRA2REPORT_MODE")]
        mode: ModeArg,

        /// Reporting month name for the MSM `Month` column
        /// (default: current month).
        #[arg(long, env = "JIRA2REPORT_MONTH")]
        month: Option<String>,

        /// Value for the `Application` column.
        #[arg(long, env = "JIRA2REPORT_APPLICATION")]
        application: Option<String>,

        /// Value for the Applens `Assignment Group` column.
        #[arg(long, env = "JIRA2REPORT_ASSIGNMENT_GROUP")]
        assignment_group: Option<String>,

        /// Print the full conversion result as JSON to stdout instead of
        /// writing a report file.
        #[arg(long)]
        json: bool,

        /// Disable the progress bar.
        #[arg(long, env = "JIRA2REPORT_NO_PROGRESS")]
        no_progress: bool,

        /// Audit log file (default: applens_conversion.log or
        /// msm_conversion.log, by mode).
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Do not write an audit log file.
        #[arg(long, conflicts_with = "log_file")]
        no_log_file: bool,
    },

    /// Fetch worklog-bearing issues from Jira into a dump CSV.
    Fetch {
        /// Window start, inclusive (YYYY-MM-DD).
        #[arg(long)]
        from: String,

        /// Window end, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: String,

        /// Dump file to write.
        #[arg(short, long, default_value = "jira_dump.csv")]
        output: PathBuf,

        /// Load credentials from this .env file instead of ./.env.
        #[arg(long)]
        env_file: Option<PathBuf>,

        /// Audit log file (default: jira_fetch.log).
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Do not write an audit log file.
        #[arg(long, conflicts_with = "log_file")]
        no_log_file: bool,
    },

    /// Summarise a dump: headers, row count, per-mode column resolution.
    Inspect {
        /// Path to the Jira dump (.csv).
        input: PathBuf,

        /// Output the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Applens,
    Msm,
}

impl From<ModeArg> for ConversionMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Applens => ConversionMode::Applens,
            ModeArg::Msm => ConversionMode::Msm,
        }
    }
}

/// Stderr filter + optional audit-log file layer.
///
/// When the progress bar is active, stderr drops to errors only — the bar
/// provides all the feedback that matters. The audit file always captures
/// the full phase log, like the desktop tool's downloadable log did.
fn init_logging(verbose: bool, quiet: bool, show_progress: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_level = if verbose {
        "debug"
    } else if quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(stderr_level));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(stderr_filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_filter(level),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            input,
            output,
            mode,
            month,
            application,
            assignment_group,
            json,
            no_progress,
            log_file,
            no_log_file,
        } => {
            let mode: ConversionMode = mode.into();
            let show_progress = !cli.quiet && !no_progress && !json;
            let log_path = resolve_log_path(no_log_file, log_file, mode.default_log_name());
            init_logging(cli.verbose, cli.quiet, show_progress, log_path.as_deref())?;

            let mut builder = ConversionConfig::builder().mode(mode);
            if let Some(month) = month {
                builder = builder.month(month);
            }
            if let Some(app) = application {
                builder = builder.application(app);
            }
            if let Some(group) = assignment_group {
                builder = builder.assignment_group(group);
            }
            if show_progress {
                let cb = CliProgressCallback::new();
                builder = builder.progress_callback(cb as ProgressCallback);
            }
            let config = builder.build().context("Invalid configuration")?;

            if json {
                let output = convert(&input, &config).await.context("Conversion failed")?;
                let rendered = serde_json::to_string_pretty(&output)
                    .context("Failed to serialise output")?;
                println!("{rendered}");
                return Ok(());
            }

            let output_path =
                output.unwrap_or_else(|| PathBuf::from(mode.default_output_name()));
            let stats = convert_to_file(&input, &output_path, &config)
                .await
                .context("Conversion failed")?;

            if !cli.quiet {
                eprintln!(
                    "{}  {}/{} rows  {}ms  →  {}",
                    if stats.rows_dropped == 0 {
                        green("✔")
                    } else {
                        yellow("⚠")
                    },
                    stats.rows_written,
                    stats.rows_read,
                    stats.total_duration_ms,
                    bold(&output_path.display().to_string()),
                );
                if stats.rows_dropped > 0 {
                    eprintln!(
                        "   {}",
                        dim(&format!(
                            "{} row(s) dropped for missing ticket ids",
                            stats.rows_dropped
                        ))
                    );
                }
            }
        }

        Command::Fetch {
            from,
            to,
            output,
            env_file,
            log_file,
            no_log_file,
        } => {
            let log_path = resolve_log_path(no_log_file, log_file, "jira_fetch.log");
            init_logging(cli.verbose, cli.quiet, false, log_path.as_deref())?;

            // Load the .env file before reading credentials; a missing
            // default file is fine, a named one must exist.
            match &env_file {
                Some(path) => {
                    dotenvy::from_path(path)
                        .with_context(|| format!("Failed to load env file {}", path.display()))?;
                }
                None => {
                    let _ = dotenvy::dotenv();
                }
            }

            let settings = JiraSettings::from_env()?;
            let range = DateRange::parse(&from, &to)?;
            let stats = fetch_to_csv(&settings, &range, &output)
                .await
                .context("Jira fetch failed")?;

            if !cli.quiet {
                if stats.written {
                    eprintln!(
                        "{}  {} issues  →  {}",
                        green("✔"),
                        bold(&stats.issues.to_string()),
                        bold(&output.display().to_string()),
                    );
                } else {
                    eprintln!(
                        "{}  no tickets matched {}..{} — nothing written",
                        yellow("⚠"),
                        range.start(),
                        range.end(),
                    );
                }
            }
        }

        Command::Inspect { input, json } => {
            init_logging(cli.verbose, true, false, None)?;
            let summary = inspect(&input).await.context("Failed to inspect dump")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
                );
            } else {
                println!("File:     {}", input.display());
                println!("Rows:     {}", summary.rows);
                println!("Columns:  {}", summary.headers.join(", "));
                println!();
                print_resolution("Applens", summary.applens.ready, &summary.applens.resolved, &summary.applens.unresolved);
                print_resolution("MSM", summary.msm.ready, &summary.msm.resolved, &summary.msm.unresolved);
            }
        }
    }

    Ok(())
}

fn resolve_log_path(
    no_log_file: bool,
    explicit: Option<PathBuf>,
    default_name: &str,
) -> Option<PathBuf> {
    if no_log_file {
        None
    } else {
        Some(explicit.unwrap_or_else(|| PathBuf::from(default_name)))
    }
}

fn print_resolution(name: &str, ready: bool, resolved: &[(String, String)], unresolved: &[String]) {
    let marker = if ready { green("✔") } else { red("✘") };
    println!("{marker} {name}");
    for (canonical, actual) in resolved {
        if canonical == actual {
            println!("    {canonical}");
        } else {
            println!("    {canonical}  {}", dim(&format!("<- {actual}")));
        }
    }
    for canonical in unresolved {
        println!("    {}", dim(&format!("{canonical}  (not found)")));
    }
    println!();
}
