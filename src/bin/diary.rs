//! Diary CLI - Command-line interface for the sleep diary metrics engine
//!
//! Commands:
//! - summarize: Aggregate diary records into a weekly summary
//! - compare: Compare summary files (current vs previous vs baseline)
//! - report: Build a progress report for a report date
//! - validate: Validate raw diary records

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sleep_diary_metrics::derive::fill_missing_all;
use sleep_diary_metrics::presenter::{
    completion_rate, efficiency_band, format_measure, quality_symbol_for_average,
};
use sleep_diary_metrics::schema::{DiaryRecordAdapter, RawDiaryRecord};
use sleep_diary_metrics::{
    Aggregator, Comparator, DiaryEntry, EngineConfig, Measure, MetricsError, ProgressReport,
    ValidationError, WeeklySummary, ENGINE_VERSION,
};

/// Diary - weekly sleep diary metrics and trends
#[derive(Parser)]
#[command(name = "diary")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Summarize sleep diaries and compare weeks", long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON); DIARY_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate diary records into a weekly summary
    Summarize {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Intended window length in days (defaults to the configured window)
        #[arg(long)]
        total_days: Option<u32>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Compare weekly summary files
    Compare {
        /// Current window summary
        #[arg(long)]
        current: PathBuf,

        /// Previous window summary
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Baseline window summary
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Build a progress report for the window ending on a date
    Report {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Last day of the current window (YYYY-MM-DD)
        #[arg(long)]
        as_of: NaiveDate,

        /// First day of the baseline window (overrides configuration)
        #[arg(long)]
        baseline_start: Option<NaiveDate>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Validate raw diary records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable table
    Text,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DiaryCliError> {
    let config = EngineConfig::load(cli.config.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Summarize {
            input,
            input_format,
            total_days,
            output_format,
        } => cmd_summarize(&input, input_format, total_days, output_format, &config),

        Commands::Compare {
            current,
            previous,
            baseline,
            output_format,
        } => cmd_compare(&current, previous.as_deref(), baseline.as_deref(), output_format),

        Commands::Report {
            input,
            input_format,
            as_of,
            baseline_start,
            output_format,
        } => {
            let config = EngineConfig {
                baseline_start: baseline_start.or(config.baseline_start),
                ..config
            };
            cmd_report(&input, input_format, as_of, output_format, &config)
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),
    }
}

fn cmd_summarize(
    input: &Path,
    input_format: InputFormat,
    total_days: Option<u32>,
    output_format: OutputFormat,
    config: &EngineConfig,
) -> Result<(), DiaryCliError> {
    let mut entries = load_entries(input, &input_format)?;
    if config.derive_missing {
        entries = fill_missing_all(entries);
    }

    let total_days = total_days.unwrap_or(config.window_days);
    let summary = Aggregator::summarize(&entries, total_days);
    info!(days_logged = summary.days_logged, total_days, "summarized input");

    match output_format {
        OutputFormat::Text => print!("{}", render_summary(&summary)),
        format => println!("{}", to_json(&summary, &format)?),
    }
    Ok(())
}

fn cmd_compare(
    current: &Path,
    previous: Option<&Path>,
    baseline: Option<&Path>,
    output_format: OutputFormat,
) -> Result<(), DiaryCliError> {
    let current = load_summary(current)?;
    let previous = previous.map(load_summary).transpose()?;
    let baseline = baseline.map(load_summary).transpose()?;

    let comparison = Comparator::compare(current, previous, baseline);

    match output_format {
        OutputFormat::Text => {
            print!("{}", render_summary(&comparison.current));
            println!();
            println!("SE change vs previous: {}", render_change(comparison.se_change));
            println!("SE change vs baseline: {}", render_change(comparison.se_baseline_change));
        }
        format => println!("{}", to_json(&comparison, &format)?),
    }
    Ok(())
}

fn cmd_report(
    input: &Path,
    input_format: InputFormat,
    as_of: NaiveDate,
    output_format: OutputFormat,
    config: &EngineConfig,
) -> Result<(), DiaryCliError> {
    let entries = load_entries(input, &input_format)?;
    let report = ProgressReport::build(&entries, as_of, config)?;

    match output_format {
        OutputFormat::Text => print!("{}", render_report(&report)),
        format => println!("{}", to_json(&report, &format)?),
    }
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), DiaryCliError> {
    let input_data = read_input(input)?;
    let records: Vec<(usize, RawDiaryRecord)> = match input_format {
        InputFormat::Json => DiaryRecordAdapter::parse_records(&input_data)?
            .into_iter()
            .enumerate()
            .collect(),
        InputFormat::Ndjson => DiaryRecordAdapter::parse_ndjson_records(&input_data)?,
    };
    let total_records = records.len();
    let errors = DiaryRecordAdapter::validate_records(records);

    let report = ValidationReport {
        total_records,
        valid_records: total_records - errors.len(),
        invalid_records: errors.len(),
        errors: errors.iter().map(ValidationErrorDetail::from).collect(),
    };

    // JSON by default when piped
    if json || !atty::is(atty::Stream::Stdout) {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {}", err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(DiaryCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, DiaryCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_entries(input: &Path, input_format: &InputFormat) -> Result<Vec<DiaryEntry>, DiaryCliError> {
    let input_data = read_input(input)?;
    let entries = match input_format {
        InputFormat::Json => DiaryRecordAdapter::parse_array(&input_data)?,
        InputFormat::Ndjson => DiaryRecordAdapter::parse_ndjson(&input_data)?,
    };
    debug!(count = entries.len(), "loaded diary entries");
    Ok(entries)
}

fn load_summary(path: &Path) -> Result<WeeklySummary, DiaryCliError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn to_json<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, DiaryCliError> {
    match format {
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

fn render_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c > 0.0 => format!("+{c}%"),
        Some(c) => format!("{c}%"),
        None => "--".to_string(),
    }
}

fn render_summary(summary: &WeeklySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Days logged: {}/{} ({}%)\n",
        summary.days_logged,
        summary.total_days,
        completion_rate(summary.days_logged, summary.total_days)
    ));
    for measure in Measure::ALL {
        out.push_str(&format!(
            "  {:<24} {}\n",
            measure.label(),
            format_measure(measure, summary.average(measure))
        ));
    }
    out.push_str(&format!(
        "  {:<24} {}\n",
        "Efficiency band",
        efficiency_band(summary.avg_se).as_str()
    ));
    out.push_str(&format!(
        "  {:<24} {}\n",
        "Quality",
        quality_symbol_for_average(summary.avg_quality)
    ));
    out
}

fn render_report(report: &ProgressReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Progress Report {} to {}\n",
        report.windows.current.start,
        report.windows.current.end()
    ));
    out.push_str(&format!(
        "Completion: {}%  Efficiency: {}\n\n",
        report.completion_rate,
        report.efficiency_band.as_str()
    ));
    out.push_str(&format!(
        "  {:<24} {:>10} {:>10} {:>10}  {}\n",
        "Measure", "Current", "Previous", "Baseline", "Trend"
    ));
    for row in &report.rows {
        let trend = row
            .trend_vs_previous
            .as_ref()
            .map(|t| {
                let mark = if t.favorable { "+" } else { "" };
                format!("{} {}{}", t.arrow.symbol(), t.magnitude, mark)
            })
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<24} {:>10} {:>10} {:>10}  {}\n",
            row.label, row.current, row.previous, row.baseline, trend
        ));
    }
    out.push_str(&format!(
        "\nSE change vs previous: {}\nSE change vs baseline: {}\n",
        render_change(report.comparison.se_change),
        render_change(report.comparison.se_baseline_change)
    ));
    out
}

// Error types

#[derive(Debug)]
enum DiaryCliError {
    Io(io::Error),
    Metrics(MetricsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for DiaryCliError {
    fn from(e: io::Error) -> Self {
        DiaryCliError::Io(e)
    }
}

impl From<MetricsError> for DiaryCliError {
    fn from(e: MetricsError) -> Self {
        DiaryCliError::Metrics(e)
    }
}

impl From<serde_json::Error> for DiaryCliError {
    fn from(e: serde_json::Error) -> Self {
        DiaryCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DiaryCliError> for CliError {
    fn from(e: DiaryCliError) -> Self {
        match e {
            DiaryCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            DiaryCliError::Metrics(MetricsError::Config(e)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the configuration file and DIARY_* variables".to_string()),
            },
            DiaryCliError::Metrics(e @ MetricsError::Validation(_)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'diary validate' for details".to_string()),
            },
            DiaryCliError::Metrics(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a JSON array or NDJSON of diary records".to_string()),
            },
            DiaryCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            DiaryCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

impl From<&ValidationError> for ValidationErrorDetail {
    fn from(e: &ValidationError) -> Self {
        ValidationErrorDetail {
            index: e.index(),
            error: e.to_string(),
        }
    }
}
