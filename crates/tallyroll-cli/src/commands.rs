//! Subcommand implementations

use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tallyroll_aggregate::{AttendanceReportBuilder, DailyWorkAggregator};
use tallyroll_core::{ColumnSchema, Exporter, LeaveType, ReportPeriod};
use tallyroll_ingest::{read_attendance, read_work_logs, StatusPolicy};
use tallyroll_render::{export_daily_summary, export_with, ExcelExporter, PdfExporter, TextRenderer};

use crate::config::Config;
use crate::notify::{ExitCode, TerminalNotifier};

/// Output of the `attendance` command
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AttendanceFormat {
    Xlsx,
    Pdf,
    /// Both Excel and PDF
    All,
    /// Symbol grid on stdout
    Text,
}

/// Output of the `daily-work` command
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DailyFormat {
    Text,
    Json,
    Xlsx,
}

/// Options shared by the commands that write files
pub struct Output {
    pub dir: PathBuf,
    pub quiet: bool,
}

fn period(year: i32, month: u32) -> Result<ReportPeriod> {
    ReportPeriod::new(year, month).context("invalid reporting period")
}

pub fn attendance(
    config: &Config,
    input: &Path,
    year: i32,
    month: u32,
    format: AttendanceFormat,
    strict: bool,
    output: &Output,
) -> Result<ExitCode> {
    let period = period(year, month)?;
    let policy = if config.strict(strict) {
        StatusPolicy::Reject
    } else {
        StatusPolicy::DefaultAbsent
    };

    let ingested = read_attendance(input, period, policy)
        .with_context(|| format!("failed to load attendance from {}", input.display()))?;
    if !ingested.warnings.is_empty() {
        tracing::warn!(count = ingested.warnings.len(), "attendance input had skipped or defaulted cells");
    }

    let mut builder = AttendanceReportBuilder::new().weekend(&config.weekend()?);
    if let Some(title) = &config.report.title {
        builder = builder.title(title.clone());
    }
    if let Some(org) = &config.report.organization {
        builder = builder.organization(org.clone());
    }
    let report = builder.build(&ingested.value);

    let exporters: Vec<Box<dyn Exporter>> = match format {
        AttendanceFormat::Text => {
            print!("{}", TextRenderer.render_attendance(&report));
            return Ok(ExitCode::Success);
        }
        AttendanceFormat::Xlsx => vec![Box::new(ExcelExporter::new())],
        AttendanceFormat::Pdf => vec![Box::new(PdfExporter::new())],
        AttendanceFormat::All => vec![Box::new(ExcelExporter::new()), Box::new(PdfExporter::new())],
    };

    let mut notifier = TerminalNotifier::new(std::io::stderr(), output.quiet);
    for exporter in &exporters {
        let outcome = export_with(exporter.as_ref(), &report, &output.dir, &mut notifier);
        if let Some(filename) = outcome.filename {
            println!("{}", output.dir.join(filename).display());
        }
    }

    Ok(ExitCode::from_failure_count(notifier.failures()))
}

pub fn daily_work(
    input: &Path,
    year: i32,
    month: u32,
    format: DailyFormat,
    output: &Output,
) -> Result<ExitCode> {
    let period = period(year, month)?;
    let batch = read_work_logs(input)
        .with_context(|| format!("failed to load work logs from {}", input.display()))?;

    let report = DailyWorkAggregator::new(period).report(
        &batch.records,
        batch.unassigned.len(),
        Local::now().naive_local(),
    );

    match format {
        DailyFormat::Text => {
            print!("{}", TextRenderer.render_daily(&report));
            Ok(ExitCode::Success)
        }
        DailyFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{json}");
            Ok(ExitCode::Success)
        }
        DailyFormat::Xlsx => {
            let mut notifier = TerminalNotifier::new(std::io::stderr(), output.quiet);
            let outcome = export_daily_summary(&ExcelExporter::new(), &report, &output.dir, &mut notifier);
            if let Some(filename) = outcome.filename {
                println!("{}", output.dir.join(filename).display());
            }
            Ok(ExitCode::from_failure_count(notifier.failures()))
        }
    }
}

pub fn schema(config: &Config, year: i32, month: u32, leave_types: &[String], json: bool) -> Result<ExitCode> {
    let period = period(year, month)?;
    let leave_types: Vec<LeaveType> = leave_types.iter().map(LeaveType::new).collect();
    let schema = ColumnSchema::builder(period)
        .weekend(&config.weekend()?)
        .leave_types(&leave_types)
        .build();

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(ExitCode::Success);
    }

    for column in schema.columns() {
        let weekend = if column.is_weekend() { " weekend" } else { "" };
        println!(
            "{:<16} {:<12} {:<4} {:>5.1}{}",
            column.key,
            column.label,
            column.sublabel.as_deref().unwrap_or(""),
            column.width,
            weekend
        );
    }
    Ok(ExitCode::Success)
}
