//! WebAssembly bindings for the tallyroll report exporters
//!
//! This crate provides JavaScript-callable functions that turn attendance and
//! daily-work JSON into downloadable Excel/PDF files directly in the browser.
//! Hosts call `init()` once before anything else; calling it again is a no-op.

use chrono::{Local, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::Once;
use wasm_bindgen::prelude::*;

use tallyroll_aggregate::{AttendanceReportBuilder, DailyWorkAggregator};
use tallyroll_core::{DailyWorkReport, ExportFormat, ExportOutcome, Exporter, ReportPeriod};
use tallyroll_ingest::{parse_attendance, parse_work_logs, StatusPolicy};
use tallyroll_render::{export_artifact, ExcelExporter, PdfExporter};

static INIT: Once = Once::new();

/// One-time bootstrap (panic hook); safe to call repeatedly
#[wasm_bindgen]
pub fn init() {
    INIT.call_once(|| {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
    });
}

/// Whether `init()` has run
#[wasm_bindgen]
pub fn is_initialized() -> bool {
    INIT.is_completed()
}

// ============================================================================
// Attendance export
// ============================================================================

/// Optional report settings passed from JavaScript
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub title: Option<String>,
    pub organization: Option<String>,
    /// Weekday names, e.g. `["Fri"]`
    pub weekend: Option<Vec<String>>,
    /// Reject unknown status symbols instead of treating them as absent
    pub strict: bool,
}

/// Result of an export: `{success, filename}` or `{success, error}`, plus the file bytes
#[wasm_bindgen]
pub struct ExportResponse {
    outcome: ExportOutcome,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl ExportResponse {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.outcome.success
    }

    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> Option<String> {
        self.outcome.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.outcome.error.clone()
    }

    /// Raw file bytes, empty on failure
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// The outcome without the bytes, as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.outcome).unwrap_or_default()
    }
}

impl ExportResponse {
    fn failed(error: impl ToString) -> Self {
        Self {
            outcome: ExportOutcome::failed(error.to_string()),
            bytes: Vec::new(),
        }
    }
}

/// Export attendance JSON as an Excel workbook
#[wasm_bindgen]
pub fn export_attendance_xlsx(input: &str, year: i32, month: u32) -> ExportResponse {
    export_attendance(input, year, month, &ReportOptions::default(), &ExcelExporter::new())
}

/// Export attendance JSON as a PDF document
#[wasm_bindgen]
pub fn export_attendance_pdf(input: &str, year: i32, month: u32) -> ExportResponse {
    export_attendance(input, year, month, &ReportOptions::default(), &PdfExporter::new())
}

/// Export with settings; `format` is `"xlsx"` or `"pdf"`
#[wasm_bindgen]
pub fn export_attendance_with_options(
    input: &str,
    year: i32,
    month: u32,
    format: &str,
    options: JsValue,
) -> ExportResponse {
    let options: ReportOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    match parse_format(format) {
        Some(ExportFormat::Xlsx) => export_attendance(input, year, month, &options, &ExcelExporter::new()),
        Some(ExportFormat::Pdf) => export_attendance(input, year, month, &options, &PdfExporter::new()),
        None => ExportResponse::failed(format!("Unknown export format: {format}")),
    }
}

fn parse_format(format: &str) -> Option<ExportFormat> {
    match format.trim().to_ascii_lowercase().as_str() {
        "xlsx" | "excel" => Some(ExportFormat::Xlsx),
        "pdf" => Some(ExportFormat::Pdf),
        _ => None,
    }
}

fn export_attendance(
    input: &str,
    year: i32,
    month: u32,
    options: &ReportOptions,
    exporter: &dyn Exporter,
) -> ExportResponse {
    let period = match ReportPeriod::new(year, month) {
        Ok(period) => period,
        Err(e) => return ExportResponse::failed(e),
    };

    let policy = if options.strict {
        StatusPolicy::Reject
    } else {
        StatusPolicy::DefaultAbsent
    };
    let sheet = match parse_attendance(input, period, policy) {
        Ok(ingested) => ingested.value,
        Err(e) => return ExportResponse::failed(e),
    };

    let mut builder = AttendanceReportBuilder::new();
    if let Some(title) = &options.title {
        builder = builder.title(title.clone());
    }
    if let Some(org) = &options.organization {
        builder = builder.organization(org.clone());
    }
    if let Some(names) = &options.weekend {
        let weekend: Result<Vec<Weekday>, _> = names.iter().map(|n| n.trim().parse::<Weekday>()).collect();
        match weekend {
            Ok(days) => builder = builder.weekend(&days),
            Err(_) => return ExportResponse::failed(format!("Invalid weekend days: {names:?}")),
        }
    }
    let report = builder.build(&sheet);

    match export_artifact(exporter, &report) {
        Ok(artifact) => ExportResponse {
            outcome: ExportOutcome::saved(artifact.filename),
            bytes: artifact.bytes,
        },
        Err(e) => ExportResponse::failed(e),
    }
}

/// `Monthly_Attendance_{YYYY}_{MM}.{ext}`, or `None` for a bad period or format
#[wasm_bindgen]
pub fn attendance_filename(year: i32, month: u32, format: &str) -> Option<String> {
    let period = ReportPeriod::new(year, month).ok()?;
    Some(tallyroll_core::attendance_filename(&period, parse_format(format)?))
}

// ============================================================================
// Daily work
// ============================================================================

#[derive(Serialize)]
struct DailyWorkResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<DailyWorkReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Summarize daily-work log JSON; returns `{success, report}` or `{success, error}` as JSON
#[wasm_bindgen]
pub fn summarize_daily_work(input: &str, year: i32, month: u32) -> String {
    let result = match summarize(input, year, month) {
        Ok(report) => DailyWorkResult {
            success: true,
            report: Some(report),
            error: None,
        },
        Err(error) => DailyWorkResult {
            success: false,
            report: None,
            error: Some(error),
        },
    };
    serde_json::to_string(&result).unwrap_or_default()
}

fn summarize(input: &str, year: i32, month: u32) -> Result<DailyWorkReport, String> {
    let period = ReportPeriod::new(year, month).map_err(|e| e.to_string())?;
    let batch = parse_work_logs(input).map_err(|e| e.to_string())?;
    Ok(DailyWorkAggregator::new(period).report(
        &batch.records,
        batch.unassigned.len(),
        Local::now().naive_local(),
    ))
}
