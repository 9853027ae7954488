//! # tallyroll-render
//!
//! Export backends for tallyroll reports.
//!
//! This crate provides:
//! - Excel workbooks for the monthly attendance grid and the daily-work summary
//! - PDF attendance reports (A4 landscape, paginated)
//! - Text-based output for the console
//! - The export boundary: every failure becomes an `ExportOutcome`
//!
//! ## Example
//!
//! ```rust,ignore
//! use tallyroll_core::{Exporter, ExportOutcome};
//! use tallyroll_render::{export_to_dir, ExcelExporter, PdfExporter};
//!
//! let xlsx = export_to_dir(&ExcelExporter::new(), &report, "exports");
//! let pdf = export_to_dir(&PdfExporter::new(), &report, "exports");
//! assert!(xlsx.success && pdf.success);
//! ```

pub mod excel;
pub mod pdf;
pub mod text;

pub use excel::ExcelExporter;
pub use pdf::PdfExporter;
pub use text::TextRenderer;

use std::path::Path;
use tallyroll_core::{
    AttendanceReport, DailyWorkReport, ExportArtifact, ExportError, ExportFormat, ExportOutcome,
    Exporter, NotificationState, Notifier,
};

// ============================================================================
// Export Boundary
// ============================================================================

/// Render `report` into an in-memory artifact
pub fn export_artifact<E: Exporter + ?Sized>(
    exporter: &E,
    report: &AttendanceReport,
) -> Result<ExportArtifact, ExportError> {
    let bytes = exporter.render(report)?;
    Ok(ExportArtifact {
        filename: exporter.filename(&report.period),
        format: exporter.format(),
        bytes,
    })
}

/// Write an artifact into `dir`, creating the directory when missing
pub fn save_artifact(artifact: &ExportArtifact, dir: impl AsRef<Path>) -> Result<(), ExportError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(&artifact.filename), &artifact.bytes)?;
    tracing::info!(
        file = %artifact.filename,
        bytes = artifact.bytes.len(),
        "saved {} export",
        artifact.format
    );
    Ok(())
}

/// Render and save; failures are logged and returned as a failed outcome
pub fn export_to_dir<E: Exporter + ?Sized>(
    exporter: &E,
    report: &AttendanceReport,
    dir: impl AsRef<Path>,
) -> ExportOutcome {
    export_with(exporter, report, dir, &mut Silent)
}

/// Like `export_to_dir`, reporting progress to `notifier`
pub fn export_with<E: Exporter + ?Sized>(
    exporter: &E,
    report: &AttendanceReport,
    dir: impl AsRef<Path>,
    notifier: &mut dyn Notifier,
) -> ExportOutcome {
    let format = exporter.format();
    notifier.notify(
        NotificationState::Pending,
        &format!("Generating {format} report..."),
    );

    let result = export_artifact(exporter, report).and_then(|artifact| {
        save_artifact(&artifact, &dir)?;
        Ok(artifact.filename)
    });
    conclude(format, result, notifier)
}

/// Render and save the daily-work summary workbook
pub fn export_daily_summary(
    exporter: &ExcelExporter,
    report: &DailyWorkReport,
    dir: impl AsRef<Path>,
    notifier: &mut dyn Notifier,
) -> ExportOutcome {
    let format = ExportFormat::Xlsx;
    notifier.notify(
        NotificationState::Pending,
        "Generating daily work summary...",
    );

    let result = exporter.render_daily_summary(report).and_then(|bytes| {
        let artifact = ExportArtifact {
            filename: exporter.daily_summary_filename(&report.period),
            format,
            bytes,
        };
        save_artifact(&artifact, &dir)?;
        Ok(artifact.filename)
    });
    conclude(format, result, notifier)
}

fn conclude(
    format: ExportFormat,
    result: Result<String, ExportError>,
    notifier: &mut dyn Notifier,
) -> ExportOutcome {
    match result {
        Ok(filename) => {
            notifier.notify(
                NotificationState::Success,
                &format!("{format} report saved as {filename}"),
            );
            ExportOutcome::saved(filename)
        }
        Err(e) => {
            tracing::error!(%format, error = %e, "export failed");
            notifier.notify(
                NotificationState::Error,
                &format!("Failed to generate {format} report: {e}"),
            );
            ExportOutcome::failed(e.to_string())
        }
    }
}

/// Notifier that drops every notification
struct Silent;

impl Notifier for Silent {
    fn notify(&mut self, _state: NotificationState, _message: &str) {}
}

// ============================================================================
// Helpers
// ============================================================================

/// Shorten `s` to at most `max` characters, marking the cut with `..`
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 2 {
        s.chars().take(max).collect()
    } else {
        let head: String = s.chars().take(max - 2).collect();
        format!("{head}..")
    }
}
