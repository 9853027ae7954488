//! Excel report renderer
//!
//! Generates XLSX workbooks for:
//! - Monthly attendance: one sheet, one row per employee, one column per day
//! - Daily-work summary: one row per date, percentage cells coloured by
//!   performance band, plus a Validation sheet when rows have findings
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Attendance
//! |            Monthly Attendance Report - March 2025 (merged)            |
//! | Generated on: 2025-03-31 18:00                                        |
//! | Total Employees: 2                                                    |
//! | Sl | Name  | 1 Sat | 2 Sun | 3 Mon | ... | 31 Mon | Sick | Casual |
//! | 1  | Ada   |   #   |   #   |   √   | ... |   ▼    |  1   |   0    |
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tallyroll_core::{
    daily_work_filename, performance_band, AttendanceReport, ColumnKind, DailyWorkReport, ExportError,
    ExportFormat, Exporter, MetricKind, ReportPeriod, WorkCategory,
};

/// Row of the header in the attendance sheet (0-based)
const ATTENDANCE_HEADER_ROW: u32 = 3;

/// Row of the header in the daily-work sheet (0-based)
const DAILY_HEADER_ROW: u32 = 3;

/// A4 in Excel's paper size table
const PAPER_A4: u8 = 9;

fn xlsx_error(e: XlsxError) -> ExportError {
    ExportError::generation(ExportFormat::Xlsx, e)
}

/// One body cell of the attendance sheet
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Number(f64),
    Text(String),
    Status { symbol: &'static str, weekend: bool },
}

/// Banner, header and body of the attendance sheet
#[derive(Debug)]
struct AttendanceLayout {
    title: String,
    /// Lines under the title, one row each
    meta: Vec<String>,
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Excel renderer configuration
#[derive(Clone, Debug)]
pub struct ExcelExporter {
    /// Attendance sheet name
    pub sheet_name: String,
    /// Header background
    pub header_color: u32,
    /// Background for weekend day columns
    pub weekend_color: u32,
    /// Timestamp format for the "Generated on" row
    pub timestamp_format: String,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self {
            sheet_name: "Attendance".into(),
            header_color: 0x4472C4,
            weekend_color: 0xF2F2F2,
            timestamp_format: "%Y-%m-%d %H:%M".into(),
        }
    }
}

struct ExcelFormats {
    title: Format,
    meta: Format,
    header: Format,
    text: Format,
    integer: Format,
    status: Format,
    weekend_status: Format,
    total_row: Format,
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attendance sheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the timestamp format (chrono `strftime` syntax)
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    fn create_formats(&self) -> ExcelFormats {
        let title = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let meta = Format::new().set_italic().set_font_color(0x595959);

        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_background_color(self.header_color)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        let integer = Format::new()
            .set_num_format("0")
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        let status = Format::new()
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        let weekend_status = Format::new()
            .set_align(FormatAlign::Center)
            .set_background_color(self.weekend_color)
            .set_border(FormatBorder::Thin);

        let total_row = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        ExcelFormats {
            title,
            meta,
            header,
            text,
            integer,
            status,
            weekend_status,
            total_row,
        }
    }

    /// Merged title row plus the metadata lines under it
    fn write_banner(
        &self,
        sheet: &mut Worksheet,
        formats: &ExcelFormats,
        title: &str,
        last_col: u16,
        lines: &[String],
    ) -> Result<(), ExportError> {
        sheet
            .merge_range(0, 0, 0, last_col, title, &formats.title)
            .map_err(xlsx_error)?;
        sheet.set_row_height(0, 28).map_err(xlsx_error)?;

        for (offset, line) in lines.iter().enumerate() {
            sheet
                .write_with_format(1 + offset as u32, 0, line.as_str(), &formats.meta)
                .map_err(xlsx_error)?;
        }
        Ok(())
    }

    /// Text and values of every attendance cell, before formatting
    fn attendance_layout(&self, report: &AttendanceReport) -> AttendanceLayout {
        let mut title = format!("{} - {}", report.title, report.period.label());
        if let Some(org) = &report.organization {
            title = format!("{org}: {title}");
        }
        let meta = vec![
            format!(
                "Generated on: {}",
                report.generated_at.format(&self.timestamp_format)
            ),
            format!("Total Employees: {}", report.rows.len()),
        ];

        // Day columns show the day number over the weekday
        let header = report
            .columns
            .iter()
            .map(|column| match &column.sublabel {
                Some(sub) => format!("{}\n{}", column.label, sub),
                None => column.label.clone(),
            })
            .collect();

        let rows = report
            .rows
            .iter()
            .map(|row| {
                let mut days = row.statuses.iter();
                let mut leaves = row.leave_totals.iter();
                report
                    .columns
                    .iter()
                    .map(|column| match column.kind {
                        ColumnKind::Serial => Cell::Number(row.serial as f64),
                        ColumnKind::Name => Cell::Text(row.name.clone()),
                        ColumnKind::Day { weekend, .. } => Cell::Status {
                            symbol: days.next().copied().unwrap_or_default().symbol(),
                            weekend,
                        },
                        ColumnKind::Leave => Cell::Number(f64::from(leaves.next().copied().unwrap_or(0))),
                    })
                    .collect()
            })
            .collect();

        AttendanceLayout {
            title,
            meta,
            header,
            rows,
        }
    }

    fn render_attendance(&self, report: &AttendanceReport) -> Result<Vec<u8>, ExportError> {
        if report.is_empty() {
            return Err(ExportError::EmptyInput(format!(
                "no attendance rows for {}",
                report.period.label()
            )));
        }

        let mut workbook = Workbook::new();
        let formats = self.create_formats();
        let last_col = (report.columns.len() - 1) as u16;
        let layout = self.attendance_layout(report);

        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name).map_err(xlsx_error)?;
        sheet.set_landscape();
        sheet.set_paper_size(PAPER_A4);

        self.write_banner(sheet, &formats, &layout.title, last_col, &layout.meta)?;

        for (col, (label, column)) in layout.header.iter().zip(&report.columns).enumerate() {
            sheet
                .write_with_format(ATTENDANCE_HEADER_ROW, col as u16, label.as_str(), &formats.header)
                .map_err(xlsx_error)?;
            sheet
                .set_column_width(col as u16, column.width)
                .map_err(xlsx_error)?;
        }
        sheet
            .set_row_height(ATTENDANCE_HEADER_ROW, 30)
            .map_err(xlsx_error)?;

        for (index, cells) in layout.rows.iter().enumerate() {
            let excel_row = ATTENDANCE_HEADER_ROW + 1 + index as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Number(value) => sheet.write_with_format(excel_row, col, *value, &formats.integer),
                    Cell::Text(text) => sheet.write_with_format(excel_row, col, text.as_str(), &formats.text),
                    Cell::Status { symbol, weekend } => {
                        let format = if *weekend {
                            &formats.weekend_status
                        } else {
                            &formats.status
                        };
                        sheet.write_with_format(excel_row, col, *symbol, format)
                    }
                }
                .map_err(xlsx_error)?;
            }
        }

        sheet
            .set_freeze_panes(ATTENDANCE_HEADER_ROW + 1, 2)
            .map_err(xlsx_error)?;

        workbook.save_to_buffer().map_err(xlsx_error)
    }

    /// Render a daily-work summary workbook
    pub fn render_daily_summary(&self, report: &DailyWorkReport) -> Result<Vec<u8>, ExportError> {
        if report.is_empty() {
            return Err(ExportError::EmptyInput(format!(
                "no daily-work records for {}",
                report.period.label()
            )));
        }

        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let mut headers = vec!["Date", "Total", "Completed", "Pending", "Resubmissions"];
        headers.extend(WorkCategory::ALL.iter().map(|c| c.as_str()));
        headers.extend(["RFI Submissions", "Completion %", "RFI %"]);
        let last_col = (headers.len() - 1) as u16;

        let sheet = workbook.add_worksheet();
        sheet.set_name("Daily Work Summary").map_err(xlsx_error)?;
        sheet.set_landscape();
        sheet.set_paper_size(PAPER_A4);

        let title = format!("Daily Work Summary - {}", report.period.label());
        let mut lines = vec![format!(
            "Generated on: {}",
            report.generated_at.format(&self.timestamp_format)
        )];
        lines.push(format!(
            "Trend: {} | Unassigned records: {}",
            report.trend, report.unassigned
        ));
        self.write_banner(sheet, &formats, &title, last_col, &lines)?;

        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(DAILY_HEADER_ROW, col as u16, *header, &formats.header)
                .map_err(xlsx_error)?;
            let width = if col == 0 { 12 } else { 14 };
            sheet.set_column_width(col as u16, width).map_err(xlsx_error)?;
        }

        let pct_col = last_col - 1;
        for (index, row) in report.rows.iter().enumerate() {
            let r = DAILY_HEADER_ROW + 1 + index as u32;
            let mut counts = vec![row.total, row.completed, row.pending(), row.resubmissions];
            counts.extend(WorkCategory::ALL.iter().map(|c| row.categories.get(*c)));
            counts.push(row.rfi_submissions);

            sheet
                .write_with_format(r, 0, row.date.format("%Y-%m-%d").to_string(), &formats.text)
                .map_err(xlsx_error)?;
            for (offset, count) in counts.iter().enumerate() {
                sheet
                    .write_with_format(r, 1 + offset as u16, f64::from(*count), &formats.integer)
                    .map_err(xlsx_error)?;
            }
            write_percentage(sheet, r, pct_col, row.completion_percentage(), MetricKind::Completion)?;
            write_percentage(sheet, r, pct_col + 1, row.rfi_submission_percentage(), MetricKind::Submission)?;
        }

        // Totals row
        let totals = &report.totals;
        let r = DAILY_HEADER_ROW + 1 + report.rows.len() as u32;
        let mut counts = vec![totals.total, totals.completed, totals.pending, totals.resubmissions];
        counts.extend(WorkCategory::ALL.iter().map(|c| totals.categories.get(*c)));
        counts.push(totals.rfi_submissions);

        sheet
            .write_with_format(r, 0, "TOTAL", &formats.total_row)
            .map_err(xlsx_error)?;
        for (offset, count) in counts.iter().enumerate() {
            sheet
                .write_with_format(r, 1 + offset as u16, f64::from(*count), &formats.total_row)
                .map_err(xlsx_error)?;
        }
        write_percentage(sheet, r, pct_col, totals.completion_percentage, MetricKind::Completion)?;
        write_percentage(sheet, r, pct_col + 1, totals.submission_percentage, MetricKind::Submission)?;

        sheet
            .set_freeze_panes(DAILY_HEADER_ROW + 1, 1)
            .map_err(xlsx_error)?;

        if !report.issues.is_empty() {
            self.add_validation_sheet(&mut workbook, report, &formats)?;
        }

        workbook.save_to_buffer().map_err(xlsx_error)
    }

    fn add_validation_sheet(
        &self,
        workbook: &mut Workbook,
        report: &DailyWorkReport,
        formats: &ExcelFormats,
    ) -> Result<(), ExportError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Validation").map_err(xlsx_error)?;

        for (col, header) in ["Row", "Date", "Message"].iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(xlsx_error)?;
        }
        sheet.set_column_width(0, 6).map_err(xlsx_error)?;
        sheet.set_column_width(1, 12).map_err(xlsx_error)?;
        sheet.set_column_width(2, 60).map_err(xlsx_error)?;

        for (index, issue) in report.issues.iter().enumerate() {
            let r = 1 + index as u32;
            sheet
                .write_with_format(r, 0, (issue.row + 1) as f64, &formats.integer)
                .map_err(xlsx_error)?;
            sheet
                .write_with_format(r, 1, issue.date.format("%Y-%m-%d").to_string(), &formats.text)
                .map_err(xlsx_error)?;
            sheet
                .write_with_format(r, 2, issue.message.as_str(), &formats.text)
                .map_err(xlsx_error)?;
        }

        sheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;
        Ok(())
    }

    /// File name of a daily-work summary workbook
    pub fn daily_summary_filename(&self, period: &ReportPeriod) -> String {
        daily_work_filename(period, ExportFormat::Xlsx)
    }
}

/// Percentage cell filled with its band colour
fn write_percentage(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    pct: Decimal,
    kind: MetricKind,
) -> Result<(), ExportError> {
    let band = performance_band(pct, kind);
    let format = Format::new()
        .set_num_format("0.0")
        .set_align(FormatAlign::Center)
        .set_background_color(band.fill())
        .set_border(FormatBorder::Thin);
    sheet
        .write_with_format(row, col, pct.to_f64().unwrap_or(0.0), &format)
        .map_err(xlsx_error)?;
    Ok(())
}

impl Exporter for ExcelExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn render(&self, report: &AttendanceReport) -> Result<Vec<u8>, ExportError> {
        self.render_attendance(report)
    }
}
