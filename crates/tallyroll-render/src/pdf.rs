//! PDF report renderer
//!
//! Draws the monthly attendance grid on A4 landscape pages with the
//! built-in Helvetica faces. The grid header is repeated on every page and
//! each page carries a "Page i of n" footer.
//!
//! Built-in PDF fonts only cover Latin-1, so day cells use the status
//! letters (P/A/H/L) instead of the spreadsheet symbols.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use std::ops::Range;
use tallyroll_core::{
    AttendanceReport, AttendanceStatus, ColumnDescriptor, ColumnKind, ExportError, ExportFormat,
    Exporter,
};

use crate::truncate;

/// Points to millimetres
const PT_TO_MM: f32 = 0.3528;

/// Room reserved above the grid on the first page for title and metadata
const BANNER_HEIGHT: f32 = 22.0;

/// Room reserved under the grid for the page footer
const FOOTER_HEIGHT: f32 = 6.0;

const SERIAL_WIDTH: f32 = 8.0;
const DAY_WIDTH: f32 = 5.5;
const MIN_DAY_WIDTH: f32 = 3.5;
const LEAVE_WIDTH: f32 = 14.0;
const MIN_NAME_WIDTH: f32 = 25.0;
const MAX_NAME_WIDTH: f32 = 60.0;

fn pdf_error(e: impl std::fmt::Debug) -> ExportError {
    ExportError::generation(ExportFormat::Pdf, format!("{e:?}"))
}

/// Approximate rendered width of `text` in millimetres
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

/// Replace characters the built-in fonts cannot encode
fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// PDF renderer configuration (all lengths in millimetres)
#[derive(Clone, Debug)]
pub struct PdfExporter {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub row_height: f32,
    pub header_height: f32,
    /// Body font size in points
    pub font_size: f32,
    pub timestamp_format: String,
}

impl Default for PdfExporter {
    fn default() -> Self {
        // A4 landscape
        Self {
            page_width: 297.0,
            page_height: 210.0,
            margin: 10.0,
            row_height: 6.0,
            header_height: 9.0,
            font_size: 7.0,
            timestamp_format: "%Y-%m-%d %H:%M".into(),
        }
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn row_height(mut self, height: f32) -> Self {
        self.row_height = height;
        self
    }

    fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    fn first_grid_top(&self) -> f32 {
        self.page_height - self.margin - BANNER_HEIGHT
    }

    fn next_grid_top(&self) -> f32 {
        self.page_height - self.margin
    }

    fn rows_fitting(&self, grid_top: f32) -> usize {
        let body = grid_top - self.header_height - self.margin - FOOTER_HEIGHT;
        ((body / self.row_height).floor() as usize).max(1)
    }

    /// Row ranges per page
    pub fn paginate(&self, rows: usize) -> Vec<Range<usize>> {
        let mut pages = Vec::new();
        let mut start = 0;
        let mut capacity = self.rows_fitting(self.first_grid_top());
        while start < rows {
            let end = (start + capacity).min(rows);
            pages.push(start..end);
            start = end;
            capacity = self.rows_fitting(self.next_grid_top());
        }
        pages
    }

    /// Width of each column, fitted to the usable page width
    ///
    /// Day columns shrink first, down to their minimum. Past that the name
    /// and leave columns share what is left in proportion to their widths.
    pub fn column_widths(&self, columns: &[ColumnDescriptor]) -> Vec<f32> {
        let usable = self.usable_width();
        let days = columns.iter().filter(|c| c.is_day()).count() as f32;
        let leaves = columns.iter().filter(|c| c.is_leave()).count() as f32;
        let fixed = SERIAL_WIDTH + leaves * LEAVE_WIDTH;

        let name = (usable - fixed - days * DAY_WIDTH).clamp(MIN_NAME_WIDTH, MAX_NAME_WIDTH);
        let day = if days > 0.0 {
            ((usable - fixed - name) / days).clamp(MIN_DAY_WIDTH, DAY_WIDTH)
        } else {
            DAY_WIDTH
        };

        let flexible = name + leaves * LEAVE_WIDTH;
        let room = (usable - SERIAL_WIDTH - days * day).max(0.0);
        let scale = if flexible > room { room / flexible } else { 1.0 };

        columns
            .iter()
            .map(|c| match c.kind {
                ColumnKind::Serial => SERIAL_WIDTH,
                ColumnKind::Name => name * scale,
                ColumnKind::Day { .. } => day,
                ColumnKind::Leave => LEAVE_WIDTH * scale,
            })
            .collect()
    }

    fn render_pdf(&self, report: &AttendanceReport) -> Result<Vec<u8>, ExportError> {
        if report.is_empty() {
            return Err(ExportError::EmptyInput(format!(
                "no attendance rows for {}",
                report.period.label()
            )));
        }

        let title = pdf_text(&format!("{} - {}", report.title, report.period.label()));
        let (doc, first_page, first_layer) = PdfDocument::new(
            title.as_str(),
            Mm(self.page_width),
            Mm(self.page_height),
            "Layer 1",
        );
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        };

        let widths = self.column_widths(&report.columns);
        let pages = self.paginate(report.rows.len());
        let page_count = pages.len();

        for (index, rows) in pages.into_iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(self.page_width), Mm(self.page_height), "Layer 1");
                doc.get_page(page).get_layer(layer)
            };

            let top = if index == 0 {
                self.draw_banner(&layer, &fonts, report, &title);
                self.first_grid_top()
            } else {
                self.next_grid_top()
            };

            self.draw_header(&layer, &fonts, &report.columns, &widths, top);
            self.draw_rows(&layer, &fonts, report, &widths, rows.clone(), top - self.header_height);
            self.draw_grid(&layer, &widths, top, rows.len());
            self.draw_footer(&layer, &fonts, index + 1, page_count);
        }

        tracing::debug!(pages = page_count, rows = report.rows.len(), "attendance PDF laid out");
        doc.save_to_bytes().map_err(pdf_error)
    }

    fn draw_banner(&self, layer: &PdfLayerReference, fonts: &Fonts, report: &AttendanceReport, title: &str) {
        let mut y = self.page_height - self.margin - 5.0;
        let x = ((self.page_width - text_width(title, 14.0)) / 2.0).max(self.margin);
        layer.use_text(title, 14.0, Mm(x), Mm(y), &fonts.bold);

        if let Some(org) = &report.organization {
            layer.use_text(pdf_text(org), 9.0, Mm(self.margin), Mm(y), &fonts.regular);
        }

        y -= 6.0;
        let meta = format!(
            "Generated on: {}    Total Employees: {}",
            report.generated_at.format(&self.timestamp_format),
            report.rows.len()
        );
        layer.use_text(meta, 8.0, Mm(self.margin), Mm(y), &fonts.regular);

        y -= 5.0;
        let legend = AttendanceReport::legend(AttendanceStatus::letter);
        layer.use_text(legend, 8.0, Mm(self.margin), Mm(y), &fonts.regular);
    }

    fn draw_header(
        &self,
        layer: &PdfLayerReference,
        fonts: &Fonts,
        columns: &[ColumnDescriptor],
        widths: &[f32],
        top: f32,
    ) {
        let size = self.font_size - 1.0;
        let mut x = self.margin;
        for (column, width) in columns.iter().zip(widths) {
            if column.is_weekend() {
                layer.set_fill_color(rgb(0.8, 0.1, 0.1));
            }

            let label = truncate(&pdf_text(&column.label), max_chars(*width, size));
            let lx = x + (width - text_width(&label, size)).max(0.0) / 2.0;
            let label_y = if column.sublabel.is_some() { top - 3.8 } else { top - 5.5 };
            layer.use_text(label, size, Mm(lx), Mm(label_y), &fonts.bold);

            if let Some(sub) = &column.sublabel {
                // Day columns are too narrow for more than two letters
                let sub = truncate(&pdf_text(sub), 2);
                let sx = x + (width - text_width(&sub, size - 1.0)).max(0.0) / 2.0;
                layer.use_text(sub, size - 1.0, Mm(sx), Mm(top - 7.6), &fonts.regular);
            }

            if column.is_weekend() {
                layer.set_fill_color(rgb(0.0, 0.0, 0.0));
            }
            x += width;
        }
    }

    fn draw_rows(
        &self,
        layer: &PdfLayerReference,
        fonts: &Fonts,
        report: &AttendanceReport,
        widths: &[f32],
        rows: Range<usize>,
        body_top: f32,
    ) {
        let size = self.font_size;
        for (offset, row) in report.rows[rows].iter().enumerate() {
            let baseline = body_top - (offset as f32 + 1.0) * self.row_height + 1.8;
            let mut days = row.statuses.iter();
            let mut leaves = row.leave_totals.iter();
            let mut x = self.margin;

            for (column, width) in report.columns.iter().zip(widths) {
                let (text, centered) = match column.kind {
                    ColumnKind::Serial => (row.serial.to_string(), true),
                    ColumnKind::Name => (
                        truncate(&pdf_text(&row.name), max_chars(*width - 2.0, size)),
                        false,
                    ),
                    ColumnKind::Day { .. } => (
                        days.next().copied().unwrap_or_default().letter().to_string(),
                        true,
                    ),
                    ColumnKind::Leave => (leaves.next().copied().unwrap_or(0).to_string(), true),
                };
                let tx = if centered {
                    x + (width - text_width(&text, size)).max(0.0) / 2.0
                } else {
                    x + 1.0
                };
                layer.use_text(text, size, Mm(tx), Mm(baseline), &fonts.regular);
                x += width;
            }
        }
    }

    fn draw_grid(&self, layer: &PdfLayerReference, widths: &[f32], top: f32, rows: usize) {
        let left = self.margin;
        let right = left + widths.iter().sum::<f32>();
        let bottom = top - self.header_height - rows as f32 * self.row_height;

        layer.set_outline_color(rgb(0.4, 0.4, 0.4));
        layer.set_outline_thickness(0.3);

        let mut y = top;
        for line in 0..=rows + 1 {
            layer.add_line(segment((left, y), (right, y)));
            y -= if line == 0 { self.header_height } else { self.row_height };
        }

        let mut x = left;
        layer.add_line(segment((x, top), (x, bottom)));
        for width in widths {
            x += width;
            layer.add_line(segment((x, top), (x, bottom)));
        }
    }

    fn draw_footer(&self, layer: &PdfLayerReference, fonts: &Fonts, page: usize, pages: usize) {
        let text = format!("Page {page} of {pages}");
        let x = self.page_width - self.margin - text_width(&text, 8.0);
        layer.use_text(text, 8.0, Mm(x), Mm(self.margin - 4.0), &fonts.regular);
    }
}

fn max_chars(width: f32, size: f32) -> usize {
    (width / (size * 0.5 * PT_TO_MM)).floor().max(1.0) as usize
}

fn segment(from: (f32, f32), to: (f32, f32)) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    }
}

impl Exporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, report: &AttendanceReport) -> Result<Vec<u8>, ExportError> {
        self.render_pdf(report)
    }
}
