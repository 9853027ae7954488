//! # tallyroll-core
//!
//! Core domain model and traits for the tallyroll report pipeline.
//!
//! This crate provides:
//! - Domain types: `ReportPeriod`, `AttendanceSheet`, `RawRecord`, `SummaryRow`
//! - Exporter inputs: `AttendanceReport`, `DailyWorkReport`
//! - Core traits: `Exporter`, `Notifier`
//! - Metrics (`metrics`) and the monthly column schema (`schema`)
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tallyroll_core::{AttendanceStatus, ReportPeriod, SubjectAttendance};
//!
//! let period = ReportPeriod::new(2025, 3).unwrap();
//! assert_eq!(period.days_in_month(), 31);
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let ada = SubjectAttendance::new("E1", "Ada").mark(day, AttendanceStatus::Present);
//! assert_eq!(ada.status_on(day), AttendanceStatus::Present);
//! // No mark means absent
//! assert_eq!(ada.status_on(day.succ_opt().unwrap()), AttendanceStatus::Absent);
//! ```

pub mod metrics;
pub mod schema;

pub use metrics::{
    completion_percentage, completion_trend, performance_band, performance_color,
    submission_percentage, MetricKind, PerformanceBand, SummaryTotals, Trend,
};
pub use schema::{ColumnDescriptor, ColumnKind, ColumnSchema, ColumnSchemaBuilder};

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

/// Identifier of the subject a row belongs to (employee or user id)
pub type SubjectId = String;

/// File name prefix for monthly attendance exports
pub const ATTENDANCE_FILE_PREFIX: &str = "Monthly_Attendance";

/// File name prefix for daily-work summary exports
pub const DAILY_WORK_FILE_PREFIX: &str = "Daily_Work_Summary";

// ============================================================================
// Report Period
// ============================================================================

/// A calendar month a report covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodRepr", into = "PeriodRepr")]
pub struct ReportPeriod {
    first: NaiveDate,
    last: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct PeriodRepr {
    year: i32,
    month: u32,
}

impl TryFrom<PeriodRepr> for ReportPeriod {
    type Error = PeriodError;

    fn try_from(repr: PeriodRepr) -> Result<Self, Self::Error> {
        Self::new(repr.year, repr.month)
    }
}

impl From<ReportPeriod> for PeriodRepr {
    fn from(period: ReportPeriod) -> Self {
        Self {
            year: period.year(),
            month: period.month(),
        }
    }
}

impl ReportPeriod {
    /// Create a period, validating the month and the calendar range
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(PeriodError::OutOfRange { year, month })?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(PeriodError::OutOfRange { year, month })?;
        Ok(Self { first, last })
    }

    /// The period containing `date`
    pub fn containing(date: NaiveDate) -> Result<Self, PeriodError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// Number of calendar days in the month (28..=31)
    pub fn days_in_month(&self) -> u32 {
        self.last.day()
    }

    /// Every date of the month, ascending
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let count = self.days_in_month() as usize;
        self.first.iter_days().take(count)
    }

    /// Whether `date` falls inside the month
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Human readable label, e.g. "March 2025"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// File stem `{prefix}_{YYYY}_{MM}`
    pub fn file_stem(&self, prefix: &str) -> String {
        format!("{}_{:04}_{:02}", prefix, self.year(), self.month())
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

// ============================================================================
// Attendance
// ============================================================================

/// Attendance mark for one subject on one day
///
/// The symbols are the wire vocabulary and must stay bit-exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// `√`
    Present,
    /// `▼` (also the value of a missing mark)
    #[default]
    Absent,
    /// `#`
    Holiday,
    /// `/`
    Leave,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Holiday,
        AttendanceStatus::Leave,
    ];

    /// Wire symbol
    pub const fn symbol(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "√",
            AttendanceStatus::Absent => "▼",
            AttendanceStatus::Holiday => "#",
            AttendanceStatus::Leave => "/",
        }
    }

    /// Single ASCII letter, for outputs whose fonts lack the symbols
    pub const fn letter(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "P",
            AttendanceStatus::Absent => "A",
            AttendanceStatus::Holiday => "H",
            AttendanceStatus::Leave => "L",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Holiday => "Holiday",
            AttendanceStatus::Leave => "Leave",
        }
    }

    /// Parse a wire symbol (surrounding whitespace ignored)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        Self::ALL.into_iter().find(|s| s.symbol() == symbol)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dynamic leave category (e.g. "Sick", "Casual")
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveType {
    #[serde(rename = "type")]
    pub name: String,
}

impl LeaveType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One subject's marks for a month
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAttendance {
    pub id: SubjectId,
    pub name: String,
    pub marks: BTreeMap<NaiveDate, AttendanceStatus>,
}

impl SubjectAttendance {
    pub fn new(id: impl Into<SubjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            marks: BTreeMap::new(),
        }
    }

    /// Record a mark (builder style)
    pub fn mark(mut self, date: NaiveDate, status: AttendanceStatus) -> Self {
        self.marks.insert(date, status);
        self
    }

    /// Status on `date`; unmarked days are absent
    pub fn status_on(&self, date: NaiveDate) -> AttendanceStatus {
        self.marks.get(&date).copied().unwrap_or_default()
    }
}

/// Typed form of the attendance input for one month
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendanceSheet {
    pub period: ReportPeriod,
    pub subjects: Vec<SubjectAttendance>,
    pub leave_types: Vec<LeaveType>,
    /// subject id -> leave type name -> days taken
    pub leave_counts: HashMap<SubjectId, HashMap<String, u32>>,
}

impl AttendanceSheet {
    pub fn new(period: ReportPeriod) -> Self {
        Self {
            period,
            subjects: Vec::new(),
            leave_types: Vec::new(),
            leave_counts: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Days of `leave_type` taken by `subject`, zero when unknown
    pub fn leave_count(&self, subject: &str, leave_type: &str) -> u32 {
        self.leave_counts
            .get(subject)
            .and_then(|by_type| by_type.get(leave_type))
            .copied()
            .unwrap_or(0)
    }
}

/// One exported attendance row
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttendanceRow {
    /// 1-based sequence number
    pub serial: usize,
    pub subject_id: SubjectId,
    pub name: String,
    /// One entry per day of the period, in day order
    pub statuses: Vec<AttendanceStatus>,
    /// One entry per leave type, in schema order
    pub leave_totals: Vec<u32>,
}

impl AttendanceRow {
    /// Number of days with `status`
    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.statuses.iter().filter(|s| **s == status).count()
    }
}

/// Exporter input for the monthly attendance grid
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttendanceReport {
    pub title: String,
    pub organization: Option<String>,
    pub period: ReportPeriod,
    pub generated_at: NaiveDateTime,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<AttendanceRow>,
}

impl AttendanceReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Legend pairs for every status, using the given code per status
    pub fn legend(code: impl Fn(AttendanceStatus) -> &'static str) -> String {
        AttendanceStatus::ALL
            .iter()
            .map(|s| format!("{} = {}", code(*s), s.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// Daily Work
// ============================================================================

/// Fixed category set daily-work logs are tallied into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkCategory {
    Embankment,
    Structure,
    Pavement,
}

impl WorkCategory {
    pub const ALL: [WorkCategory; 3] = [
        WorkCategory::Embankment,
        WorkCategory::Structure,
        WorkCategory::Pavement,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            WorkCategory::Embankment => "Embankment",
            WorkCategory::Structure => "Structure",
            WorkCategory::Pavement => "Pavement",
        }
    }

    /// Case-insensitive match on the type name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion bucket of a daily-work log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkStatus {
    #[default]
    Pending,
    Completed,
    Resubmission,
}

impl WorkStatus {
    /// Case-insensitive; anything other than completed/resubmission is pending
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("completed") {
            WorkStatus::Completed
        } else if name.eq_ignore_ascii_case("resubmission") {
            WorkStatus::Resubmission
        } else {
            WorkStatus::Pending
        }
    }
}

/// One daily-work log entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub subject_id: SubjectId,
    pub date: NaiveDate,
    /// Free-form type name, matched against `WorkCategory`
    pub category: String,
    pub status: WorkStatus,
    /// RFI file reference
    pub attachment: Option<String>,
}

impl RawRecord {
    pub fn new(subject_id: impl Into<SubjectId>, date: NaiveDate, category: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            date,
            category: category.into(),
            status: WorkStatus::Pending,
            attachment: None,
        }
    }

    pub fn status(mut self, status: WorkStatus) -> Self {
        self.status = status;
        self
    }

    pub fn completed(self) -> Self {
        self.status(WorkStatus::Completed)
    }

    pub fn resubmission(self) -> Self {
        self.status(WorkStatus::Resubmission)
    }

    pub fn attachment(mut self, file: impl Into<String>) -> Self {
        self.attachment = Some(file.into());
        self
    }

    pub fn work_category(&self) -> Option<WorkCategory> {
        WorkCategory::from_name(&self.category)
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.as_deref().is_some_and(|f| !f.trim().is_empty())
    }

    /// Completed with an RFI file attached
    pub fn is_rfi_submission(&self) -> bool {
        self.status == WorkStatus::Completed && self.has_attachment()
    }
}

/// Per-category tallies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub embankment: u32,
    pub structure: u32,
    pub pavement: u32,
}

impl CategoryCounts {
    pub fn get(&self, category: WorkCategory) -> u32 {
        match category {
            WorkCategory::Embankment => self.embankment,
            WorkCategory::Structure => self.structure,
            WorkCategory::Pavement => self.pavement,
        }
    }

    pub fn increment(&mut self, category: WorkCategory) {
        match category {
            WorkCategory::Embankment => self.embankment += 1,
            WorkCategory::Structure => self.structure += 1,
            WorkCategory::Pavement => self.pavement += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.embankment + self.structure + self.pavement
    }
}

impl std::ops::AddAssign for CategoryCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.embankment += rhs.embankment;
        self.structure += rhs.structure;
        self.pavement += rhs.pavement;
    }
}

/// Aggregated daily-work figures for one date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub total: u32,
    pub completed: u32,
    pub resubmissions: u32,
    pub categories: CategoryCounts,
    pub rfi_submissions: u32,
}

impl SummaryRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            completed: 0,
            resubmissions: 0,
            categories: CategoryCounts::default(),
            rfi_submissions: 0,
        }
    }

    /// `total - completed`, floored at zero for inconsistent rows
    pub fn pending(&self) -> u32 {
        self.total.saturating_sub(self.completed)
    }

    pub fn completion_percentage(&self) -> Decimal {
        completion_percentage(self.completed, self.total)
    }

    pub fn rfi_submission_percentage(&self) -> Decimal {
        submission_percentage(self.rfi_submissions, self.completed)
    }

    /// `completed <= total`
    pub fn is_consistent(&self) -> bool {
        self.completed <= self.total
    }
}

/// Advisory, row-indexed finding about a summary row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 0-based index into the row list
    pub row: usize,
    pub date: NaiveDate,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {} ({}): {}", self.row + 1, self.date, self.message)
    }
}

/// Exporter input for the daily-work summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyWorkReport {
    pub period: ReportPeriod,
    pub generated_at: NaiveDateTime,
    /// Descending by date
    pub rows: Vec<SummaryRow>,
    pub totals: SummaryTotals,
    pub trend: Trend,
    /// Records whose date could not be read
    pub unassigned: usize,
    pub issues: Vec<ValidationIssue>,
}

impl DailyWorkReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Export
// ============================================================================

/// Output file format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "Excel",
            ExportFormat::Pdf => "PDF",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `Monthly_Attendance_{YYYY}_{MM}.{ext}`
pub fn attendance_filename(period: &ReportPeriod, format: ExportFormat) -> String {
    format!("{}.{}", period.file_stem(ATTENDANCE_FILE_PREFIX), format.extension())
}

/// `Daily_Work_Summary_{YYYY}_{MM}.{ext}`
pub fn daily_work_filename(period: &ReportPeriod, format: ExportFormat) -> String {
    format!("{}.{}", period.file_stem(DAILY_WORK_FILE_PREFIX), format.extension())
}

/// A generated file, not yet saved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Result shape handed back to callers: `{success, filename}` or `{success, error}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportOutcome {
    pub fn saved(filename: impl Into<String>) -> Self {
        Self {
            success: true,
            filename: Some(filename.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Serializes an attendance report into a file format
pub trait Exporter {
    fn format(&self) -> ExportFormat;

    /// Render the report to file bytes
    fn render(&self, report: &AttendanceReport) -> Result<Vec<u8>, ExportError>;

    /// File name for a report covering `period`
    fn filename(&self, period: &ReportPeriod) -> String {
        attendance_filename(period, self.format())
    }
}

/// Progress state of a user-facing export notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationState {
    Pending,
    Success,
    Error,
}

/// Port for surfacing export progress to whatever UI hosts the pipeline
pub trait Notifier {
    fn notify(&mut self, state: NotificationState, message: &str);
}

/// Notifier that records every notification (useful in tests)
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    pub events: Vec<(NotificationState, String)>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<NotificationState> {
        self.events.iter().map(|(state, _)| *state).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&mut self, state: NotificationState, message: &str) {
        self.events.push((state, message.to_string()));
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid reporting period
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Period out of supported range: {year}-{month:02}")]
    OutOfRange { year: i32, month: u32 },
}

/// Export error
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: {0}")]
    EmptyInput(String),

    #[error("Failed to generate {format}: {message}")]
    Generation { format: ExportFormat, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn generation(format: ExportFormat, message: impl fmt::Display) -> Self {
        ExportError::Generation {
            format,
            message: message.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
