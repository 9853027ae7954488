//! Monthly attendance grid
//!
//! Resolves every subject's status for every day of the period (unmarked
//! days are absent) and lines leave totals up with the leave-type columns.

use chrono::{Local, NaiveDateTime, Weekday};
use tallyroll_core::schema::DEFAULT_WEEKEND;
use tallyroll_core::{AttendanceReport, AttendanceRow, AttendanceSheet, ColumnSchema};

/// Title used when none is configured
pub const DEFAULT_TITLE: &str = "Monthly Attendance Report";

/// Builds an `AttendanceReport` from an `AttendanceSheet`
#[derive(Clone, Debug)]
pub struct AttendanceReportBuilder {
    title: String,
    organization: Option<String>,
    weekend: Vec<Weekday>,
    generated_at: Option<NaiveDateTime>,
}

impl Default for AttendanceReportBuilder {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            organization: None,
            weekend: DEFAULT_WEEKEND.to_vec(),
            generated_at: None,
        }
    }
}

impl AttendanceReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn weekend(mut self, days: &[Weekday]) -> Self {
        self.weekend = days.to_vec();
        self
    }

    /// Fix the generation timestamp (defaults to local now)
    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn build(&self, sheet: &AttendanceSheet) -> AttendanceReport {
        let period = sheet.period;
        let columns = ColumnSchema::builder(period)
            .weekend(&self.weekend)
            .leave_types(&sheet.leave_types)
            .build()
            .into_columns();

        let rows = sheet
            .subjects
            .iter()
            .enumerate()
            .map(|(index, subject)| AttendanceRow {
                serial: index + 1,
                subject_id: subject.id.clone(),
                name: subject.name.clone(),
                statuses: period.dates().map(|d| subject.status_on(d)).collect(),
                leave_totals: sheet
                    .leave_types
                    .iter()
                    .map(|leave| sheet.leave_count(&subject.id, &leave.name))
                    .collect(),
            })
            .collect();

        AttendanceReport {
            title: self.title.clone(),
            organization: self.organization.clone(),
            period,
            generated_at: self.generated_at.unwrap_or_else(|| Local::now().naive_local()),
            columns,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tallyroll_core::{AttendanceStatus, LeaveType, ReportPeriod, SubjectAttendance};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn april_sheet() -> AttendanceSheet {
        let mut sheet = AttendanceSheet::new(ReportPeriod::new(2025, 4).unwrap());
        sheet.subjects.push(
            SubjectAttendance::new("E1", "Ada")
                .mark(date(1), AttendanceStatus::Present)
                .mark(date(2), AttendanceStatus::Leave)
                .mark(date(3), AttendanceStatus::Holiday),
        );
        sheet.subjects.push(SubjectAttendance::new("E2", "Grace").mark(date(30), AttendanceStatus::Present));
        sheet.leave_types = vec![LeaveType::new("Sick"), LeaveType::new("Casual")];
        sheet
            .leave_counts
            .entry("E1".into())
            .or_default()
            .insert("Casual".into(), 1);
        sheet
    }

    #[test]
    fn builds_rows_per_subject() {
        let report = AttendanceReportBuilder::new()
            .generated_at(date(30).and_hms_opt(9, 0, 0).unwrap())
            .build(&april_sheet());

        assert_eq!(report.title, DEFAULT_TITLE);
        assert_eq!(report.columns.len(), 2 + 30 + 2);
        assert_eq!(report.rows.len(), 2);

        let ada = &report.rows[0];
        assert_eq!(ada.serial, 1);
        assert_eq!(ada.statuses.len(), 30);
        assert_eq!(ada.statuses[0], AttendanceStatus::Present);
        assert_eq!(ada.statuses[1], AttendanceStatus::Leave);
        assert_eq!(ada.statuses[2], AttendanceStatus::Holiday);
        assert_eq!(ada.statuses[3], AttendanceStatus::Absent);
        assert_eq!(ada.leave_totals, vec![0, 1]);
        assert_eq!(ada.count(AttendanceStatus::Absent), 27);

        let grace = &report.rows[1];
        assert_eq!(grace.serial, 2);
        assert_eq!(grace.statuses[29], AttendanceStatus::Present);
        assert_eq!(grace.leave_totals, vec![0, 0]);
    }

    #[test]
    fn empty_sheet_gives_empty_report() {
        let sheet = AttendanceSheet::new(ReportPeriod::new(2025, 4).unwrap());
        let report = AttendanceReportBuilder::new().build(&sheet);
        assert!(report.is_empty());
        assert_eq!(report.columns.len(), 32);
    }

    #[test]
    fn configured_title_and_weekend() {
        let report = AttendanceReportBuilder::new()
            .title("Site Attendance")
            .organization("Acme Construction")
            .weekend(&[Weekday::Fri])
            .build(&april_sheet());
        assert_eq!(report.title, "Site Attendance");
        assert_eq!(report.organization.as_deref(), Some("Acme Construction"));
        // 4 April 2025 is a Friday
        assert!(report.columns[2 + 3].is_weekend());
        assert!(!report.columns[2 + 4].is_weekend());
    }
}
