//! Plain text renderer for console output

use rust_decimal::Decimal;
use tallyroll_core::{
    performance_band, AttendanceReport, AttendanceStatus, ColumnKind, DailyWorkReport, MetricKind,
};

use crate::truncate;

/// Width of the name column in the attendance grid
const NAME_COLUMN: usize = 20;

/// Plain text renderer for console output
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Symbol grid: one line per employee, one character per day
    pub fn render_attendance(&self, report: &AttendanceReport) -> String {
        let mut out = String::new();
        out.push_str(&format!("{} - {}\n", report.title, report.period.label()));
        if let Some(org) = &report.organization {
            out.push_str(&format!("{org}\n"));
        }
        out.push_str(&format!("Total Employees: {}\n", report.rows.len()));
        out.push_str(&format!("{}\n", AttendanceReport::legend(AttendanceStatus::symbol)));
        out.push('\n');

        let leave_labels: Vec<&str> = report
            .columns
            .iter()
            .filter(|c| matches!(c.kind, ColumnKind::Leave))
            .map(|c| c.label.as_str())
            .collect();

        // Day ruler: the last digit of each day number
        let ruler: String = report
            .columns
            .iter()
            .filter_map(|c| match c.kind {
                ColumnKind::Day { date, .. } => {
                    char::from_digit(chrono::Datelike::day(&date) % 10, 10)
                }
                _ => None,
            })
            .collect();
        out.push_str(&format!(
            "{:>3}  {:<width$}  {}  {}\n",
            "Sl",
            "Name",
            ruler,
            leave_labels.join(" "),
            width = NAME_COLUMN
        ));

        for row in &report.rows {
            let days: String = row.statuses.iter().map(|s| s.symbol()).collect();
            let leaves: Vec<String> = row
                .leave_totals
                .iter()
                .zip(&leave_labels)
                .map(|(count, label)| format!("{count:>width$}", width = label.chars().count()))
                .collect();
            out.push_str(&format!(
                "{:>3}  {:<width$}  {}  {}\n",
                row.serial,
                truncate(&row.name, NAME_COLUMN),
                days,
                leaves.join(" "),
                width = NAME_COLUMN
            ));
        }

        out
    }

    /// Daily table with band labels, totals, trend and validation findings
    pub fn render_daily(&self, report: &DailyWorkReport) -> String {
        let mut out = String::new();
        out.push_str(&format!("Daily Work Summary - {}\n", report.period.label()));
        out.push_str(&format!(
            "{:<10}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>16}  {:>16}\n",
            "Date", "Total", "Done", "Pend", "Resub", "RFI", "Completion", "RFI Submission"
        ));

        for row in &report.rows {
            let completion = row.completion_percentage();
            let submission = row.rfi_submission_percentage();
            out.push_str(&format!(
                "{:<10}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>16}  {:>16}\n",
                row.date.format("%Y-%m-%d"),
                row.total,
                row.completed,
                row.pending(),
                row.resubmissions,
                row.rfi_submissions,
                banded(completion, MetricKind::Completion),
                banded(submission, MetricKind::Submission),
            ));
        }

        let t = &report.totals;
        out.push_str(&format!(
            "{:<10}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>16}  {:>16}\n",
            "TOTAL",
            t.total,
            t.completed,
            t.pending,
            t.resubmissions,
            t.rfi_submissions,
            banded(t.completion_percentage, MetricKind::Completion),
            banded(t.submission_percentage, MetricKind::Submission),
        ));

        out.push('\n');
        out.push_str(&format!("Trend: {}\n", report.trend));
        out.push_str(&format!("Average daily completion: {:.1}%\n", t.average_daily_completion));
        if let (Some(best), Some(worst)) = (t.best_day, t.worst_day) {
            out.push_str(&format!("Best day: {best}  Worst day: {worst}\n"));
        }
        if report.unassigned > 0 {
            out.push_str(&format!("Unassigned records: {}\n", report.unassigned));
        }
        if !report.issues.is_empty() {
            out.push_str("Validation:\n");
            for issue in &report.issues {
                out.push_str(&format!("  {issue}\n"));
            }
        }

        out
    }
}

/// `70.0% GOOD`
fn banded(pct: Decimal, kind: MetricKind) -> String {
    format!("{pct:.1}% {}", performance_band(pct, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tallyroll_core::{
        AttendanceRow, ColumnSchema, LeaveType, ReportPeriod, SummaryRow, SummaryTotals, Trend,
        ValidationIssue,
    };

    #[test]
    fn test_attendance_grid() {
        let period = ReportPeriod::new(2025, 2).unwrap();
        let mut statuses = vec![AttendanceStatus::Absent; 28];
        statuses[0] = AttendanceStatus::Present;
        statuses[1] = AttendanceStatus::Holiday;
        let report = AttendanceReport {
            title: "Monthly Attendance Report".into(),
            organization: None,
            period,
            generated_at: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            columns: ColumnSchema::monthly(period, &[LeaveType::new("Sick")]).into_columns(),
            rows: vec![AttendanceRow {
                serial: 1,
                subject_id: "E1".into(),
                name: "Ada".into(),
                statuses,
                leave_totals: vec![2],
            }],
        };

        let text = TextRenderer.render_attendance(&report);
        assert!(text.starts_with("Monthly Attendance Report - February 2025\n"));
        assert!(text.contains("Total Employees: 1"));
        assert!(text.contains("1234567890123456789012345678  Sick"));
        assert!(text.contains("√#▼▼"));
        assert!(text.trim_end().ends_with("   2"));
    }

    #[test]
    fn test_daily_table() {
        let mut row = SummaryRow::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        row.total = 10;
        row.completed = 7;
        row.rfi_submissions = 5;
        let rows = vec![row];
        let report = DailyWorkReport {
            period: ReportPeriod::new(2025, 3).unwrap(),
            generated_at: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            totals: SummaryTotals::from_rows(&rows),
            trend: Trend::Stable,
            rows,
            unassigned: 2,
            issues: vec![ValidationIssue {
                row: 0,
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
                message: "duplicate date".into(),
            }],
        };

        let text = TextRenderer.render_daily(&report);
        assert!(text.contains("2025-03-04"));
        assert!(text.contains("70.0% GOOD"));
        assert!(text.contains("71.4% AVERAGE"));
        assert!(text.contains("Trend: stable"));
        assert!(text.contains("Unassigned records: 2"));
        assert!(text.contains("Row 1 (2025-03-04): duplicate date"));
    }
}
