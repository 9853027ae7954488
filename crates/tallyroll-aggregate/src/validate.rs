//! Advisory checks over summary rows
//!
//! Every finding is reported against its row index; a bad row never hides
//! findings (or figures) for the other rows.

use std::collections::HashSet;
use tallyroll_core::{SummaryRow, ValidationIssue};

/// Check each row's internal consistency
pub fn validate_rows(rows: &[SummaryRow]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let mut report = |message: String| {
            issues.push(ValidationIssue {
                row: index,
                date: row.date,
                message,
            });
        };

        if !row.is_consistent() {
            report(format!(
                "completed ({}) exceeds total ({})",
                row.completed, row.total
            ));
        }
        if row.completed + row.resubmissions > row.total {
            report(format!(
                "completed + resubmissions ({}) exceeds total ({})",
                row.completed + row.resubmissions,
                row.total
            ));
        }
        if row.rfi_submissions > row.completed {
            report(format!(
                "RFI submissions ({}) exceed completed ({})",
                row.rfi_submissions, row.completed
            ));
        }
        if row.categories.total() > row.total {
            report(format!(
                "category counts ({}) exceed total ({})",
                row.categories.total(),
                row.total
            ));
        }
        if !seen.insert(row.date) {
            report("duplicate date".to_string());
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn row(day: u32, total: u32, completed: u32) -> SummaryRow {
        let mut row = SummaryRow::new(NaiveDate::from_ymd_opt(2025, 3, day).unwrap());
        row.total = total;
        row.completed = completed;
        row
    }

    #[test]
    fn consistent_rows_pass() {
        let mut a = row(2, 10, 7);
        a.resubmissions = 2;
        a.rfi_submissions = 5;
        assert!(validate_rows(&[a, row(1, 0, 0)]).is_empty());
    }

    #[test]
    fn completed_over_total_is_reported_per_row() {
        let rows = vec![row(3, 10, 7), row(2, 4, 6), row(1, 5, 5)];
        let issues = validate_rows(&rows);
        // completed > total also trips completed + resubmissions > total
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.row == 1));
        assert_eq!(issues[0].message, "completed (6) exceeds total (4)");
        assert_eq!(issues[0].to_string(), "Row 2 (2025-03-02): completed (6) exceeds total (4)");
    }

    #[test]
    fn rfi_over_completed() {
        let mut r = row(1, 10, 2);
        r.rfi_submissions = 3;
        let issues = validate_rows(&[r]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("RFI submissions (3)"));
    }

    #[test]
    fn duplicate_dates() {
        let issues = validate_rows(&[row(1, 1, 1), row(1, 1, 1)]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, 1);
        assert_eq!(issues[0].message, "duplicate date");
    }
}
