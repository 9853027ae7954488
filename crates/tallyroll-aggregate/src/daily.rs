//! Daily-work aggregation
//!
//! One `SummaryRow` per distinct date in the period, newest first.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tallyroll_core::{
    completion_trend, DailyWorkReport, RawRecord, ReportPeriod, SummaryRow, SummaryTotals, WorkStatus,
};

use crate::validate::validate_rows;

/// Groups daily-work logs of one month by date
#[derive(Clone, Debug)]
pub struct DailyWorkAggregator {
    period: ReportPeriod,
}

impl DailyWorkAggregator {
    pub fn new(period: ReportPeriod) -> Self {
        Self { period }
    }

    pub fn period(&self) -> ReportPeriod {
        self.period
    }

    /// Summary rows for every date in the period that has records, descending
    ///
    /// Records dated outside the period are skipped.
    pub fn aggregate(&self, records: &[RawRecord]) -> Vec<SummaryRow> {
        let mut by_date: BTreeMap<NaiveDate, SummaryRow> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in records {
            if !self.period.contains(record.date) {
                skipped += 1;
                continue;
            }

            let row = by_date
                .entry(record.date)
                .or_insert_with(|| SummaryRow::new(record.date));

            row.total += 1;
            match record.status {
                WorkStatus::Completed => row.completed += 1,
                WorkStatus::Resubmission => row.resubmissions += 1,
                WorkStatus::Pending => {}
            }

            // Unknown types still count toward the total
            if let Some(category) = record.work_category() {
                row.categories.increment(category);
            }

            if record.is_rfi_submission() {
                row.rfi_submissions += 1;
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, period = %self.period, "records outside the period were skipped");
        }

        by_date.into_values().rev().collect()
    }

    /// Full report: rows, totals, trend and validation findings
    pub fn report(
        &self,
        records: &[RawRecord],
        unassigned: usize,
        generated_at: NaiveDateTime,
    ) -> DailyWorkReport {
        let rows = self.aggregate(records);
        let issues = validate_rows(&rows);
        for issue in &issues {
            tracing::warn!("{issue}");
        }

        DailyWorkReport {
            period: self.period,
            generated_at,
            totals: SummaryTotals::from_rows(&rows),
            trend: completion_trend(&rows),
            rows,
            unassigned,
            issues,
        }
    }
}
