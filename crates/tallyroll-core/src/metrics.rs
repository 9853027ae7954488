//! Report metrics
//!
//! Percentages, performance bands and roll-ups over daily-work summary rows.
//!
//! # Core Concepts
//!
//! - **Percentages** are rounded to one decimal place and are zero when the
//!   denominator is zero.
//! - **PerformanceBand**: EXCELLENT, GOOD, AVERAGE or POOR, with thresholds
//!   that depend on the metric (`MetricKind`).
//! - **Trend**: compares the first half of a month against the second half.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tallyroll_core::metrics::{completion_percentage, performance_band, MetricKind, PerformanceBand};
//!
//! let pct = completion_percentage(7, 10);
//! assert_eq!(pct, Decimal::from(70));
//! assert_eq!(performance_band(pct, MetricKind::Completion), PerformanceBand::Good);
//! assert_eq!(completion_percentage(0, 0), Decimal::ZERO);
//! ```

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CategoryCounts, SummaryRow};

/// Minimum difference (percentage points) between half-month means for a trend
pub const TREND_DELTA: u32 = 5;

// ============================================================================
// Percentages
// ============================================================================

/// `numerator / denominator` as a percentage with one decimal place
///
/// Zero when `denominator` is zero.
pub fn percentage(numerator: u32, denominator: u32) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    round_pct(Decimal::from(numerator) * Decimal::ONE_HUNDRED / Decimal::from(denominator))
}

/// Share of logged items that were completed
pub fn completion_percentage(completed: u32, total: u32) -> Decimal {
    percentage(completed, total)
}

/// Share of completed items that carry an RFI submission
pub fn submission_percentage(submissions: u32, completed: u32) -> Decimal {
    percentage(submissions, completed)
}

fn round_pct(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

// ============================================================================
// Performance Bands
// ============================================================================

/// Metric a percentage measures; each has its own band thresholds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Completion,
    Submission,
}

impl MetricKind {
    /// Band minimums, highest band first. Below the last entry is POOR.
    pub const fn thresholds(self) -> [(PerformanceBand, u32); 3] {
        match self {
            MetricKind::Completion => [
                (PerformanceBand::Excellent, 90),
                (PerformanceBand::Good, 70),
                (PerformanceBand::Average, 40),
            ],
            MetricKind::Submission => [
                (PerformanceBand::Excellent, 95),
                (PerformanceBand::Good, 80),
                (PerformanceBand::Average, 60),
            ],
        }
    }
}

/// Ordered severity classification of a metric
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceBand {
    Poor,
    Average,
    Good,
    Excellent,
}

impl PerformanceBand {
    pub const fn as_str(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "EXCELLENT",
            PerformanceBand::Good => "GOOD",
            PerformanceBand::Average => "AVERAGE",
            PerformanceBand::Poor => "POOR",
        }
    }

    /// Colour token for dashboards
    pub const fn color(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "#16A34A",
            PerformanceBand::Good => "#2563EB",
            PerformanceBand::Average => "#D97706",
            PerformanceBand::Poor => "#DC2626",
        }
    }

    /// Light background tint as `0xRRGGBB`, for spreadsheet cells
    pub const fn fill(self) -> u32 {
        match self {
            PerformanceBand::Excellent => 0xDCFCE7,
            PerformanceBand::Good => 0xDBEAFE,
            PerformanceBand::Average => 0xFEF3C7,
            PerformanceBand::Poor => 0xFEE2E2,
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `pct`: the first band (highest first) whose minimum it meets
pub fn performance_band(pct: Decimal, kind: MetricKind) -> PerformanceBand {
    kind.thresholds()
        .into_iter()
        .find(|(_, min)| pct >= Decimal::from(*min))
        .map(|(band, _)| band)
        .unwrap_or(PerformanceBand::Poor)
}

/// Colour token of the band `pct` falls in
pub fn performance_color(pct: Decimal, kind: MetricKind) -> &'static str {
    performance_band(pct, kind).color()
}

// ============================================================================
// Roll-ups
// ============================================================================

/// Direction of daily completion across a period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare mean completion of the earlier half of the rows with the later half
///
/// Rows are ordered by date first; with an odd count the later half gets the
/// extra row. Fewer than two rows is always stable.
pub fn completion_trend(rows: &[SummaryRow]) -> Trend {
    if rows.len() < 2 {
        return Trend::Stable;
    }
    let mut sorted: Vec<&SummaryRow> = rows.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let (earlier, later) = sorted.split_at(sorted.len() / 2);
    let delta = mean_completion(later) - mean_completion(earlier);
    let threshold = Decimal::from(TREND_DELTA);

    if delta > threshold {
        Trend::Improving
    } else if delta < -threshold {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn mean_completion(rows: &[&SummaryRow]) -> Decimal {
    if rows.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = rows.iter().map(|r| r.completion_percentage()).sum();
    sum / Decimal::from(rows.len() as u64)
}

/// Sums and overall figures across a report's summary rows
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Number of dates with at least one record
    pub days: usize,
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub resubmissions: u32,
    pub rfi_submissions: u32,
    pub categories: CategoryCounts,
    /// Completed over total, across every row
    pub completion_percentage: Decimal,
    /// RFI submissions over completed, across every row
    pub submission_percentage: Decimal,
    /// Mean of the per-day completion percentages
    pub average_daily_completion: Decimal,
    /// Date with the highest completion percentage (earliest on ties)
    pub best_day: Option<NaiveDate>,
    /// Date with the lowest completion percentage (earliest on ties)
    pub worst_day: Option<NaiveDate>,
}

impl SummaryTotals {
    pub fn from_rows(rows: &[SummaryRow]) -> Self {
        let mut totals = Self {
            days: rows.len(),
            ..Self::default()
        };

        for row in rows {
            totals.total += row.total;
            totals.completed += row.completed;
            totals.pending += row.pending();
            totals.resubmissions += row.resubmissions;
            totals.rfi_submissions += row.rfi_submissions;
            totals.categories += row.categories;
        }

        totals.completion_percentage = completion_percentage(totals.completed, totals.total);
        totals.submission_percentage = submission_percentage(totals.rfi_submissions, totals.completed);

        let refs: Vec<&SummaryRow> = rows.iter().collect();
        totals.average_daily_completion = round_pct(mean_completion(&refs));

        let mut by_date = refs;
        by_date.sort_by_key(|r| r.date);
        totals.best_day = by_date
            .iter()
            .rev()
            .max_by_key(|r| r.completion_percentage())
            .map(|r| r.date);
        totals.worst_day = by_date
            .iter()
            .min_by_key(|r| r.completion_percentage())
            .map(|r| r.date);

        totals
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn row(day: u32, total: u32, completed: u32) -> SummaryRow {
        let mut row = SummaryRow::new(date(2025, 3, day));
        row.total = total;
        row.completed = completed;
        row
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(completion_percentage(0, 0), Decimal::ZERO);
        assert_eq!(submission_percentage(3, 0), Decimal::ZERO);
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(completion_percentage(7, 10), dec!(70.0));
        assert_eq!(submission_percentage(5, 7), dec!(71.4));
        assert_eq!(completion_percentage(1, 3), dec!(33.3));
        assert_eq!(completion_percentage(2, 3), dec!(66.7));
        // 6.25 rounds away from zero
        assert_eq!(completion_percentage(1, 16), dec!(6.3));
    }

    #[test]
    fn completion_is_monotonic_in_completed() {
        for total in [1u32, 3, 7, 10, 33] {
            let mut previous = Decimal::ZERO;
            for completed in 0..=total {
                let pct = completion_percentage(completed, total);
                assert!(pct >= previous, "{completed}/{total} dropped below {previous}");
                previous = pct;
            }
            assert_eq!(previous, dec!(100));
        }
    }

    #[test]
    fn completion_bands() {
        let kind = MetricKind::Completion;
        assert_eq!(performance_band(dec!(100), kind), PerformanceBand::Excellent);
        assert_eq!(performance_band(dec!(90), kind), PerformanceBand::Excellent);
        assert_eq!(performance_band(dec!(89.9), kind), PerformanceBand::Good);
        assert_eq!(performance_band(dec!(70), kind), PerformanceBand::Good);
        assert_eq!(performance_band(dec!(40), kind), PerformanceBand::Average);
        assert_eq!(performance_band(dec!(39), kind), PerformanceBand::Poor);
        assert_eq!(performance_band(Decimal::ZERO, kind), PerformanceBand::Poor);
    }

    #[test]
    fn submission_bands_differ_from_completion() {
        assert_eq!(performance_band(dec!(90), MetricKind::Submission), PerformanceBand::Good);
        assert_eq!(performance_band(dec!(95), MetricKind::Submission), PerformanceBand::Excellent);
        assert_eq!(performance_band(dec!(59.9), MetricKind::Submission), PerformanceBand::Poor);
    }

    #[test]
    fn color_tokens() {
        assert_eq!(
            performance_color(dec!(100), MetricKind::Completion),
            PerformanceBand::Excellent.color()
        );
        assert_eq!(
            performance_color(dec!(39), MetricKind::Completion),
            PerformanceBand::Poor.color()
        );
    }

    #[test]
    fn band_ordering() {
        assert!(PerformanceBand::Excellent > PerformanceBand::Good);
        assert!(PerformanceBand::Good > PerformanceBand::Average);
        assert!(PerformanceBand::Average > PerformanceBand::Poor);
    }

    #[test]
    fn trend_improving() {
        let rows = vec![row(1, 10, 4), row(2, 10, 5), row(3, 10, 8), row(4, 10, 9)];
        assert_eq!(completion_trend(&rows), Trend::Improving);
    }

    #[test]
    fn trend_declining_regardless_of_input_order() {
        // Descending input, as produced by the aggregator
        let rows = vec![row(4, 10, 3), row(3, 10, 4), row(2, 10, 9), row(1, 10, 10)];
        assert_eq!(completion_trend(&rows), Trend::Declining);
    }

    #[test]
    fn trend_stable_within_delta() {
        // Means 70 vs 75: exactly the delta is not enough
        let rows = vec![row(1, 10, 7), row(2, 10, 7), row(3, 20, 15), row(4, 20, 15)];
        assert_eq!(completion_trend(&rows), Trend::Stable);
    }

    #[test]
    fn trend_needs_two_rows() {
        assert_eq!(completion_trend(&[]), Trend::Stable);
        assert_eq!(completion_trend(&[row(1, 10, 10)]), Trend::Stable);
    }

    #[test]
    fn totals_roll_up() {
        let mut a = row(1, 10, 7);
        a.rfi_submissions = 5;
        a.resubmissions = 2;
        a.categories.embankment = 4;
        let mut b = row(2, 5, 5);
        b.rfi_submissions = 5;
        b.categories.pavement = 5;

        let totals = SummaryTotals::from_rows(&[b, a]);
        assert_eq!(totals.days, 2);
        assert_eq!(totals.total, 15);
        assert_eq!(totals.completed, 12);
        assert_eq!(totals.pending, 3);
        assert_eq!(totals.resubmissions, 2);
        assert_eq!(totals.rfi_submissions, 10);
        assert_eq!(totals.categories.total(), 9);
        assert_eq!(totals.completion_percentage, dec!(80.0));
        assert_eq!(totals.submission_percentage, dec!(83.3));
        assert_eq!(totals.average_daily_completion, dec!(85.0));
        assert_eq!(totals.best_day, Some(date(2025, 3, 2)));
        assert_eq!(totals.worst_day, Some(date(2025, 3, 1)));
    }

    #[test]
    fn totals_of_nothing() {
        let totals = SummaryTotals::from_rows(&[]);
        assert_eq!(totals.days, 0);
        assert_eq!(totals.completion_percentage, Decimal::ZERO);
        assert_eq!(totals.best_day, None);
    }

    #[test]
    fn best_day_ties_pick_earliest() {
        let rows = vec![row(3, 10, 10), row(1, 10, 10), row(2, 10, 5)];
        let totals = SummaryTotals::from_rows(&rows);
        assert_eq!(totals.best_day, Some(date(2025, 3, 1)));
        assert_eq!(totals.worst_day, Some(date(2025, 3, 2)));
    }
}
