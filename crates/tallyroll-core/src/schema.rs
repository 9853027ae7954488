//! Monthly column schema
//!
//! Builds the ordered column list shared by every attendance exporter:
//!
//! ```text
//! | Sl | Name | 1 Sat | 2 Sun | ... | 31 Mon | Sick | Casual |
//! ```
//!
//! Two fixed leading columns, one column per calendar day (flagged when it
//! falls on a weekend day), then one column per leave type. The schema has to
//! be rebuilt per request because both the day count and the leave types vary.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::{LeaveType, ReportPeriod};

/// Width of the sequence-number column (spreadsheet character units)
pub const SERIAL_WIDTH: f64 = 6.0;
/// Width of the name column
pub const NAME_WIDTH: f64 = 28.0;
/// Width of each day column
pub const DAY_WIDTH: f64 = 4.5;
/// Width of each leave-type column
pub const LEAVE_WIDTH: f64 = 10.0;

/// Weekend days used when none are configured
pub const DEFAULT_WEEKEND: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

/// What a column holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    Serial,
    Name,
    Day { date: NaiveDate, weekend: bool },
    Leave,
}

/// One table column
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    /// Header text
    pub label: String,
    /// Second header line (weekday abbreviation for day columns)
    pub sublabel: Option<String>,
    /// Stable key: `sl`, `name`, `YYYY-MM-DD`, or `leave:<type>`
    pub key: String,
    pub width: f64,
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    pub fn is_day(&self) -> bool {
        matches!(self.kind, ColumnKind::Day { .. })
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.kind, ColumnKind::Day { weekend: true, .. })
    }

    pub fn is_leave(&self) -> bool {
        matches!(self.kind, ColumnKind::Leave)
    }
}

/// Ordered column set for one month
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnSchema {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSchema {
    pub fn builder(period: ReportPeriod) -> ColumnSchemaBuilder {
        ColumnSchemaBuilder::new(period)
    }

    /// Schema with the default weekend
    pub fn monthly(period: ReportPeriod, leave_types: &[LeaveType]) -> Self {
        Self::builder(period).leave_types(leave_types).build()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<ColumnDescriptor> {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn day_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_day())
    }

    pub fn leave_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_leave())
    }
}

/// Builder for `ColumnSchema`
#[derive(Clone, Debug)]
pub struct ColumnSchemaBuilder {
    period: ReportPeriod,
    weekend: Vec<Weekday>,
    leave_types: Vec<LeaveType>,
}

impl ColumnSchemaBuilder {
    pub fn new(period: ReportPeriod) -> Self {
        Self {
            period,
            weekend: DEFAULT_WEEKEND.to_vec(),
            leave_types: Vec::new(),
        }
    }

    /// Replace the weekend days
    pub fn weekend(mut self, days: &[Weekday]) -> Self {
        self.weekend = days.to_vec();
        self
    }

    pub fn leave_types(mut self, leave_types: &[LeaveType]) -> Self {
        self.leave_types = leave_types.to_vec();
        self
    }

    pub fn build(self) -> ColumnSchema {
        let mut columns = Vec::with_capacity(2 + self.period.days_in_month() as usize + self.leave_types.len());

        columns.push(ColumnDescriptor {
            label: "Sl".into(),
            sublabel: None,
            key: "sl".into(),
            width: SERIAL_WIDTH,
            kind: ColumnKind::Serial,
        });
        columns.push(ColumnDescriptor {
            label: "Name".into(),
            sublabel: None,
            key: "name".into(),
            width: NAME_WIDTH,
            kind: ColumnKind::Name,
        });

        for date in self.period.dates() {
            let weekend = self.weekend.contains(&date.weekday());
            columns.push(ColumnDescriptor {
                label: date.day().to_string(),
                sublabel: Some(date.format("%a").to_string()),
                key: date.format("%Y-%m-%d").to_string(),
                width: DAY_WIDTH,
                kind: ColumnKind::Day { date, weekend },
            });
        }

        for leave in &self.leave_types {
            columns.push(ColumnDescriptor {
                label: leave.name.clone(),
                sublabel: None,
                key: format!("leave:{}", leave.name),
                width: LEAVE_WIDTH,
                kind: ColumnKind::Leave,
            });
        }

        ColumnSchema { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaves(names: &[&str]) -> Vec<LeaveType> {
        names.iter().map(|n| LeaveType::new(*n)).collect()
    }

    #[test]
    fn thirty_day_month_column_count() {
        let period = ReportPeriod::new(2025, 4).unwrap();
        for n in 0..4 {
            let names: Vec<String> = (0..n).map(|i| format!("L{i}")).collect();
            let types: Vec<LeaveType> = names.iter().map(LeaveType::new).collect();
            let schema = ColumnSchema::monthly(period, &types);
            assert_eq!(schema.len(), 2 + 30 + n);
        }
    }

    #[test]
    fn column_order_and_keys() {
        let period = ReportPeriod::new(2025, 2).unwrap();
        let schema = ColumnSchema::monthly(period, &leaves(&["Sick", "Casual"]));
        let keys: Vec<&str> = schema.columns().iter().map(|c| c.key.as_str()).collect();

        assert_eq!(keys[0], "sl");
        assert_eq!(keys[1], "name");
        assert_eq!(keys[2], "2025-02-01");
        assert_eq!(keys[29], "2025-02-28");
        assert_eq!(&keys[30..], &["leave:Sick", "leave:Casual"]);
        assert_eq!(schema.day_columns().count(), 28);
        assert_eq!(schema.leave_columns().count(), 2);
    }

    #[test]
    fn day_columns_carry_weekday_and_weekend_flag() {
        // 1 March 2025 is a Saturday
        let period = ReportPeriod::new(2025, 3).unwrap();
        let schema = ColumnSchema::monthly(period, &[]);
        let days: Vec<&ColumnDescriptor> = schema.day_columns().collect();

        assert_eq!(days[0].label, "1");
        assert_eq!(days[0].sublabel.as_deref(), Some("Sat"));
        assert!(days[0].is_weekend());
        assert!(days[1].is_weekend());
        assert_eq!(days[2].sublabel.as_deref(), Some("Mon"));
        assert!(!days[2].is_weekend());
    }

    #[test]
    fn custom_weekend() {
        let period = ReportPeriod::new(2025, 3).unwrap();
        let schema = ColumnSchema::builder(period)
            .weekend(&[Weekday::Fri])
            .build();
        let weekend: Vec<String> = schema
            .day_columns()
            .filter(|c| c.is_weekend())
            .map(|c| c.label.clone())
            .collect();
        assert_eq!(weekend, vec!["7", "14", "21", "28"]);
    }

    #[test]
    fn widths_by_column_type() {
        let period = ReportPeriod::new(2025, 3).unwrap();
        let schema = ColumnSchema::monthly(period, &leaves(&["Sick"]));
        let cols = schema.columns();
        assert_eq!(cols[0].width, SERIAL_WIDTH);
        assert_eq!(cols[1].width, NAME_WIDTH);
        assert_eq!(cols[2].width, DAY_WIDTH);
        assert_eq!(cols.last().unwrap().width, LEAVE_WIDTH);
        assert!(cols[1].width > cols[2].width);
    }
}
