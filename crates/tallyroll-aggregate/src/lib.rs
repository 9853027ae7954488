//! # tallyroll-aggregate
//!
//! Shapes typed inputs into exporter-ready reports.
//!
//! This crate provides:
//! - `DailyWorkAggregator`: daily-work logs grouped by date into summary rows
//! - `AttendanceReportBuilder`: per-employee monthly attendance grid
//! - `validate_rows`: advisory checks over summary rows
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tallyroll_core::{RawRecord, ReportPeriod};
//! use tallyroll_aggregate::DailyWorkAggregator;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
//! let records = vec![
//!     RawRecord::new("u1", day, "Embankment").completed().attachment("rfi.pdf"),
//!     RawRecord::new("u2", day, "Pavement"),
//! ];
//!
//! let period = ReportPeriod::new(2025, 3).unwrap();
//! let rows = DailyWorkAggregator::new(period).aggregate(&records);
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].total, 2);
//! assert_eq!(rows[0].rfi_submissions, 1);
//! ```

pub mod attendance;
pub mod daily;
pub mod validate;

pub use attendance::AttendanceReportBuilder;
pub use daily::DailyWorkAggregator;
pub use validate::validate_rows;
