//! # tallyroll-ingest
//!
//! Turns the loosely-typed JSON the web front end posts into typed report
//! inputs.
//!
//! This crate provides:
//! - Attendance sheets: per-employee objects whose keys are either fixed
//!   fields or `YYYY-MM-DD` dates mapping to a status symbol
//! - Daily-work logs: one object per log entry
//!
//! Nothing is dropped silently. Anything that cannot be used is reported as
//! an `IngestWarning` (or, for unknown status symbols under
//! `StatusPolicy::Reject`, an error).
//!
//! ## Example
//!
//! ```rust
//! use tallyroll_core::{AttendanceStatus, ReportPeriod};
//! use tallyroll_ingest::{parse_attendance, StatusPolicy};
//!
//! let input = r#"{
//!     "employees": [{"employee_id": "E1", "name": "Ada", "2025-03-03": "√"}],
//!     "leave_types": [{"type": "Sick"}],
//!     "leave_counts": {"E1": {"Sick": 1}}
//! }"#;
//!
//! let period = ReportPeriod::new(2025, 3).unwrap();
//! let ingested = parse_attendance(input, period, StatusPolicy::default()).unwrap();
//! let sheet = ingested.value;
//! assert_eq!(sheet.subjects[0].name, "Ada");
//! assert_eq!(sheet.leave_count("E1", "Sick"), 1);
//! assert!(ingested.warnings.is_empty());
//! ```

pub mod attendance;
pub mod worklog;

pub use attendance::parse_attendance;
pub use worklog::{parse_work_logs, WorkLogBatch};

use std::fmt;
use std::path::{Path, PathBuf};
use tallyroll_core::{AttendanceSheet, ReportPeriod};
use thiserror::Error;

/// Input error
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected input shape: {0}")]
    Shape(String),

    #[error("Unknown attendance status {symbol:?} for {subject} on {date}")]
    UnknownStatus {
        subject: String,
        date: String,
        symbol: String,
    },

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to do with an attendance cell whose status symbol is not recognised
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Warn and treat the day as absent
    #[default]
    DefaultAbsent,
    /// Fail the whole ingest
    Reject,
}

/// Something in the input that was skipped or defaulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestWarning {
    /// Where in the input, e.g. `employees[2]` or `logs[14].date`
    pub location: String,
    pub message: String,
}

impl IngestWarning {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = Self {
            location: location.into(),
            message: message.into(),
        };
        tracing::warn!(location = %warning.location, "{}", warning.message);
        warning
    }
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// A parsed value plus everything that had to be skipped to get it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested<T> {
    pub value: T,
    pub warnings: Vec<IngestWarning>,
}

fn read_input(path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse an attendance file
pub fn read_attendance(
    path: &Path,
    period: ReportPeriod,
    policy: StatusPolicy,
) -> Result<Ingested<AttendanceSheet>, IngestError> {
    parse_attendance(&read_input(path)?, period, policy)
}

/// Read and parse a daily-work log file
pub fn read_work_logs(path: &Path) -> Result<WorkLogBatch, IngestError> {
    parse_work_logs(&read_input(path)?)
}
