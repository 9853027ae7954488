//! Daily-work log parsing
//!
//! Input is a JSON array (or `{"logs": [...]}`) of entries:
//!
//! ```json
//! {"user_id": 7, "date": "2025-03-04", "type": "Embankment", "status": "completed", "file": "rfi/123.pdf"}
//! ```
//!
//! Entries whose date is missing or unreadable are not aggregated. They are
//! returned as *unassigned* so the report can say how many were left out.
//! Every other field is read leniently: `0`/`1` flags, numeric type names and
//! the like are coerced, and anything unusable is dropped with a warning.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tallyroll_core::{RawRecord, WorkStatus};

use crate::attendance::{json_kind, scalar_text};
use crate::{IngestError, IngestWarning};

#[derive(Debug, Deserialize)]
struct LogEntry {
    #[serde(default, rename = "user_id", alias = "incharge", alias = "employee_id")]
    subject: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default, rename = "type", alias = "category")]
    category: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    resubmission: Option<Value>,
    #[serde(default, alias = "attachment", alias = "rfi_file")]
    file: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LogDocument {
    #[serde(alias = "tasks", alias = "records")]
    logs: Vec<Value>,
}

/// Parsed daily-work logs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkLogBatch {
    pub records: Vec<RawRecord>,
    /// Entries left out because their date could not be read
    pub unassigned: Vec<IngestWarning>,
    /// Other oddities that did not stop the entry from being used
    pub warnings: Vec<IngestWarning>,
}

/// Parse daily-work log JSON
pub fn parse_work_logs(input: &str) -> Result<WorkLogBatch, IngestError> {
    let entries: Vec<Value> = match serde_json::from_str::<Value>(input)? {
        Value::Array(items) => items,
        Value::Object(map) => serde_json::from_value::<LogDocument>(Value::Object(map))?.logs,
        other => {
            return Err(IngestError::Shape(format!(
                "expected an array of log entries, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut batch = WorkLogBatch::default();

    for (index, raw) in entries.into_iter().enumerate() {
        let location = format!("logs[{index}]");
        let entry: LogEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                batch
                    .unassigned
                    .push(IngestWarning::new(&location, format!("unreadable entry: {e}")));
                continue;
            }
        };

        let Some(date) = entry.date.as_ref().and_then(parse_log_date) else {
            let shown = entry.date.map_or_else(|| "missing".to_string(), |d| d.to_string());
            batch
                .unassigned
                .push(IngestWarning::new(format!("{location}.date"), format!("unusable date ({shown})")));
            continue;
        };

        let subject_id = entry.subject.as_ref().and_then(scalar_text).unwrap_or_else(|| {
            batch
                .warnings
                .push(IngestWarning::new(format!("{location}.user_id"), "missing owner"));
            String::new()
        });

        let category = text_field(entry.category.as_ref(), &location, "type", &mut batch.warnings);
        if category.is_none() {
            batch
                .warnings
                .push(IngestWarning::new(format!("{location}.type"), "missing type, counted in totals only"));
        }

        let status = text_field(entry.status.as_ref(), &location, "status", &mut batch.warnings);
        let resubmission = flag_field(entry.resubmission.as_ref(), &location, "resubmission", &mut batch.warnings);
        let status = match status.as_deref().map(WorkStatus::from_name) {
            Some(WorkStatus::Completed) => WorkStatus::Completed,
            Some(WorkStatus::Resubmission) => WorkStatus::Resubmission,
            _ if resubmission == Some(true) => WorkStatus::Resubmission,
            _ => WorkStatus::Pending,
        };

        let mut record = RawRecord::new(subject_id, date, category.unwrap_or_default()).status(status);
        record.attachment = text_field(entry.file.as_ref(), &location, "file", &mut batch.warnings);
        batch.records.push(record);
    }

    Ok(batch)
}

/// A string or number as trimmed text. Blank and null read as absent; any
/// other JSON type is dropped with a warning.
fn text_field(
    value: Option<&Value>,
    location: &str,
    field: &str,
    warnings: &mut Vec<IngestWarning>,
) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => scalar_text(other).or_else(|| {
            warnings.push(IngestWarning::new(
                format!("{location}.{field}"),
                format!("expected text, found {}, ignored", json_kind(other)),
            ));
            None
        }),
    }
}

/// `true`/`false`, `0`/`1`, or the same spelled as a string
fn flag_field(
    value: Option<&Value>,
    location: &str,
    field: &str,
    warnings: &mut Vec<IngestWarning>,
) -> Option<bool> {
    let flag = match value? {
        Value::Null => return None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => return None,
            "0" | "false" | "no" => Some(false),
            "1" | "true" | "yes" => Some(true),
            _ => None,
        },
        _ => None,
    };
    if flag.is_none() {
        warnings.push(IngestWarning::new(
            format!("{location}.{field}"),
            format!("unreadable flag {}, ignored", value.map(Value::to_string).unwrap_or_default()),
        ));
    }
    flag
}

/// `YYYY-MM-DD`, optionally followed by a time (`T` or space separated)
fn parse_log_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| {
            let head = text.get(..19)?;
            NaiveDateTime::parse_from_str(head, fmt).ok()
        })
        .map(|dt| dt.date())
}
