//! Attendance sheet parsing
//!
//! Accepted input is either a document
//!
//! ```json
//! {
//!   "employees": [{"employee_id": "E1", "name": "Ada", "2025-03-01": "√"}],
//!   "leave_types": [{"type": "Sick"}],
//!   "leave_counts": {"E1": {"Sick": 2}}
//! }
//! ```
//!
//! or a bare array of employee objects. Per employee, `name` and one of
//! `employee_id` / `user_id` / `id` are fixed fields; every other key must be
//! a date inside the reporting period.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tallyroll_core::{AttendanceSheet, AttendanceStatus, LeaveType, ReportPeriod, SubjectAttendance};

use crate::{IngestError, IngestWarning, Ingested, StatusPolicy};

const ID_KEYS: [&str; 3] = ["employee_id", "user_id", "id"];
const NAME_KEYS: [&str; 2] = ["name", "employee_name"];

#[derive(Debug, Deserialize)]
struct AttendanceDocument {
    #[serde(default, alias = "attendances", alias = "rows")]
    employees: Vec<Map<String, Value>>,
    #[serde(default, alias = "leaveTypes")]
    leave_types: Vec<LeaveType>,
    #[serde(default, alias = "leaveCounts")]
    leave_counts: HashMap<String, HashMap<String, u32>>,
}

/// Parse attendance JSON for `period`
pub fn parse_attendance(
    input: &str,
    period: ReportPeriod,
    policy: StatusPolicy,
) -> Result<Ingested<AttendanceSheet>, IngestError> {
    let document = match serde_json::from_str::<Value>(input)? {
        Value::Array(_) => AttendanceDocument {
            employees: serde_json::from_str(input)?,
            leave_types: Vec::new(),
            leave_counts: HashMap::new(),
        },
        Value::Object(_) => serde_json::from_str(input)?,
        other => {
            return Err(IngestError::Shape(format!(
                "expected an object or an array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut warnings = Vec::new();
    let mut sheet = AttendanceSheet::new(period);

    for (index, employee) in document.employees.iter().enumerate() {
        let subject = parse_subject(index, employee, period, policy, &mut warnings)?;
        sheet.subjects.push(subject);
    }

    sheet.leave_types = dedup_leave_types(document.leave_types, &mut warnings);
    sheet.leave_counts = document.leave_counts;

    Ok(Ingested {
        value: sheet,
        warnings,
    })
}

fn parse_subject(
    index: usize,
    employee: &Map<String, Value>,
    period: ReportPeriod,
    policy: StatusPolicy,
    warnings: &mut Vec<IngestWarning>,
) -> Result<SubjectAttendance, IngestError> {
    let location = format!("employees[{index}]");

    let id = ID_KEYS
        .iter()
        .find_map(|key| employee.get(*key).and_then(scalar_text))
        .unwrap_or_else(|| {
            warnings.push(IngestWarning::new(&location, "missing employee id, using row number"));
            format!("row-{}", index + 1)
        });

    let name = NAME_KEYS
        .iter()
        .find_map(|key| employee.get(*key).and_then(scalar_text))
        .unwrap_or_else(|| {
            warnings.push(IngestWarning::new(&location, "missing name"));
            String::new()
        });

    let mut subject = SubjectAttendance::new(id, name);

    for (key, value) in employee {
        if ID_KEYS.contains(&key.as_str()) || NAME_KEYS.contains(&key.as_str()) {
            continue;
        }

        let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") else {
            warnings.push(IngestWarning::new(
                format!("{location}.{key}"),
                "not a fixed field or a YYYY-MM-DD date, ignored",
            ));
            continue;
        };

        if !period.contains(date) {
            warnings.push(IngestWarning::new(
                format!("{location}.{key}"),
                format!("date outside {}, ignored", period.label()),
            ));
            continue;
        }

        let symbol = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
        let status = match AttendanceStatus::from_symbol(&symbol) {
            Some(status) => status,
            None => match policy {
                StatusPolicy::Reject => {
                    return Err(IngestError::UnknownStatus {
                        subject: subject.id.clone(),
                        date: key.clone(),
                        symbol,
                    })
                }
                StatusPolicy::DefaultAbsent => {
                    warnings.push(IngestWarning::new(
                        format!("{location}.{key}"),
                        format!("unknown status {symbol:?}, recorded as absent"),
                    ));
                    AttendanceStatus::Absent
                }
            },
        };

        subject.marks.insert(date, status);
    }

    Ok(subject)
}

fn dedup_leave_types(types: Vec<LeaveType>, warnings: &mut Vec<IngestWarning>) -> Vec<LeaveType> {
    let mut seen: Vec<LeaveType> = Vec::with_capacity(types.len());
    for (index, leave) in types.into_iter().enumerate() {
        if leave.name.trim().is_empty() {
            warnings.push(IngestWarning::new(format!("leave_types[{index}]"), "blank leave type, ignored"));
        } else if seen.contains(&leave) {
            warnings.push(IngestWarning::new(
                format!("leave_types[{index}]"),
                format!("duplicate leave type {:?}, ignored", leave.name),
            ));
        } else {
            seen.push(leave);
        }
    }
    seen
}

/// Strings (trimmed, non-empty) and numbers as text
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn march() -> ReportPeriod {
        ReportPeriod::new(2025, 3).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn parses_document() {
        let input = r##"{
            "employees": [
                {"employee_id": "E1", "name": "Ada", "2025-03-01": "√", "2025-03-02": "#", "2025-03-03": "/"},
                {"user_id": 42, "name": "Grace", "2025-03-01": "▼"}
            ],
            "leave_types": [{"type": "Sick"}, {"type": "Casual"}],
            "leave_counts": {"E1": {"Sick": 1}}
        }"##;

        let ingested = parse_attendance(input, march(), StatusPolicy::Reject).unwrap();
        assert!(ingested.warnings.is_empty());

        let sheet = ingested.value;
        assert_eq!(sheet.subjects.len(), 2);
        assert_eq!(sheet.subjects[0].status_on(date(1)), AttendanceStatus::Present);
        assert_eq!(sheet.subjects[0].status_on(date(2)), AttendanceStatus::Holiday);
        assert_eq!(sheet.subjects[0].status_on(date(3)), AttendanceStatus::Leave);
        assert_eq!(sheet.subjects[0].status_on(date(4)), AttendanceStatus::Absent);
        assert_eq!(sheet.subjects[1].id, "42");
        assert_eq!(sheet.leave_types, vec![LeaveType::new("Sick"), LeaveType::new("Casual")]);
        assert_eq!(sheet.leave_count("E1", "Sick"), 1);
    }

    #[test]
    fn parses_bare_array() {
        let input = r#"[{"id": "E1", "name": "Ada", "2025-03-05": "√"}]"#;
        let sheet = parse_attendance(input, march(), StatusPolicy::Reject).unwrap().value;
        assert_eq!(sheet.subjects.len(), 1);
        assert!(sheet.leave_types.is_empty());
    }

    #[test]
    fn unknown_status_defaults_to_absent_with_warning() {
        let input = r#"[{"id": "E1", "name": "Ada", "2025-03-05": "X"}]"#;
        let ingested = parse_attendance(input, march(), StatusPolicy::DefaultAbsent).unwrap();
        assert_eq!(ingested.value.subjects[0].marks.get(&date(5)), Some(&AttendanceStatus::Absent));
        assert_eq!(ingested.warnings.len(), 1);
        assert_eq!(ingested.warnings[0].location, "employees[0].2025-03-05");
    }

    #[test]
    fn unknown_status_rejected_in_strict_mode() {
        let input = r#"[{"id": "E1", "name": "Ada", "2025-03-05": "X"}]"#;
        let err = parse_attendance(input, march(), StatusPolicy::Reject).unwrap_err();
        assert!(matches!(err, IngestError::UnknownStatus { ref symbol, .. } if symbol == "X"));
    }

    #[test]
    fn stray_keys_and_foreign_dates_are_reported() {
        let input = r#"[{"id": "E1", "name": "Ada", "department": "HR", "2025-04-01": "√"}]"#;
        let ingested = parse_attendance(input, march(), StatusPolicy::Reject).unwrap();
        assert!(ingested.value.subjects[0].marks.is_empty());
        let locations: Vec<&str> = ingested.warnings.iter().map(|w| w.location.as_str()).collect();
        assert_eq!(locations, vec!["employees[0].2025-04-01", "employees[0].department"]);
    }

    #[test]
    fn missing_id_uses_row_number() {
        let input = r#"[{"name": "Ada"}, {"name": "Grace"}]"#;
        let ingested = parse_attendance(input, march(), StatusPolicy::Reject).unwrap();
        assert_eq!(ingested.value.subjects[1].id, "row-2");
        assert_eq!(ingested.warnings.len(), 2);
    }

    #[test]
    fn duplicate_leave_types_are_dropped() {
        let input = r#"{"employees": [], "leave_types": [{"type": "Sick"}, {"type": "Sick"}, {"type": " "}]}"#;
        let ingested = parse_attendance(input, march(), StatusPolicy::Reject).unwrap();
        assert_eq!(ingested.value.leave_types, vec![LeaveType::new("Sick")]);
        assert_eq!(ingested.warnings.len(), 2);
    }

    #[test]
    fn scalar_input_is_shape_error() {
        let err = parse_attendance("42", march(), StatusPolicy::Reject).unwrap_err();
        assert!(matches!(err, IngestError::Shape(_)));
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = parse_attendance("{", march(), StatusPolicy::Reject).unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }
}
