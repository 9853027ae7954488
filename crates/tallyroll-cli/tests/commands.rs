//! CLI integration tests
//!
//! ## Exit Code Contract
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Every requested export was written |
//! | 1 | An export failed, or the input could not be read |

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ATTENDANCE: &str = r##"{
    "employees": [
        {"employee_id": "E1", "name": "Ada Lovelace", "2025-03-03": "√", "2025-03-04": "/"},
        {"employee_id": "E2", "name": "Grace Hopper", "2025-03-03": "#"}
    ],
    "leave_types": [{"type": "Sick"}, {"type": "Casual"}],
    "leave_counts": {"E1": {"Sick": 1}}
}"##;

const WORK_LOGS: &str = r#"[
    {"user_id": 1, "date": "2025-03-03", "type": "Embankment", "status": "completed", "file": "rfi/1.pdf"},
    {"user_id": 2, "date": "2025-03-03", "type": "Structure", "status": "new"},
    {"user_id": 1, "date": "2025-03-10 08:30:00", "type": "Pavement", "status": "completed"},
    {"user_id": 3, "date": "", "type": "Pavement", "status": "completed"}
]"#;

fn tallyroll() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tallyroll"));
    cmd.env_remove("TALLYROLL_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to execute tallyroll")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// attendance
// =============================================================================

#[test]
fn attendance_exports_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "attendance.json", ATTENDANCE);
    let out = dir.path().join("exports");

    let output = run(tallyroll()
        .args(["attendance"])
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--out-dir"])
        .arg(&out));

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(out.join("Monthly_Attendance_2025_03.xlsx").exists());
    assert!(out.join("Monthly_Attendance_2025_03.pdf").exists());
    let printed = stdout(&output);
    assert!(printed.contains("Monthly_Attendance_2025_03.xlsx"));
    assert!(printed.contains("Monthly_Attendance_2025_03.pdf"));
}

#[test]
fn attendance_single_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "attendance.json", ATTENDANCE);

    let output = run(tallyroll()
        .arg("attendance")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "pdf", "--out-dir"])
        .arg(dir.path()));

    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("Monthly_Attendance_2025_03.pdf").exists());
    assert!(!dir.path().join("Monthly_Attendance_2025_03.xlsx").exists());
}

#[test]
fn attendance_text_grid() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "attendance.json", ATTENDANCE);

    let output = run(tallyroll()
        .arg("attendance")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "text"]));

    assert_eq!(output.status.code(), Some(0));
    let printed = stdout(&output);
    assert!(printed.starts_with("Monthly Attendance Report - March 2025"));
    assert!(printed.contains("Ada Lovelace"));
    assert!(printed.contains("▼▼√/▼"));
}

#[test]
fn attendance_empty_input_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "attendance.json", r#"{"employees": []}"#);

    let output = run(tallyroll()
        .arg("attendance")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--out-dir"])
        .arg(dir.path()));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: Failed to generate Excel report"));
    assert!(stderr.contains("error: Failed to generate PDF report"));
}

#[test]
fn attendance_unknown_status_depends_on_strict() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "attendance.json",
        r#"[{"employee_id": "E1", "name": "Ada", "2025-03-03": "X"}]"#,
    );

    let lenient = run(tallyroll()
        .arg("attendance")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "text"]));
    assert_eq!(lenient.status.code(), Some(0));

    let strict = run(tallyroll()
        .arg("attendance")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "text", "--strict"]));
    assert_eq!(strict.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&strict.stderr).contains("Unknown attendance status"));
}

#[test]
fn attendance_missing_input_exits_1() {
    let output = run(tallyroll().args([
        "attendance",
        "/nonexistent/attendance.json",
        "--year",
        "2025",
        "--month",
        "3",
    ]));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn invalid_month_is_rejected() {
    let output = run(tallyroll().args(["schema", "--year", "2025", "--month", "13"]));
    assert!(!output.status.success());
}

// =============================================================================
// daily-work
// =============================================================================

#[test]
fn daily_work_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "logs.json", WORK_LOGS);

    let output = run(tallyroll()
        .arg("daily-work")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "json"]));

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["rows"].as_array().unwrap().len(), 2);
    assert_eq!(report["rows"][0]["date"], "2025-03-10");
    assert_eq!(report["totals"]["total"], 3);
    assert_eq!(report["totals"]["completed"], 2);
    assert_eq!(report["unassigned"], 1);
    assert_eq!(report["trend"], "improving");
}

#[test]
fn daily_work_text_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "logs.json", WORK_LOGS);

    let output = run(tallyroll()
        .arg("daily-work")
        .arg(&input)
        .args(["--year", "2025", "--month", "3"]));

    assert_eq!(output.status.code(), Some(0));
    let printed = stdout(&output);
    assert!(printed.contains("Daily Work Summary - March 2025"));
    assert!(printed.contains("50.0% AVERAGE"));
    assert!(printed.contains("Unassigned records: 1"));
}

#[test]
fn daily_work_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "logs.json", WORK_LOGS);

    let output = run(tallyroll()
        .arg("daily-work")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "xlsx", "--out-dir"])
        .arg(dir.path()));

    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("Daily_Work_Summary_2025_03.xlsx").exists());
}

// =============================================================================
// schema + config
// =============================================================================

#[test]
fn schema_lists_every_column() {
    let output = run(tallyroll().args([
        "schema",
        "--year",
        "2025",
        "--month",
        "4",
        "--leave-type",
        "Sick",
        "--leave-type",
        "Casual",
    ]));

    assert_eq!(output.status.code(), Some(0));
    let printed = stdout(&output);
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 2 + 30 + 2);
    assert!(lines[0].starts_with("sl"));
    assert!(lines[1].starts_with("name"));
    assert!(lines[33].starts_with("leave:Casual"));
    // 5 April 2025 is a Saturday
    assert!(lines[2 + 4].starts_with("2025-04-05") && lines[2 + 4].ends_with("weekend"));
}

#[test]
fn config_file_sets_weekend_and_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixture(
        dir.path(),
        "tallyroll.toml",
        "[calendar]\nweekend = [\"Fri\"]\n\n[export]\noutput_dir = \"from-config\"\n",
    );

    let output = run(tallyroll()
        .arg("--config")
        .arg(&config)
        .args(["schema", "--year", "2025", "--month", "4"]));
    let printed = stdout(&output);
    let friday = printed.lines().find(|l| l.starts_with("2025-04-04")).unwrap();
    let saturday = printed.lines().find(|l| l.starts_with("2025-04-05")).unwrap();
    assert!(friday.ends_with("weekend"));
    assert!(!saturday.ends_with("weekend"));

    let input = write_fixture(dir.path(), "attendance.json", ATTENDANCE);
    let output = run(tallyroll()
        .current_dir(dir.path())
        .env("TALLYROLL_CONFIG", &config)
        .arg("attendance")
        .arg(&input)
        .args(["--year", "2025", "--month", "3", "--format", "xlsx"]));
    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("from-config/Monthly_Attendance_2025_03.xlsx").exists());
}
