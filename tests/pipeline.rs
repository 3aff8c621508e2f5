use calamine::{open_workbook_auto, DataType, Reader};
use pretty_assertions::assert_eq;
use std::path::Path;

use request_triage_lib::error::TriageError;
use request_triage_lib::models::KeywordTable;
use request_triage_lib::pipeline::run_with_paths;

const HEADER: &str = "request_id,created_at,requester_name,requester_email,subject,description,priority,channel";

/// Sheet name → rows of cell text.
fn read_report(path: &Path) -> Vec<(String, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let names = workbook.sheet_names().to_vec();
    names
        .into_iter()
        .map(|name| {
            let range = workbook.worksheet_range(&name).unwrap();
            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(|c| c.as_string().unwrap_or_default()).collect())
                .collect();
            (name, rows)
        })
        .collect()
}

fn write_input(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("requests.csv");
    std::fs::write(&path, format!("{}\n{}", HEADER, body)).unwrap();
    path
}

fn strip_timestamps(log: &str) -> Vec<String> {
    log.lines()
        .map(|l| {
            assert!(l.starts_with('['), "{}", l);
            l[22..].to_string()
        })
        .collect()
}

#[test]
fn test_end_to_end_report_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "R1,2024-05-01,Ana,bad-email,VPN issue,cannot connect,Urgent,email\n\
         R2,2024-05-02,Ben,ben@corp.com,Invoice copy,need the March invoice,Low,portal\n\
         R3,2024-05-03,,cy@corp.com,Hello,just checking in,Medium,phone\n",
    );
    let out = dir.path().join("outputs");

    let outcome = run_with_paths(&input, &out, &KeywordTable::default()).unwrap();
    assert_eq!(outcome.kpis.total_requests, 3);
    assert_eq!(outcome.kpis.requests_with_issues, 2);
    assert_eq!(outcome.kpis.issue_rate_percent, 66.67);

    let sheets = read_report(&outcome.report_path);
    let names: Vec<&str> = sheets.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Processed", "Issues", "CategorySummary", "KPIs"]);

    let processed = &sheets[0].1;
    assert_eq!(
        processed[0],
        vec![
            "request_id",
            "created_at",
            "requester_name",
            "requester_email",
            "subject",
            "description",
            "priority",
            "channel",
            "predicted_category",
            "matched_keyword",
            "has_issues",
            "issues_detail",
        ]
    );
    assert_eq!(processed.len(), 4);
    assert_eq!(processed[1][7], "email");
    assert_eq!(&processed[1][8..], &["IT", "vpn", "Yes", "Invalid email format | Invalid priority (must be Low/Medium/High)"]);
    assert_eq!(&processed[2][8..], &["Finance", "invoice", "No", ""]);
    assert_eq!(&processed[3][8..], &["Other", "", "Yes", "Missing fields: requester_name"]);

    let issues = &sheets[1].1;
    let issue_ids: Vec<&str> = issues[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(issue_ids, vec!["R1", "R3"]);

    assert_eq!(
        sheets[2].1,
        vec![
            vec!["category", "count"],
            vec!["IT", "1"],
            vec!["Finance", "1"],
            vec!["Other", "1"],
        ]
    );
    assert_eq!(
        sheets[3].1,
        vec![
            vec!["metric", "value"],
            vec!["total_requests", "3"],
            vec!["requests_with_issues", "2"],
            vec!["requests_ok", "1"],
            vec!["issue_rate_percent", "66.67"],
        ]
    );

    let log = std::fs::read_to_string(&outcome.log_path).unwrap();
    assert_eq!(
        strip_timestamps(&log),
        vec![
            "START processing 3 requests".to_string(),
            "ISSUE R1: Invalid email format | Invalid priority (must be Low/Medium/High)".to_string(),
            "ISSUE R3: Missing fields: requester_name".to_string(),
            format!("DONE. Output: {}", outcome.report_path.display()),
            "KPIs: total=3, issues=2, ok=1".to_string(),
        ]
    );
}

#[test]
fn test_rerun_is_identical_and_resets_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "R1,2024-05-01,Ana,ana@corp.com,Badge,lost my badge,High,email\n\
         R2,2024-05-02,Ben,ben,Leave,annual leave request,Low,portal\n",
    );
    let out = dir.path().join("outputs");

    let first = run_with_paths(&input, &out, &KeywordTable::default()).unwrap();
    let first_sheets = read_report(&first.report_path);
    let second = run_with_paths(&input, &out, &KeywordTable::default()).unwrap();
    let second_sheets = read_report(&second.report_path);

    assert_eq!(first_sheets, second_sheets);
    let log = std::fs::read_to_string(&second.log_path).unwrap();
    assert_eq!(log.lines().filter(|l| l.contains("START")).count(), 1);
    assert!(!out.join("output_report.tmp.xlsx").exists());
}

#[test]
fn test_empty_input_writes_zero_kpis() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "");
    let out = dir.path().join("outputs");

    let outcome = run_with_paths(&input, &out, &KeywordTable::default()).unwrap();
    let sheets = read_report(&outcome.report_path);
    assert_eq!(sheets[0].1.len(), 1);
    assert_eq!(sheets[1].1.len(), 1);
    assert_eq!(sheets[2].1, vec![vec!["category", "count"]]);
    assert_eq!(
        sheets[3].1[1..].to_vec(),
        vec![
            vec!["total_requests", "0"],
            vec!["requests_with_issues", "0"],
            vec!["requests_ok", "0"],
            vec!["issue_rate_percent", "0"],
        ]
    );
}

#[test]
fn test_missing_input_aborts_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("outputs");
    let missing = dir.path().join("nope.csv");

    let err = run_with_paths(&missing, &out, &KeywordTable::default()).unwrap_err();
    assert!(matches!(err, TriageError::MissingInput(ref p) if p == &missing));
    assert!(!out.join("output_report.xlsx").exists());
    // The log was reset before the input check and nothing was written to it.
    assert_eq!(std::fs::read_to_string(out.join("logs.txt")).unwrap(), "");
}

#[test]
fn test_missing_required_column_reported_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.csv");
    std::fs::write(
        &path,
        "request_id,requester_email,subject,description\nR9,a@b.com,Wifi,slow\n",
    )
    .unwrap();
    let out = dir.path().join("outputs");

    let outcome = run_with_paths(&path, &out, &KeywordTable::default()).unwrap();
    let sheets = read_report(&outcome.report_path);
    let row = &sheets[0].1[1];
    assert_eq!(row[0], "R9");
    assert_eq!(
        row[7],
        "Missing fields: created_at, requester_name, priority | Invalid priority (must be Low/Medium/High)"
    );
}

#[test]
fn test_spreadsheet_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, h) in HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, h).unwrap();
    }
    let values = ["R1", "2024-05-01", "Ana", "ana@corp.com", "Office", "door broken", "High"];
    for (col, v) in values.iter().enumerate() {
        sheet.write_string(1, col as u16, *v).unwrap();
    }
    workbook.save(&path).unwrap();
    let out = dir.path().join("outputs");

    let outcome = run_with_paths(&path, &out, &KeywordTable::default()).unwrap();
    let sheets = read_report(&outcome.report_path);
    let row = &sheets[0].1[1];
    // channel cell was never written, so it is null and stays blank.
    assert_eq!(&row[7..], &["", "Facilities", "door", "No", ""]);
}

#[test]
fn test_spreadsheet_date_and_boolean_cells_are_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, h) in HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, h).unwrap();
    }
    let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
    let created = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 5, 1).unwrap();
    sheet.write_string(1, 0, "R1").unwrap();
    sheet.write_datetime_with_format(1, 1, &created, &date_format).unwrap();
    let rest = ["Ana", "ana@corp.com", "Printer", "out of toner", "Low"];
    for (i, v) in rest.iter().enumerate() {
        sheet.write_string(1, (i + 2) as u16, *v).unwrap();
    }
    sheet.write_boolean(1, 7, true).unwrap();
    workbook.save(&path).unwrap();
    let out = dir.path().join("outputs");

    let outcome = run_with_paths(&path, &out, &KeywordTable::default()).unwrap();
    assert_eq!(outcome.kpis.requests_with_issues, 0);
    let sheets = read_report(&outcome.report_path);
    let row = &sheets[0].1[1];
    assert_eq!(row[1], "2024-05-01 00:00:00");
    assert_eq!(&row[7..], &["true", "IT", "printer", "No", ""]);
}

#[test]
fn test_duplicate_columns_pass_through_separately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("requests.csv");
    std::fs::write(
        &path,
        "request_id,created_at,requester_name,requester_email,subject,description,priority,note,note\n\
         R1,2024-05-01,Ana,ana@corp.com,Hello,just checking in,Low,first,second\n",
    )
    .unwrap();
    let out = dir.path().join("outputs");

    let outcome = run_with_paths(&path, &out, &KeywordTable::default()).unwrap();
    let sheets = read_report(&outcome.report_path);
    assert_eq!(&sheets[0].1[0][7..9], &["note", "note.1"]);
    assert_eq!(&sheets[0].1[1][7..], &["first", "second", "Other", "", "No", ""]);
}
