//! Loading the request table from disk. CSV by default, spreadsheets via calamine.

use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;

use crate::error::{Result, TriageError};
use crate::types::{RequestRecord, RequestTable};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Read the whole table into memory. A missing file is the one fatal condition.
pub fn load_requests(path: &Path) -> Result<RequestTable> {
    if !path.exists() {
        return Err(TriageError::MissingInput(path.to_path_buf()));
    }
    let table = if is_spreadsheet(path) {
        read_spreadsheet(path)?
    } else {
        read_csv(path)?
    };
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.records.len(),
        "loaded request table"
    );
    Ok(table)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Repeated header names get a `.1`, `.2`, ... suffix so every column stays addressable.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for name in headers {
        let mut candidate = name.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{}.{}", name, n);
            n += 1;
        }
        out.push(candidate);
    }
    out
}

fn read_csv(path: &Path) -> Result<RequestTable> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| TriageError::Input(format!("Could not open CSV file: {}", e)))?;
    read_csv_from(reader)
}

/// Cells that are not valid UTF-8 are decoded lossily instead of failing the batch.
fn read_csv_from<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RequestTable> {
    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| TriageError::Input(format!("Could not read header row: {}", e)))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    let headers = dedupe_headers(headers);

    let mut records = Vec::new();
    for (i, row) in reader.byte_records().enumerate() {
        // +2: 1-based, plus the header line
        let row = row.map_err(|e| TriageError::Input(format!("Row {}: {}", i + 2, e)))?;
        if row.iter().any(|c| std::str::from_utf8(c).is_err()) {
            tracing::warn!(row = i + 2, "row is not valid UTF-8, decoding lossily");
        }
        let cells = row
            .iter()
            .map(|c| Some(String::from_utf8_lossy(c).into_owned()))
            .collect();
        records.push(RequestRecord::from_cells(&headers, cells));
    }
    Ok(RequestTable { headers, records })
}

/// Text of a spreadsheet cell; `None` for an empty cell.
/// Dates use the same `%Y-%m-%d %H:%M:%S` layout as the run log.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(_) | Data::Float(_) => cell.as_string(),
        Data::DateTime(_) => Some(
            cell.as_datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| cell.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// First worksheet, first row as header. Empty cells are null.
fn read_spreadsheet(path: &Path) -> Result<RequestTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| TriageError::Input(format!("Could not open Excel file: {}", e)))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| TriageError::Input("Workbook has no sheets.".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TriageError::Input(format!("Sheet not found: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|c| cell_text(c).unwrap_or_default().trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    // Trailing blank header cells are formatting leftovers, not columns.
    let mut width = headers.len();
    while width > 0 && headers[width - 1].is_empty() {
        width -= 1;
    }
    let headers = dedupe_headers(headers.into_iter().take(width).collect());

    let records = rows
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .map(|row| {
            let cells = row.iter().take(width).map(cell_text).collect();
            RequestRecord::from_cells(&headers, cells)
        })
        .collect();
    Ok(RequestTable { headers, records })
}
