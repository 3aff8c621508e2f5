//! Print every sheet of a report workbook, one tab-separated line per row.
//!
//! Usage: `dump_report [path]` (defaults to the configured report path).

use calamine::{open_workbook_auto, DataType, Reader};
use request_triage_lib::settings::Settings;
use std::path::{Path, PathBuf};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Settings::from_env().report_path());

    if let Err(e) = dump(&path) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dump(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()));
    }
    let mut workbook = open_workbook_auto(path).map_err(|e| format!("Could not open Excel file: {}", e))?;
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| format!("Sheet not found: {}", e))?;
        println!("== {} ({} rows)", name, range.height());
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.as_string().unwrap_or_default()).collect();
            println!("{}", cells.join("\t"));
        }
    }
    Ok(())
}
