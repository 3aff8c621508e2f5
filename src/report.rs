//! Multi-sheet Excel report. Sheet order: Processed, Issues, CategorySummary, KPIs.

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::path::Path;

use crate::error::{Result, TriageError};
use crate::types::{BatchReport, CategoryCount, KpiValue, Kpis, ProcessedRecord};

pub const SHEET_PROCESSED: &str = "Processed";
pub const SHEET_ISSUES: &str = "Issues";
pub const SHEET_CATEGORY_SUMMARY: &str = "CategorySummary";
pub const SHEET_KPIS: &str = "KPIs";

/// Drop characters that are not allowed in sheet XML (control chars except tab, newline, CR).
/// Everything else, markup characters included, is written as-is and escaped by the writer.
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let u = c as u32;
            c == '\t' || c == '\n' || c == '\r' || !(u < 0x20 || u == 0xFFFE || u == 0xFFFF)
        })
        .collect()
}

/// Estimate column width from text length (char count × 1.2, clamped 10–50).
fn estimate_text_width(text: &str) -> f64 {
    let w = text.chars().count() as f64 * 1.2;
    w.clamp(10.0, 50.0)
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF))
}

fn write_header(worksheet: &mut Worksheet, headers: &[&str], widths: &[f64]) -> std::result::Result<(), XlsxError> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, sanitize_cell(header), &format)?;
    }
    for (col, &w) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, w)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Processed/Issues layout: one column per output field, one row per record.
fn records_sheet<'a>(
    name: &str,
    columns: &[String],
    records: impl Iterator<Item = &'a ProcessedRecord> + Clone,
) -> std::result::Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(name)?;

    let mut widths: Vec<f64> = columns.iter().map(|c| estimate_text_width(c)).collect();
    for record in records.clone() {
        for (col, column) in columns.iter().enumerate() {
            if let Some(value) = record.cell(column) {
                widths[col] = widths[col].max(estimate_text_width(&value));
            }
        }
    }
    let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
    write_header(&mut worksheet, &headers, &widths)?;

    let text_format = Format::new().set_align(FormatAlign::Top);
    for (row_idx, record) in records.enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, column) in columns.iter().enumerate() {
            // Null cells stay blank.
            if let Some(value) = record.cell(column) {
                worksheet.write_string_with_format(row, col as u16, sanitize_cell(&value), &text_format)?;
            }
        }
    }
    Ok(worksheet)
}

fn category_sheet(summary: &[CategoryCount]) -> std::result::Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_CATEGORY_SUMMARY)?;
    let width = summary
        .iter()
        .map(|c| estimate_text_width(&c.category))
        .fold(estimate_text_width("category"), f64::max);
    write_header(&mut worksheet, &["category", "count"], &[width, 10.0])?;
    for (i, entry) in summary.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, sanitize_cell(&entry.category))?;
        worksheet.write_number(row, 1, entry.count as f64)?;
    }
    Ok(worksheet)
}

fn kpi_sheet(kpis: &Kpis) -> std::result::Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(SHEET_KPIS)?;
    write_header(&mut worksheet, &["metric", "value"], &[estimate_text_width("requests_with_issues"), 12.0])?;
    let count_format = Format::new().set_num_format("0");
    let percent_format = Format::new().set_num_format("0.00");
    for (i, (metric, value)) in kpis.rows().iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, *metric)?;
        match value {
            KpiValue::Count(n) => worksheet.write_number_with_format(row, 1, *n as f64, &count_format)?,
            KpiValue::Percent(p) => worksheet.write_number_with_format(row, 1, *p, &percent_format)?,
        };
    }
    Ok(worksheet)
}

fn build_workbook(report: &BatchReport) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(records_sheet(SHEET_PROCESSED, &report.columns, report.processed.iter())?);
    workbook.push_worksheet(records_sheet(SHEET_ISSUES, &report.columns, report.issues())?);
    workbook.push_worksheet(category_sheet(&report.category_summary)?);
    workbook.push_worksheet(kpi_sheet(&report.kpis)?);
    Ok(workbook)
}

/// Write the full report, replacing any previous file. The workbook is saved next to
/// the target first and renamed into place, so readers never see a partial file.
pub fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let mut workbook = build_workbook(report).map_err(|e| TriageError::Report(e.to_string()))?;
    let temp_path = path.with_extension("tmp.xlsx");
    if let Err(e) = workbook.save(&temp_path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(TriageError::Report(format!("Cannot write to file: {}", e)));
    }
    std::fs::rename(&temp_path, path).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("being used") {
            TriageError::Report("Please close the file in Excel first.".to_string())
        } else {
            TriageError::Report(format!("Replace file: {}", msg))
        }
    })?;
    tracing::debug!(path = %path.display(), "report written");
    Ok(())
}
