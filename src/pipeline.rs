//! Batch orchestration: load → validate → classify → aggregate → export.

use std::path::{Path, PathBuf};

use crate::classifier::classify;
use crate::error::Result;
use crate::input::load_requests;
use crate::models::KeywordTable;
use crate::report::write_report;
use crate::run_log::{LogSink, RunLog};
use crate::settings::Settings;
use crate::types::{
    BatchReport, CategoryCount, Kpis, ProcessedRecord, RequestTable, DERIVED_FIELDS, REQUIRED_FIELDS,
};
use crate::validators::collect_issues;

/// Where a successful run left its output.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub report_path: PathBuf,
    pub log_path: PathBuf,
    pub kpis: Kpis,
}

/// Validate and classify every record, in input order, and compute the summaries.
/// Emits `START` and one `ISSUE` line per record with issues.
pub fn process(table: RequestTable, keywords: &KeywordTable, log: &mut impl LogSink) -> BatchReport {
    let RequestTable { headers, records } = table;
    log.line(&format!("START processing {} requests", records.len()));
    tracing::info!(requests = records.len(), "processing started");

    let mut processed = Vec::with_capacity(records.len());
    for record in records {
        let issues = collect_issues(&record, REQUIRED_FIELDS);
        let classification = classify(keywords, record.subject.as_deref(), record.description.as_deref());
        let out = ProcessedRecord {
            record,
            predicted_category: classification.category,
            matched_keyword: classification.matched_keyword,
            issues,
        };
        let id = out
            .record
            .request_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("(no id)");
        if out.has_issues() {
            log.line(&format!("ISSUE {}: {}", id, out.issues_detail()));
            tracing::warn!(request_id = id, issues = %out.issues_detail(), "request has issues");
        }
        tracing::debug!(
            request_id = id,
            category = %out.predicted_category,
            keyword = %out.matched_keyword,
            "request classified"
        );
        processed.push(out);
    }

    let with_issues = processed.iter().filter(|p| p.has_issues()).count();
    BatchReport {
        columns: output_columns(&headers),
        category_summary: category_summary(&processed),
        kpis: Kpis::from_counts(processed.len(), with_issues),
        processed,
    }
}

/// Input headers in order, then any derived field the input did not already name.
fn output_columns(headers: &[String]) -> Vec<String> {
    let mut columns = headers.to_vec();
    for derived in DERIVED_FIELDS {
        if !columns.iter().any(|c| c == derived) {
            columns.push(derived.to_string());
        }
    }
    columns
}

/// Count per category, most frequent first; ties keep first-seen order.
fn category_summary(processed: &[ProcessedRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for p in processed {
        match counts.iter_mut().find(|c| c.category == p.predicted_category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: p.predicted_category.clone(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// File-backed run. The log is reset before the input is checked; a missing
/// input aborts with no report written.
pub fn run(settings: &Settings, keywords: &KeywordTable) -> Result<RunOutcome> {
    std::fs::create_dir_all(&settings.output_dir)?;
    let report_path = settings.report_path();
    let log_path = settings.log_path();

    let mut log = RunLog::create(&log_path)?;
    let table = load_requests(&settings.input_path)?;
    let report = process(table, keywords, &mut log);
    write_report(&report_path, &report)?;

    let k = report.kpis;
    log.line(&format!("DONE. Output: {}", report_path.display()));
    log.line(&format!(
        "KPIs: total={}, issues={}, ok={}",
        k.total_requests, k.requests_with_issues, k.requests_ok
    ));
    log.flush()?;
    tracing::info!(
        total = k.total_requests,
        issues = k.requests_with_issues,
        issue_rate = k.issue_rate_percent,
        "processing finished"
    );

    Ok(RunOutcome {
        report_path,
        log_path: log.path().to_path_buf(),
        kpis: k,
    })
}

/// Convenience for callers that only have an input path and an output directory.
pub fn run_with_paths(input: &Path, output_dir: &Path, keywords: &KeywordTable) -> Result<RunOutcome> {
    let settings = Settings {
        input_path: input.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        ..Settings::default()
    };
    run(&settings, keywords)
}
