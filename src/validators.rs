//! Per-record field checks. Nothing here fails: problems come back as data.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::RequestRecord;

pub const ALLOWED_PRIORITIES: &[&str] = &["Low", "Medium", "High"];

pub const INVALID_EMAIL: &str = "Invalid email format";
pub const INVALID_PRIORITY: &str = "Invalid priority (must be Low/Medium/High)";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

/// Required fields that are absent, null, or blank after trimming. Order follows `required`.
pub fn missing_fields<'a>(record: &RequestRecord, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| record.field(name).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

pub fn email_valid(value: Option<&str>) -> bool {
    match value {
        Some(v) => email_re().is_match(v.trim()),
        None => false,
    }
}

/// Exact, case-sensitive match against [`ALLOWED_PRIORITIES`] after trimming.
pub fn priority_valid(value: Option<&str>) -> bool {
    value.map_or(false, |v| ALLOWED_PRIORITIES.contains(&v.trim()))
}

/// Human-readable issues for one record: missing fields, then email, then priority.
pub fn collect_issues(record: &RequestRecord, required: &[&str]) -> Vec<String> {
    let mut issues = Vec::new();
    let missing = missing_fields(record, required);
    if !missing.is_empty() {
        issues.push(format!("Missing fields: {}", missing.join(", ")));
    }
    if !email_valid(record.requester_email.as_deref()) {
        issues.push(INVALID_EMAIL.to_string());
    }
    if !priority_valid(record.priority.as_deref()) {
        issues.push(INVALID_PRIORITY.to_string());
    }
    issues
}
