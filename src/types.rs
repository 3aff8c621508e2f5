use std::borrow::Cow;

/// Columns every request row must carry, in reporting order.
pub const REQUIRED_FIELDS: &[&str] = &[
    "request_id",
    "created_at",
    "requester_name",
    "requester_email",
    "subject",
    "description",
    "priority",
];

/// Columns appended to every processed row.
pub const DERIVED_FIELDS: &[&str] = &[
    "predicted_category",
    "matched_keyword",
    "has_issues",
    "issues_detail",
];

/// One input row. `None` means the column is absent or the cell is null;
/// `Some("")` is a present but empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestRecord {
    pub request_id: Option<String>,
    pub created_at: Option<String>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    /// Pass-through columns, in input order.
    pub extra: Vec<(String, Option<String>)>,
}

impl RequestRecord {
    /// Build a record from a header row and the matching cells.
    /// Cells past the end of a short row are treated as null.
    pub fn from_cells(headers: &[String], cells: Vec<Option<String>>) -> Self {
        let mut record = RequestRecord::default();
        let mut cells = cells.into_iter();
        for header in headers {
            let value = cells.next().flatten();
            match record.slot_mut(header) {
                Some(slot) => *slot = value,
                None => record.extra.push((header.clone(), value)),
            }
        }
        record
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "request_id" => Some(&mut self.request_id),
            "created_at" => Some(&mut self.created_at),
            "requester_name" => Some(&mut self.requester_name),
            "requester_email" => Some(&mut self.requester_email),
            "subject" => Some(&mut self.subject),
            "description" => Some(&mut self.description),
            "priority" => Some(&mut self.priority),
            _ => None,
        }
    }

    /// Value of a named column, required or pass-through.
    pub fn field(&self, name: &str) -> Option<&str> {
        let required = match name {
            "request_id" => &self.request_id,
            "created_at" => &self.created_at,
            "requester_name" => &self.requester_name,
            "requester_email" => &self.requester_email,
            "subject" => &self.subject,
            "description" => &self.description,
            "priority" => &self.priority,
            _ => {
                return self
                    .extra
                    .iter()
                    .find(|(k, _)| k == name)
                    .and_then(|(_, v)| v.as_deref())
            }
        };
        required.as_deref()
    }
}

/// Input table: header order plus one record per data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTable {
    pub headers: Vec<String>,
    pub records: Vec<RequestRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    /// Empty when the catch-all category was assigned.
    pub matched_keyword: String,
}

/// Original record plus the derived classification and validation fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub record: RequestRecord,
    pub predicted_category: String,
    pub matched_keyword: String,
    pub issues: Vec<String>,
}

impl ProcessedRecord {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_issues_label(&self) -> &'static str {
        if self.has_issues() {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn issues_detail(&self) -> String {
        self.issues.join(" | ")
    }

    /// Cell text for an output column. Derived fields shadow input columns of the same name.
    pub fn cell(&self, column: &str) -> Option<Cow<'_, str>> {
        match column {
            "predicted_category" => Some(Cow::Borrowed(self.predicted_category.as_str())),
            "matched_keyword" => Some(Cow::Borrowed(self.matched_keyword.as_str())),
            "has_issues" => Some(Cow::Borrowed(self.has_issues_label())),
            "issues_detail" => Some(Cow::Owned(self.issues_detail())),
            _ => self.record.field(column).map(Cow::Borrowed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KpiValue {
    Count(usize),
    Percent(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpis {
    pub total_requests: usize,
    pub requests_with_issues: usize,
    pub requests_ok: usize,
    pub issue_rate_percent: f64,
}

impl Kpis {
    pub fn from_counts(total: usize, with_issues: usize) -> Self {
        let issue_rate_percent = if total == 0 {
            0.0
        } else {
            (with_issues as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };
        Kpis {
            total_requests: total,
            requests_with_issues: with_issues,
            requests_ok: total - with_issues,
            issue_rate_percent,
        }
    }

    /// (metric, value) pairs in report order.
    pub fn rows(&self) -> [(&'static str, KpiValue); 4] {
        [
            ("total_requests", KpiValue::Count(self.total_requests)),
            ("requests_with_issues", KpiValue::Count(self.requests_with_issues)),
            ("requests_ok", KpiValue::Count(self.requests_ok)),
            ("issue_rate_percent", KpiValue::Percent(self.issue_rate_percent)),
        ]
    }
}

/// Everything one run produces, before it is written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Output column order for the Processed and Issues sheets.
    pub columns: Vec<String>,
    pub processed: Vec<ProcessedRecord>,
    pub category_summary: Vec<CategoryCount>,
    pub kpis: Kpis,
}

impl BatchReport {
    /// Records with at least one issue, in input order.
    pub fn issues(&self) -> impl Iterator<Item = &ProcessedRecord> + Clone {
        self.processed.iter().filter(|p| p.has_issues())
    }
}
