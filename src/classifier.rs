use crate::models::{KeywordTable, FALLBACK_CATEGORY};
use crate::types::Classification;

/// First-match keyword classification over `"<subject> <description>"`, lower-cased.
/// Missing text counts as empty.
pub fn classify(table: &KeywordTable, subject: Option<&str>, description: Option<&str>) -> Classification {
    let text = format!("{} {}", subject.unwrap_or(""), description.unwrap_or("")).to_lowercase();
    for entry in table.entries() {
        if let Some(keyword) = entry.keywords.iter().find(|kw| text.contains(kw.as_str())) {
            return Classification {
                category: entry.category.clone(),
                matched_keyword: keyword.clone(),
            };
        }
    }
    Classification {
        category: FALLBACK_CATEGORY.to_string(),
        matched_keyword: String::new(),
    }
}
