use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TriageError};

/// Category assigned when no keyword matches.
pub const FALLBACK_CATEGORY: &str = "Other";

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    (
        "IT",
        &[
            "vpn", "password", "account", "printer", "install", "software", "laptop", "wifi",
            "network", "reset", "login", "uipath",
        ],
    ),
    (
        "HR",
        &[
            "onboarding", "vacation", "payroll", "benefits", "employee", "hiring", "recruit",
            "leave",
        ],
    ),
    (
        "Finance",
        &[
            "invoice", "reimbursement", "tax", "po", "purchase order", "payment", "expense",
            "budget",
        ],
    ),
    (
        "Facilities",
        &[
            "badge", "door", "office", "access card", "building", "entrance", "maintenance",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Ordered category → keyword lookup. Declaration order is the tie-break:
/// the first category, then the first keyword within it, that matches wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable {
    entries: Vec<CategoryKeywords>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        let entries = DEFAULT_TABLE
            .iter()
            .map(|(category, keywords)| CategoryKeywords {
                category: category.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        KeywordTable { entries }
    }
}

impl KeywordTable {
    /// Keywords are lower-cased so they can match lower-cased text; blank ones are dropped.
    pub fn new(entries: Vec<CategoryKeywords>) -> Result<Self> {
        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            let category = entry.category.trim().to_string();
            if category.is_empty() {
                return Err(TriageError::Keywords("category name is empty".to_string()));
            }
            if category == FALLBACK_CATEGORY {
                return Err(TriageError::Keywords(format!(
                    "'{}' is reserved for unmatched requests",
                    FALLBACK_CATEGORY
                )));
            }
            let keywords = entry
                .keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.trim().is_empty())
                .collect();
            normalized.push(CategoryKeywords { category, keywords });
        }
        Ok(KeywordTable { entries: normalized })
    }

    /// Load a JSON array of `{ "category": ..., "keywords": [...] }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CategoryKeywords> =
            serde_json::from_str(json).map_err(|e| TriageError::Keywords(e.to_string()))?;
        Self::new(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| TriageError::Keywords(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[CategoryKeywords] {
        &self.entries
    }
}
