mod keyword_table;

pub use keyword_table::{CategoryKeywords, KeywordTable, FALLBACK_CATEGORY};
