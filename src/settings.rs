use std::path::PathBuf;

const DEFAULT_INPUT: &str = "data/requests.csv";
const DEFAULT_OUTPUT_DIR: &str = "outputs";
const REPORT_FILE: &str = "output_report.xlsx";
const LOG_FILE: &str = "logs.txt";

pub const ENV_INPUT: &str = "TRIAGE_INPUT";
pub const ENV_OUTPUT_DIR: &str = "TRIAGE_OUTPUT_DIR";
pub const ENV_KEYWORDS: &str = "TRIAGE_KEYWORDS";

/// Where a run reads from and writes to. Paths are relative to the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub report_file: String,
    pub log_file: String,
    /// JSON keyword table replacing the built-in one.
    pub keywords_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_file: REPORT_FILE.to_string(),
            log_file: LOG_FILE.to_string(),
            keywords_path: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by `TRIAGE_*` variables (a `.env` file is loaded first if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Settings::default();
        if let Some(v) = non_empty(ENV_INPUT) {
            settings.input_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_OUTPUT_DIR) {
            settings.output_dir = PathBuf::from(v);
        }
        settings.keywords_path = non_empty(ENV_KEYWORDS).map(PathBuf::from);
        settings
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }
}
