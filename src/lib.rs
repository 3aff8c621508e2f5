pub mod classifier;
pub mod error;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod run_log;
pub mod settings;
pub mod types;
pub mod validators;

use error::TriageError;
use models::KeywordTable;
use settings::Settings;

/// Entry point for the binary: resolve settings, run one batch, report where the output went.
pub fn run() -> Result<(), TriageError> {
    let settings = Settings::from_env();
    let keywords = match &settings.keywords_path {
        Some(path) => KeywordTable::from_path(path)?,
        None => KeywordTable::default(),
    };
    tracing::debug!(?settings, categories = keywords.entries().len(), "settings resolved");

    let outcome = pipeline::run(&settings, &keywords).map_err(|e| {
        tracing::error!(error = %e, "run aborted");
        e
    })?;

    println!("Done!");
    println!("Excel report: {}", outcome.report_path.display());
    println!("Logs: {}", outcome.log_path.display());
    Ok(())
}
