use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for run-log messages. Implementations add their own timestamp.
pub trait LogSink {
    fn line(&mut self, message: &str);
}

/// In-memory sink, used where the messages matter but the file does not.
impl LogSink for Vec<String> {
    fn line(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// `[YYYY-MM-DD HH:MM:SS]` in local time.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Run log file, truncated when opened and flushed when dropped.
pub struct RunLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RunLog {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(RunLog {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl LogSink for RunLog {
    fn line(&mut self, message: &str) {
        if let Err(e) = writeln!(self.writer, "[{}] {}", timestamp(), message) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not write run log line");
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
