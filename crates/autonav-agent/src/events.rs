//! Append-only event log.
//!
//! Timestamped diagnostic lines for offline inspection; the agent never
//! reads them back.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one timestamped line. Failures are logged at warn level, not
    /// propagated.
    pub fn emit(&self, message: &str) {
        if let Err(err) = self.append(message) {
            tracing::warn!("event log write failed: {}", err);
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        writeln!(file, "{} {}", Utc::now().to_rfc3339(), message)
    }
}
