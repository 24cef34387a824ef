//! Event Logger - persists coordinator events to a JSONL file
//!
//! One JSON object per line: `{"ts": ..., "clock": ..., "event": {...}}`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::{CoordinatorEvent, EventLogEntry};

/// Appends coordinator events to a JSONL file
pub struct EventLogger {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl EventLogger {
    /// Open (or create) the log file for appending, creating parent directories
    pub fn create(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "EventLogger::create: called");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of events written by this logger
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write one event stamped with the host clock
    pub fn write_event(&mut self, clock: f64, event: &CoordinatorEvent) -> eyre::Result<()> {
        let entry = EventLogEntry::new(clock, event.clone());
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read entries back from an event log
///
/// A missing file yields no entries; malformed lines are skipped.
pub fn read_event_log(path: impl AsRef<Path>) -> eyre::Result<Vec<EventLogEntry>> {
    let path = path.as_ref();
    debug!(?path, "read_event_log: reading log file");

    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EventLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line, error = %e, "read_event_log: failed to parse line");
            }
        }
    }

    debug!(count = entries.len(), "read_event_log: loaded entries");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchResult, SdkError};
    use crate::events::types::{MatchCompleted, SdkInitialized};
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read_back() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("logs").join("events.jsonl");

        let mut logger = EventLogger::create(&path).unwrap();
        logger
            .write_event(
                0.0,
                &SdkInitialized {
                    success: true,
                    error: SdkError::none(),
                }
                .into(),
            )
            .unwrap();
        logger
            .write_event(
                2.5,
                &MatchCompleted {
                    result: MatchResult::scored("m-1", 1200, 800),
                    error: SdkError::none(),
                }
                .into(),
            )
            .unwrap();
        assert_eq!(logger.written(), 2);

        let entries = read_event_log(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event_type(), "Initialized");
        assert_eq!(entries[1].event.event_type(), "MatchCompleted");
        assert_eq!(entries[1].clock, 2.5);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.jsonl");
        let event: CoordinatorEvent = SdkInitialized {
            success: true,
            error: SdkError::none(),
        }
        .into();

        EventLogger::create(&path).unwrap().write_event(0.0, &event).unwrap();
        EventLogger::create(&path).unwrap().write_event(1.0, &event).unwrap();

        assert_eq!(read_event_log(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("events.jsonl");

        let mut logger = EventLogger::create(&path).unwrap();
        logger
            .write_event(
                0.0,
                &SdkInitialized {
                    success: true,
                    error: SdkError::none(),
                }
                .into(),
            )
            .unwrap();
        drop(logger);

        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("not json\n\n");
        fs::write(&path, content).unwrap();

        assert_eq!(read_event_log(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_read_nonexistent() {
        let temp = tempdir().unwrap();
        let entries = read_event_log(temp.path().join("missing.jsonl")).unwrap();
        assert!(entries.is_empty());
    }
}
