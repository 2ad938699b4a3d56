use super::{Event, EventType};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Append-only JSONL event recorder.
///
/// Recording never fails from the caller's point of view: I/O and
/// serialization errors are reported through `tracing` and then discarded.
/// Each event is serialized up front and written with a single `write_all`
/// of one newline-terminated line while holding the recorder lock.
#[derive(Debug)]
pub struct EventRecorder {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EventRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build an event stamped now and append it to the log.
    pub fn record(
        &self,
        event_type: EventType,
        agent: Option<&str>,
        step: Option<&str>,
        message: Option<&str>,
        duration_seconds: Option<f64>,
        extra: Map<String, Value>,
    ) {
        let mut event = Event::now(event_type);
        event.agent = agent.map(str::to_string);
        event.step = step.map(str::to_string);
        event.message = message.map(str::to_string);
        event.duration_seconds = duration_seconds;
        event.extra = extra;
        self.append(&event);
    }

    /// Record an `error` event.
    pub fn record_error(&self, agent: &str, step: &str, message: &str, extra: Map<String, Value>) {
        self.record(
            EventType::Error,
            Some(agent),
            Some(step),
            Some(message),
            None,
            extra,
        );
    }

    /// Append a pre-built event, swallowing any failure.
    pub fn append(&self, event: &Event) {
        if let Err(e) = self.try_append(event) {
            tracing::warn!(path = %self.path.display(), error = %e, "dropping event log write");
        }
    }

    fn try_append(&self, event: &Event) -> Result<()> {
        let mut line = serde_json::to_string(event).context("Failed to serialize event")?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create event log directory")?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open event log")?;
        file.write_all(line.as_bytes())
            .context("Failed to write event log line")?;
        Ok(())
    }
}

/// Read the last `limit` well-formed events from a log. Malformed lines are skipped.
///
/// A missing log reads as empty.
pub fn read_events(path: &Path, limit: usize) -> Result<Vec<Event>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event log: {}", path.display()))?;
    let events: Vec<Event> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    let skip = events.len().saturating_sub(limit);
    Ok(events.into_iter().skip(skip).collect())
}
