//! Run telemetry.
//!
//! Every agent call, failure and evaluation is appended as one JSON object per
//! line to a durable event log. The log is append-only: events are never
//! rewritten or deleted, and their order is the order of appends.

mod logger;

pub use logger::{EventRecorder, read_events};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default location of the event log, relative to the working directory.
pub const DEFAULT_EVENT_LOG: &str = "logs/events.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AgentRun,
    Error,
    Evaluation,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::AgentRun => write!(f, "agent_run"),
            EventType::Error => write!(f, "error"),
            EventType::Evaluation => write!(f, "evaluation"),
        }
    }
}

/// One structured telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Wall-clock time of the append, in fractional unix seconds.
    pub timestamp: f64,
    pub event_type: EventType,
    pub agent: Option<String>,
    pub step: Option<String>,
    pub message: Option<String>,
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Create an event stamped with the current wall-clock time.
    pub fn now(event_type: EventType) -> Self {
        Self {
            timestamp: unix_seconds(),
            event_type,
            agent: None,
            step: None,
            message: None,
            duration_seconds: None,
            extra: Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.event_type == EventType::Error
    }
}

fn unix_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
