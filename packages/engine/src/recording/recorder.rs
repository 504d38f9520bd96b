// packages/engine/src/recording/recorder.rs
//! Call recorder

use crate::recording::event_queue::{EventQueue, QueueStats};
use crate::utils::config::RecordingConfig;
use crate::utils::errors::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use tracing::{debug, info};

/// A recorded interception event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEvent {
    /// Unique event ID (ULID)
    pub id: String,

    /// Capability path the handler was registered at
    pub path: String,

    pub event_type: CallEventType,

    pub timestamp: DateTime<Utc>,

    /// Event payload (arguments, result summary, error message)
    pub data: serde_json::Value,

    /// Call duration (microseconds), set on completion events
    pub duration_us: Option<u64>,
}

impl CallEvent {
    pub fn new(path: impl Into<String>, event_type: CallEventType, data: serde_json::Value) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            path: path.into(),
            event_type,
            timestamp: Utc::now(),
            data,
            duration_us: None,
        }
    }

    pub fn with_duration_us(mut self, duration_us: u64) -> Self {
        self.duration_us = Some(duration_us);
        self
    }
}

/// Event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallEventType {
    CallStarted,
    CallCompleted,
    CallFailed,
    AttributeRead,
}

/// Collects call events from instrumentation handlers
pub struct CallRecorder {
    queue: EventQueue,
}

impl CallRecorder {
    pub fn new(config: &RecordingConfig) -> Result<Self> {
        if config.queue_capacity == 0 {
            return Err(EngineError::ConfigError(
                "Recorder queue capacity cannot be 0".to_string(),
            ));
        }

        info!("Initializing call recorder (capacity {})", config.queue_capacity);
        Ok(Self {
            queue: EventQueue::new(config.queue_capacity)?,
        })
    }

    /// Record an event; fails if the queue is full
    pub fn record(&self, event: CallEvent) -> Result<()> {
        debug!("Recording {:?} for {}", event.event_type, event.path);
        self.queue
            .push(event)
            .map_err(|_| EngineError::RecordingFailed("Event queue full".to_string()))
    }

    /// Take all recorded events, oldest first
    pub fn drain(&self) -> Vec<CallEvent> {
        self.queue.drain()
    }

    /// Take all recorded events as a pretty-printed JSON array
    pub fn drain_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.drain())?)
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for CallRecorder {
    fn default() -> Self {
        Self {
            queue: EventQueue::bounded(
                NonZeroUsize::new(RecordingConfig::default().queue_capacity).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_and_drain() {
        let recorder = CallRecorder::default();
        recorder
            .record(CallEvent::new("m:f()", CallEventType::CallStarted, json!({"args": []})))
            .unwrap();
        recorder
            .record(
                CallEvent::new("m:f()", CallEventType::CallCompleted, json!({})).with_duration_us(12),
            )
            .unwrap();

        assert_eq!(recorder.len(), 2);
        let events = recorder.drain();
        assert_eq!(events[0].event_type, CallEventType::CallStarted);
        assert_eq!(events[1].duration_us, Some(12));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_full_recorder_errors() {
        let recorder = CallRecorder::new(&RecordingConfig { queue_capacity: 1 }).unwrap();
        recorder
            .record(CallEvent::new("a", CallEventType::AttributeRead, json!(null)))
            .unwrap();

        let err = recorder
            .record(CallEvent::new("b", CallEventType::AttributeRead, json!(null)))
            .unwrap_err();
        assert!(matches!(err, EngineError::RecordingFailed(_)));
        assert_eq!(recorder.stats().drop_count, 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(CallRecorder::new(&RecordingConfig { queue_capacity: 0 }).is_err());
    }

    #[test]
    fn test_drain_json() {
        let recorder = CallRecorder::default();
        recorder
            .record(CallEvent::new("m:f()", CallEventType::CallFailed, json!({"error": "boom"})))
            .unwrap();

        let exported = recorder.drain_json().unwrap();
        assert!(exported.contains("\"call_failed\""));
        assert!(exported.contains("m:f()"));

        let parsed: Vec<CallEvent> = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id.len(), 26);
    }
}
