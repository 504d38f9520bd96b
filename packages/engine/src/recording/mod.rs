// packages/engine/src/recording/mod.rs
//! Call event recording
//!
//! Instrumentation handlers push events describing intercepted calls into a
//! bounded lock-free queue; the host drains them when convenient.
//!
//! ```text
//! intercepted call → record_calls handler → EventQueue → drain() / drain_json()
//! ```

pub mod event_queue;
pub mod recorder;

pub use event_queue::{EventQueue, QueueStats};
pub use recorder::{CallEvent, CallEventType, CallRecorder};
