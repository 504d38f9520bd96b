// packages/engine/src/recording/event_queue.rs
//! Bounded lock-free call event queue
//!
//! Pushing never blocks an intercepted call: when the queue is full the event
//! is handed back and counted as dropped.

use crate::recording::recorder::CallEvent;
use crate::utils::errors::{EngineError, Result};
use crossbeam::queue::ArrayQueue;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free MPMC queue of call events
pub struct EventQueue {
    queue: ArrayQueue<CallEvent>,
    pushed: AtomicU64,
    popped: AtomicU64,
    dropped: AtomicU64,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::bounded)
            .ok_or_else(|| EngineError::InvalidArgument("Event queue capacity cannot be 0".to_string()))
    }

    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.get()),
            pushed: AtomicU64::new(0),
            popped: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Push an event, returning it back if the queue is full
    pub fn push(&self, event: CallEvent) -> std::result::Result<(), CallEvent> {
        match self.queue.push(event) {
            Ok(()) => {
                self.pushed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(event) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(event)
            }
        }
    }

    pub fn try_pop(&self) -> Option<CallEvent> {
        let event = self.queue.pop()?;
        self.popped.fetch_add(1, Ordering::Relaxed);
        Some(event)
    }

    /// Pop everything currently queued, oldest first
    pub fn drain(&self) -> Vec<CallEvent> {
        std::iter::from_fn(|| self.try_pop()).collect()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.pushed.load(Ordering::Relaxed),
            pop_count: self.popped.load(Ordering::Relaxed),
            drop_count: self.dropped.load(Ordering::Relaxed),
            current_size: self.queue.len(),
            capacity: self.queue.capacity(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Queue statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Events accepted
    pub push_count: u64,

    /// Events popped
    pub pop_count: u64,

    /// Events rejected because the queue was full
    pub drop_count: u64,

    pub current_size: usize,

    pub capacity: usize,
}

impl QueueStats {
    pub fn fill_percentage(&self) -> f64 {
        (self.current_size as f64 / self.capacity as f64) * 100.0
    }

    /// Dropped events as a percentage of all push attempts
    pub fn drop_rate(&self) -> f64 {
        let attempts = self.push_count + self.drop_count;
        if attempts == 0 {
            0.0
        } else {
            (self.drop_count as f64 / attempts as f64) * 100.0
        }
    }
}
