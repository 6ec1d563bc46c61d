//! Event history consumed by the `/notify` endpoint.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::EVENTS_TARGET;

/// Default number of events kept by [`MemoryEventLog`].
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// A recorded security event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Monotonic id, starting at 1.
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub time: u64,
    /// Whether the event concerns a sensor rather than the alarm itself.
    pub related_to_sensor: bool,
    /// Human-readable description.
    pub info: String,
}

/// Errors raised by event storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventLogError {
    /// The event description was empty.
    #[error("event information must not be empty")]
    EmptyInfo,
    /// The storage backend could not be reached.
    #[error("event storage unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// Storage seam for security events.
pub trait EventLog: Send + Sync {
    /// Appends an event and returns the stored record.
    fn record(&self, related_to_sensor: bool, info: &str) -> Result<Event, EventLogError>;

    /// Returns at most `limit` events, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<Event>, EventLogError>;
}

/// Bounded in-memory event log. The oldest event is evicted once the
/// capacity is reached.
#[derive(Debug)]
pub struct MemoryEventLog {
    capacity: usize,
    state: Mutex<LogState>,
}

#[derive(Debug)]
struct LogState {
    next_id: u64,
    events: VecDeque<Event>,
}

impl MemoryEventLog {
    /// Creates a log holding at most `capacity` events (minimum one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(LogState {
                next_id: 1,
                events: VecDeque::with_capacity(capacity),
            }),
        }
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, related_to_sensor: bool, info: &str) -> Result<Event, EventLogError> {
        if info.is_empty() {
            return Err(EventLogError::EmptyInfo);
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let event = Event {
            id: state.next_id,
            time: now_millis(),
            related_to_sensor,
            info: info.to_owned(),
        };
        state.next_id += 1;
        if state.events.len() == self.capacity {
            state.events.pop_front();
        }
        state.events.push_back(event.clone());
        info!(
            target: EVENTS_TARGET,
            id = event.id,
            related_to_sensor,
            info,
            "security event recorded"
        );
        Ok(event)
    }

    fn recent(&self, limit: usize) -> Result<Vec<Event>, EventLogError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state.events.iter().rev().take(limit).cloned().collect())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}
