//! Alarm, sensors and event history behind the control plane.
//!
//! [`HomeSecurity`] ties the domain state to the notification dispatcher.
//! State changes are recorded in the [`EventLog`] and fanned out to the
//! registered channels. A broadcast that cannot run (for example because
//! the registry lock is poisoned) is logged; it never undoes the state
//! change or fails the request.

mod alarm;
mod events;
mod sensors;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use homesec_notify::{DispatchError, NotificationDispatcher};

pub use self::alarm::AlarmState;
pub use self::events::{DEFAULT_EVENT_CAPACITY, Event, EventLog, EventLogError, MemoryEventLog};
pub use self::sensors::{Sensor, SensorBank};

const SECURITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::security");
const EVENTS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::events");

/// Values fanned out by [`HomeSecurity::trigger_test_alert`].
pub const TEST_ALERT_VALUES: [&str; 2] = ["TEST", "Test alarm activation."];

/// Number of events returned by `/notify`.
pub const RECENT_EVENT_LIMIT: usize = 10;

/// Errors raised by security operations.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Recording or reading events failed.
    #[error(transparent)]
    EventLog(#[from] EventLogError),
}

/// Domain state served by the control plane.
pub struct HomeSecurity {
    alarm: AlarmState,
    sensors: SensorBank,
    events: Arc<dyn EventLog>,
    notifier: Arc<NotificationDispatcher>,
}

impl HomeSecurity {
    /// Creates a disarmed system over the given collaborators.
    #[must_use]
    pub fn new(
        sensors: SensorBank,
        events: Arc<dyn EventLog>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            alarm: AlarmState::default(),
            sensors,
            events,
            notifier,
        }
    }

    /// Whether the alarm is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.alarm.is_armed()
    }

    /// Flips the armed state, records it and notifies every channel.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::EventLog`] when the event cannot be stored.
    /// The state has already changed at that point.
    pub fn toggle_alarm(&self, origin: &str) -> Result<bool, SecurityError> {
        let armed = self.alarm.toggle();
        let message = if armed {
            format!("Alarm armed ({origin})")
        } else {
            format!("Alarm disarmed ({origin})")
        };
        self.report_broadcast(self.notifier.broadcast(&message, None));
        self.events.record(false, &message)?;
        Ok(armed)
    }

    /// Fans a test alert out to every channel.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::EventLog`] when the event cannot be stored.
    pub fn trigger_test_alert(&self) -> Result<(), SecurityError> {
        self.report_broadcast(self.notifier.broadcast_values(&TEST_ALERT_VALUES, None));
        self.events.record(false, "Test alarm triggered")?;
        Ok(())
    }

    /// Flips a sensor and returns its new enabled state, or `None` when no
    /// sensor has `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::EventLog`] when the event cannot be stored.
    pub fn toggle_sensor(&self, id: u32) -> Result<Option<bool>, SecurityError> {
        let Some(sensor) = self.sensors.toggle(id) else {
            return Ok(None);
        };
        let state = if sensor.enabled { "enabled" } else { "disabled" };
        let info = format!("Sensor {} ({}) {state}", sensor.name, sensor.id);
        self.events.record(true, &info)?;
        Ok(Some(sensor.enabled))
    }

    /// Current sensor roster.
    #[must_use]
    pub fn sensors(&self) -> Vec<Sensor> {
        self.sensors.snapshot()
    }

    /// Sensor roster used for route resolution.
    #[must_use]
    pub const fn sensor_bank(&self) -> &SensorBank {
        &self.sensors
    }

    /// Newest events first.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::EventLog`] when the log cannot be read.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<Event>, SecurityError> {
        Ok(self.events.recent(limit)?)
    }

    /// Dispatcher used for alert fan-out.
    #[must_use]
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.notifier
    }

    fn report_broadcast<T>(&self, outcome: Result<T, DispatchError>) {
        if let Err(error) = outcome {
            warn!(
                target: SECURITY_TARGET,
                error = %error,
                armed = self.alarm.is_armed(),
                "alert broadcast skipped"
            );
        }
    }
}
