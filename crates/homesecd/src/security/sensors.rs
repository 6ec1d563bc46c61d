//! Configured sensor roster.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// A sensor as reported by `/sensors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sensor {
    /// Id used in `/sensor/{id}/toggle`.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Whether the sensor currently participates in alarm detection.
    pub enabled: bool,
}

/// Ordered set of sensors; ids are assigned from 1 in roster order and
/// every sensor starts enabled.
#[derive(Debug, Default)]
pub struct SensorBank {
    sensors: Mutex<Vec<Sensor>>,
}

impl SensorBank {
    /// Builds a bank from sensor names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sensors = (1..)
            .zip(names)
            .map(|(id, name)| Sensor {
                id,
                name: name.into(),
                enabled: true,
            })
            .collect();
        Self {
            sensors: Mutex::new(sensors),
        }
    }

    /// Whether a sensor with `id` exists.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.lock().iter().any(|sensor| sensor.id == id)
    }

    /// Flips the sensor's enabled flag, returning the toggled sensor.
    pub fn toggle(&self, id: u32) -> Option<Sensor> {
        let mut sensors = self.lock();
        let sensor = sensors.iter_mut().find(|sensor| sensor.id == id)?;
        sensor.enabled = !sensor.enabled;
        Some(sensor.clone())
    }

    /// Copy of the roster in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Sensor> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sensor>> {
        self.sensors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
