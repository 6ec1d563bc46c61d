//! Path routing for the control plane.
//!
//! Fixed endpoints are matched exactly. The one parameterised family is
//! `/sensor/{id}/{action}`, where `id` must be a decimal sensor id present in
//! the live roster and `toggle` is the only action.

use super::errors::RouteError;
use crate::security::SensorBank;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

const SENSOR_PREFIX: &str = "/sensor/";

/// Resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/alarm`: read the armed state.
    Alarm,
    /// `/alarm/toggle`: flip the armed state.
    AlarmToggle,
    /// `/alarm/test`: fan out a test alert.
    AlarmTest,
    /// `/notify`: recent events.
    Notify,
    /// `/sensors`: sensor roster.
    Sensors,
    /// `/sensor/{id}/toggle`.
    SensorToggle {
        /// Sensor id from the path.
        id: u32,
    },
}

/// Live sensor lookup used to validate `/sensor/{id}` paths.
pub trait SensorDirectory {
    /// Whether a sensor with `id` exists.
    fn has_sensor(&self, id: u32) -> bool;
}

impl SensorDirectory for SensorBank {
    fn has_sensor(&self, id: u32) -> bool {
        self.contains(id)
    }
}

/// Maps request paths to routes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Router;

impl Router {
    /// Resolves `path` against the endpoint table.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] for unknown paths, non-numeric or
    /// unknown sensor ids, and unsupported sensor actions.
    pub fn route(path: &str, sensors: &dyn SensorDirectory) -> Result<Route, RouteError> {
        match path {
            "/alarm" => Ok(Route::Alarm),
            "/alarm/toggle" => Ok(Route::AlarmToggle),
            "/alarm/test" => Ok(Route::AlarmTest),
            "/notify" => Ok(Route::Notify),
            "/sensors" => Ok(Route::Sensors),
            _ => path
                .strip_prefix(SENSOR_PREFIX)
                .and_then(|rest| route_sensor(rest, sensors))
                .ok_or_else(|| RouteError::not_found(path)),
        }
    }
}

fn route_sensor(rest: &str, sensors: &dyn SensorDirectory) -> Option<Route> {
    let (raw_id, action) = rest.split_once('/')?;
    let id = parse_sensor_id(raw_id)?;
    if !sensors.has_sensor(id) {
        return None;
    }
    match action {
        "toggle" => Some(Route::SensorToggle { id }),
        _ => None,
    }
}

fn parse_sensor_id(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
