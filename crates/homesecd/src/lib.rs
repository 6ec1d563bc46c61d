//! Home-security controller daemon.
//!
//! The daemon keeps the alarm, sensor and event state of a home-security
//! system and exposes it over a minimal HTTP/1.0 control plane. Every
//! request must carry a whitelisted token in the `appPassword` header.
//! State changes are fanned out to the notification channels registered
//! through [`homesec_notify`].
//!
//! Start-up runs in two stages. [`bootstrap_with`] resolves configuration,
//! installs telemetry and assembles the domain; the process layer then binds
//! the listener, serves connections on worker threads and waits for a
//! termination signal. Health hooks emit a structured event at each stage.

mod bootstrap;
pub mod dispatch;
mod health;
mod process;
pub mod security;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ChannelSetupError, ConfigLoader, Daemon, HttpTransportProvider,
    StaticConfigLoader, SystemConfigLoader, TransportProvider, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
