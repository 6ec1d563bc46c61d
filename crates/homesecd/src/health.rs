//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;

use homesec_config::Config;
use homesec_notify::ChannelKind;

use crate::bootstrap::{BootstrapError, ChannelSetupError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the whitelist is empty and every request will be refused.
    fn whitelist_empty(&self);

    /// Invoked after a notification channel joins the registry.
    fn channel_registered(&self, kind: ChannelKind);

    /// Invoked when a configured channel could not be set up.
    fn channel_rejected(&self, error: &ChannelSetupError);

    /// Invoked once the control-plane listener accepts connections.
    fn listener_ready(&self, address: SocketAddr);

    /// Invoked after the listener has stopped.
    fn listener_stopped(&self);
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            endpoint = %config.listen_endpoint(),
            sensors = config.sensor_names().len(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn whitelist_empty(&self) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "whitelist_empty",
            "no app tokens configured; every request will be answered 401"
        );
    }

    fn channel_registered(&self, kind: ChannelKind) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "channel_registered",
            channel = %kind,
            "notification channel ready"
        );
    }

    fn channel_rejected(&self, error: &ChannelSetupError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "channel_rejected",
            channel = %error.kind(),
            error = %error,
            "notification channel skipped"
        );
    }

    fn listener_ready(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            address = %address,
            port = address.port(),
            "control plane listening"
        );
    }

    fn listener_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_stopped",
            "control plane stopped"
        );
    }
}
