//! Daemon bootstrap orchestration.
//!
//! Bootstrap resolves configuration, installs telemetry, builds the
//! whitelist and the notification dispatcher, registers the channels whose
//! credential files are configured, and assembles the security domain. A
//! channel that cannot be set up is reported and skipped; every other
//! failure aborts start-up.

use std::sync::Arc;

use thiserror::Error;

use homesec_config::{AuthWhitelist, Config, ConfigError};
use homesec_notify::{
    Channel, ChannelError, ChannelKind, ChannelTransport, DispatchError, HttpTransport,
    NotificationDispatcher, SmsChannel, TransportError, WebhookChannel,
};

use crate::dispatch::{AuthGuard, DispatchConnectionHandler};
use crate::health::HealthReporter;
use crate::security::{HomeSecurity, MemoryEventLog, SensorBank};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration cannot be resolved.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load()
    }
}

/// Loader that returns an already-resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Supplies the transport used for outbound notifications.
pub trait TransportProvider: Send + Sync {
    /// Builds a transport honouring `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transport cannot be created.
    fn transport(&self, config: &Config) -> Result<Arc<dyn ChannelTransport>, TransportError>;
}

/// Provider backed by [`HttpTransport`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransportProvider;

impl TransportProvider for HttpTransportProvider {
    fn transport(&self, config: &Config) -> Result<Arc<dyn ChannelTransport>, TransportError> {
        Ok(Arc::new(HttpTransport::new(config.notify_timeout())?))
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The token whitelist could not be built.
    #[error("failed to build auth whitelist: {source}")]
    Whitelist {
        /// Underlying configuration error.
        #[source]
        source: ConfigError,
    },
    /// The notification transport could not be created.
    #[error("failed to create notification transport: {source}")]
    Transport {
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

/// A configured channel that was skipped during bootstrap.
#[derive(Debug, Error)]
pub enum ChannelSetupError {
    /// The credential file was unreadable or invalid.
    #[error("{kind} channel not loaded: {source}")]
    Load {
        /// Channel kind being configured.
        kind: ChannelKind,
        /// Underlying channel error.
        #[source]
        source: ChannelError,
    },
    /// The registry refused the channel.
    #[error("{kind} channel not registered: {source}")]
    Register {
        /// Channel kind being configured.
        kind: ChannelKind,
        /// Underlying dispatch error.
        #[source]
        source: DispatchError,
    },
}

impl ChannelSetupError {
    /// Kind of the channel that was skipped.
    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        match self {
            Self::Load { kind, .. } | Self::Register { kind, .. } => *kind,
        }
    }
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    whitelist: AuthWhitelist,
    security: Arc<HomeSecurity>,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Tokens accepted by the control plane.
    #[must_use]
    pub const fn whitelist(&self) -> &AuthWhitelist {
        &self.whitelist
    }

    /// Shared security domain.
    #[must_use]
    pub const fn security(&self) -> &Arc<HomeSecurity> {
        &self.security
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Builds the connection handler serving this daemon's control plane.
    #[must_use]
    pub fn connection_handler(&self) -> DispatchConnectionHandler {
        DispatchConnectionHandler::new(
            AuthGuard::new(self.whitelist.clone()),
            Arc::clone(&self.security),
        )
        .with_read_timeout(self.config.read_timeout())
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration, telemetry, the whitelist
/// or the transport cannot be set up. Each failure is also passed to
/// [`HealthReporter::bootstrap_failed`].
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    provider: &dyn TransportProvider,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let config = loader
        .load()
        .map_err(|source| failed(reporter, BootstrapError::Configuration { source }))?;
    let telemetry = telemetry::initialise(&config)
        .map_err(|source| failed(reporter, BootstrapError::Telemetry { source }))?;
    let whitelist = config
        .auth_whitelist()
        .map_err(|source| failed(reporter, BootstrapError::Whitelist { source }))?;
    if whitelist.is_empty() {
        reporter.whitelist_empty();
    }
    let transport = provider
        .transport(&config)
        .map_err(|source| failed(reporter, BootstrapError::Transport { source }))?;

    let dispatcher = NotificationDispatcher::new(transport);
    register_channels(&config, &dispatcher, reporter);

    let security = HomeSecurity::new(
        SensorBank::new(config.sensor_names()),
        Arc::new(MemoryEventLog::default()),
        Arc::new(dispatcher),
    );
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon {
        config,
        whitelist,
        security: Arc::new(security),
        telemetry,
    })
}

fn failed(reporter: &dyn HealthReporter, error: BootstrapError) -> BootstrapError {
    reporter.bootstrap_failed(&error);
    error
}

fn register_channels(
    config: &Config,
    dispatcher: &NotificationDispatcher,
    reporter: &dyn HealthReporter,
) {
    if let Some(path) = config.sms_credentials() {
        register(dispatcher, reporter, ChannelKind::Sms, || {
            SmsChannel::from_file(path).map(Channel::from)
        });
    }
    if let Some(path) = config.webhook_credentials() {
        register(dispatcher, reporter, ChannelKind::Webhook, || {
            WebhookChannel::from_file(path).map(Channel::from)
        });
    }
}

fn register<F>(
    dispatcher: &NotificationDispatcher,
    reporter: &dyn HealthReporter,
    kind: ChannelKind,
    load: F,
) where
    F: FnOnce() -> Result<Channel, ChannelError>,
{
    let outcome = load()
        .map_err(|source| ChannelSetupError::Load { kind, source })
        .and_then(|channel| {
            dispatcher
                .add_channel(channel)
                .map_err(|source| ChannelSetupError::Register { kind, source })
        });
    match outcome {
        Ok(()) => reporter.channel_registered(kind),
        Err(error) => reporter.channel_rejected(&error),
    }
}
