//! Shared configuration for the home-security controller.
//!
//! The daemon resolves a single [`Config`] value at startup from built-in
//! defaults, `HOMESEC_*` environment variables and command-line flags (in
//! increasing order of precedence). The value is then passed by reference to
//! the listener, the auth guard and the notification bootstrap; nothing in
//! the workspace reads ambient global state.

mod defaults;
mod endpoint;
mod logging;
mod whitelist;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

pub use defaults::{
    DEFAULT_BIND_HOST, DEFAULT_LOG_FILTER, DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_PORT,
    default_log_filter, default_log_format,
};
pub use endpoint::ListenEndpoint;
pub use logging::{LogFormat, LogFormatParseError};
pub use whitelist::{AuthWhitelist, WhitelistError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "homesecd",
    version,
    about = "Home security controller: alarm control plane and alert fan-out"
)]
pub struct Config {
    /// Host or address the control-plane listener binds to.
    #[arg(long, env = "HOMESEC_BIND_HOST", default_value = DEFAULT_BIND_HOST)]
    pub bind_host: String,

    /// Control-plane port; `0` lets the operating system choose.
    #[arg(long, env = "HOMESEC_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Shared-secret token accepted in the `appPassword` header.
    #[arg(long = "app-token", env = "HOMESEC_APP_TOKENS", value_delimiter = ',')]
    pub app_tokens: Vec<String>,

    /// File holding additional accepted tokens, one per line.
    #[arg(long, env = "HOMESEC_APP_TOKEN_FILE")]
    pub app_token_file: Option<PathBuf>,

    /// Two-line SMS credential file (account id, secret).
    #[arg(long, env = "HOMESEC_SMS_CREDENTIALS")]
    pub sms_credentials: Option<PathBuf>,

    /// Two-line webhook credential file (event name, key).
    #[arg(long, env = "HOMESEC_WEBHOOK_CREDENTIALS")]
    pub webhook_credentials: Option<PathBuf>,

    /// Sensor name; ids are assigned from 1 in the order given.
    #[arg(long = "sensor", env = "HOMESEC_SENSORS", value_delimiter = ',')]
    pub sensors: Vec<String>,

    /// Per-connection read deadline in seconds; unset or `0` disables it.
    #[arg(long, env = "HOMESEC_READ_TIMEOUT_SECS")]
    pub read_timeout_secs: Option<u64>,

    /// Deadline for a single outbound notification request, in seconds.
    #[arg(
        long,
        env = "HOMESEC_NOTIFY_TIMEOUT_SECS",
        default_value_t = DEFAULT_NOTIFY_TIMEOUT_SECS
    )]
    pub notify_timeout_secs: u64,

    /// `tracing` filter expression.
    #[arg(long, env = "HOMESEC_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format (`json` or `compact`).
    #[arg(long, env = "HOMESEC_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_owned(),
            port: DEFAULT_PORT,
            app_tokens: Vec::new(),
            app_token_file: None,
            sms_credentials: None,
            webhook_credentials: None,
            sensors: Vec::new(),
            read_timeout_secs: None,
            notify_timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }
}

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line or environment input was rejected.
    #[error(transparent)]
    Cli(#[from] clap::Error),
    /// The token whitelist could not be assembled.
    #[error("failed to load auth whitelist: {0}")]
    Whitelist(#[from] WhitelistError),
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::try_parse()?)
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first item is treated as the binary name, as with
    /// [`std::env::args_os`].
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Endpoint the control-plane listener binds to.
    #[must_use]
    pub fn listen_endpoint(&self) -> ListenEndpoint {
        ListenEndpoint::new(self.bind_host.clone(), self.port)
    }

    /// Builds the token whitelist from inline tokens and the token file.
    pub fn auth_whitelist(&self) -> Result<AuthWhitelist, ConfigError> {
        let mut whitelist = match self.app_token_file.as_deref() {
            Some(path) => AuthWhitelist::from_file(path)?,
            None => AuthWhitelist::default(),
        };
        whitelist.extend(&self.app_tokens);
        Ok(whitelist)
    }

    /// Per-connection read deadline, if one is configured.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Deadline applied to each outbound notification request.
    #[must_use]
    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    /// Path of the SMS credential file, when configured.
    #[must_use]
    pub fn sms_credentials(&self) -> Option<&Path> {
        self.sms_credentials.as_deref()
    }

    /// Path of the webhook credential file, when configured.
    #[must_use]
    pub fn webhook_credentials(&self) -> Option<&Path> {
        self.webhook_credentials.as_deref()
    }

    /// Configured sensor names in id order.
    #[must_use]
    pub fn sensor_names(&self) -> &[String] {
        &self.sensors
    }

    /// Configured `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
