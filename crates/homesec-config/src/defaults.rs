use crate::logging::LogFormat;

/// Host the control-plane listener binds to by default.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default TCP port for the control-plane listener.
pub const DEFAULT_PORT: u16 = 8080;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Seconds an outbound notification request may take before it is abandoned.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the daemon.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
