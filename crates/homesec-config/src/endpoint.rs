use std::fmt;

use serde::{Deserialize, Serialize};

/// TCP endpoint the control-plane listener binds to.
///
/// A port of `0` asks the operating system to pick a free port; the bound
/// port is reported by the listener once it is running.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListenEndpoint {
    host: String,
    port: u16,
}

impl ListenEndpoint {
    /// Builds a TCP endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address to bind.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Requested port; `0` means OS-assigned.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns a copy of this endpoint with the port replaced.
    #[must_use]
    pub fn with_port(&self, port: u16) -> Self {
        Self::new(self.host.clone(), port)
    }
}

impl fmt::Display for ListenEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}
