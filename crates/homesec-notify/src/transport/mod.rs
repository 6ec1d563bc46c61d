//! Wire seam between channels and the network.
//!
//! Channels build an [`OutboundRequest`] and interpret the returned status;
//! a [`ChannelTransport`] only executes the request. Production code uses
//! [`HttpTransport`]; tests substitute a recording transport.

use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::error::TransportError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A provider call produced by a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundRequest {
    /// Plain `GET` with all parameters in the URL.
    Get {
        /// Fully-built request URL.
        url: Url,
    },
    /// `POST` with a JSON body.
    PostJson {
        /// Fully-built request URL.
        url: Url,
        /// JSON document sent as the request body.
        body: serde_json::Value,
    },
}

impl OutboundRequest {
    /// Target URL of the request.
    #[must_use]
    pub const fn url(&self) -> &Url {
        match self {
            Self::Get { url } | Self::PostJson { url, .. } => url,
        }
    }
}

/// Executes outbound requests on behalf of channels.
pub trait ChannelTransport: Send + Sync {
    /// Executes `request` and returns the provider's HTTP status code.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    fn execute(&self, request: &OutboundRequest) -> Result<u16, TransportError>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client cannot be
    /// initialised (for example when no TLS backend is available).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl ChannelTransport for HttpTransport {
    fn execute(&self, request: &OutboundRequest) -> Result<u16, TransportError> {
        let response = match request {
            OutboundRequest::Get { url } => self.client.get(url.clone()).send()?,
            OutboundRequest::PostJson { url, body } => {
                self.client.post(url.clone()).json(body).send()?
            }
        };
        Ok(response.status().as_u16())
    }
}
