//! Domain errors raised by channel construction, dispatch and delivery.
//!
//! Validation and registry errors ([`ChannelError`], [`DispatchError`]) are
//! returned to callers. Delivery errors ([`DeliveryError`]) are produced by a
//! single channel send and consumed by the dispatcher, which logs them and
//! prunes the channel; they never reach a broadcast caller.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::channel::ChannelKind;

/// Errors raised while building a channel from credentials.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A credential value failed validation.
    #[error("invalid {kind} credentials: {reason}")]
    InvalidCredential {
        /// Channel kind being configured.
        kind: ChannelKind,
        /// Which rule the credential broke.
        reason: &'static str,
    },

    /// The credential file could not be read.
    #[error("failed to read {kind} credential file '{path}': {source}")]
    Read {
        /// Channel kind being configured.
        kind: ChannelKind,
        /// Credential file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The credential file does not have the expected line count.
    #[error("{kind} credential file '{path}' must have {expected} lines, found {found}")]
    FileFormat {
        /// Channel kind being configured.
        kind: ChannelKind,
        /// Credential file path.
        path: PathBuf,
        /// Required number of lines.
        expected: usize,
        /// Number of lines present.
        found: usize,
    },
}

impl ChannelError {
    pub(crate) const fn invalid(kind: ChannelKind, reason: &'static str) -> Self {
        Self::InvalidCredential { kind, reason }
    }
}

/// Errors returned by registry and broadcast operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The broadcast payload failed validation; no channel was contacted.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: &'static str,
    },

    /// A value-equal channel is already registered.
    #[error("a {kind} channel with the same credentials is already registered")]
    DuplicateChannel {
        /// Kind of the rejected channel.
        kind: ChannelKind,
    },

    /// The registry lock was poisoned by a panicking thread.
    #[error("notification registry lock poisoned")]
    RegistryPoisoned,
}

impl DispatchError {
    pub(crate) const fn invalid_argument(message: &'static str) -> Self {
        Self::InvalidArgument { message }
    }
}

/// Failure of a single channel send.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel refused an empty payload.
    #[error("{kind} channel refused an empty payload")]
    EmptyPayload {
        /// Channel kind.
        kind: ChannelKind,
    },

    /// The channel accepts fewer values than were supplied.
    #[error("{kind} channel accepts at most {max} values, got {count}")]
    TooManyValues {
        /// Channel kind.
        kind: ChannelKind,
        /// Number of values supplied.
        count: usize,
        /// Maximum accepted by the channel.
        max: usize,
    },

    /// The provider answered with a non-success status.
    #[error("{kind} provider answered {status}: {reason}")]
    Rejected {
        /// Channel kind.
        kind: ChannelKind,
        /// HTTP status returned by the provider.
        status: u16,
        /// Interpretation of the status.
        reason: &'static str,
    },

    /// The outbound request URL could not be built.
    #[error("failed to build {kind} request: {source}")]
    Url {
        /// Channel kind.
        kind: ChannelKind,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The request never produced a provider response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure executing an outbound request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client failed to build or send the request.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The destination could not be reached.
    #[error("destination unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl TransportError {
    /// Creates an unavailable-destination error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests;
