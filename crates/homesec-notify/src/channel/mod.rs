//! Notification channels and their credentials.
//!
//! A [`Channel`] is a configured destination for alert messages. Every kind
//! supports both send operations: a single message and an ordered list of
//! values. Identity is value-based, so two channels carrying the same
//! credentials compare equal and cannot both be registered.

mod sms;
mod webhook;

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ChannelError, DeliveryError};
use crate::transport::ChannelTransport;

pub use self::sms::SmsChannel;
pub use self::webhook::{WEBHOOK_MAX_VALUES, WebhookChannel};

/// Capability variant of a channel, used for filtered broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Single-message channel (SMS gateway).
    Sms,
    /// Multi-value channel (event webhook).
    Webhook,
}

impl ChannelKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Webhook => "webhook",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A registered notification destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// SMS gateway channel.
    Sms(SmsChannel),
    /// Event webhook channel.
    Webhook(WebhookChannel),
}

impl Channel {
    /// Kind tag used for filtered broadcasts.
    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        match self {
            Self::Sms(_) => ChannelKind::Sms,
            Self::Webhook(_) => ChannelKind::Webhook,
        }
    }

    /// Sends a single message through this channel.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the payload is refused, the request
    /// cannot be built, the transport fails or the provider rejects it.
    pub fn send_message(
        &self,
        transport: &dyn ChannelTransport,
        message: &str,
    ) -> Result<(), DeliveryError> {
        match self {
            Self::Sms(channel) => channel.send_message(transport, message),
            Self::Webhook(channel) => channel.send_message(transport, message),
        }
    }

    /// Sends an ordered list of values through this channel.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] under the same conditions as
    /// [`Channel::send_message`], and when a webhook receives more than
    /// [`WEBHOOK_MAX_VALUES`] values.
    pub fn send_values<S: AsRef<str>>(
        &self,
        transport: &dyn ChannelTransport,
        values: &[S],
    ) -> Result<(), DeliveryError> {
        match self {
            Self::Sms(channel) => channel.send_values(transport, values),
            Self::Webhook(channel) => channel.send_values(transport, values),
        }
    }
}

impl From<SmsChannel> for Channel {
    fn from(channel: SmsChannel) -> Self {
        Self::Sms(channel)
    }
}

impl From<WebhookChannel> for Channel {
    fn from(channel: WebhookChannel) -> Self {
        Self::Webhook(channel)
    }
}

/// Reads a two-line credential file.
fn read_credential_pair(kind: ChannelKind, path: &Path) -> Result<(String, String), ChannelError> {
    let contents = fs::read_to_string(path).map_err(|source| ChannelError::Read {
        kind,
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    let lines: Vec<&str> = contents.lines().collect();
    match lines.as_slice() {
        [first, second] => Ok((first.trim().to_owned(), second.trim().to_owned())),
        other => Err(ChannelError::FileFormat {
            kind,
            path: path.to_path_buf(),
            expected: 2,
            found: other.len(),
        }),
    }
}

/// Characters allowed in credential values that end up in a URL path.
fn is_path_safe(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests;
