//! Event webhook channel.

use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};
use url::Url;

use super::{ChannelKind, is_path_safe, read_credential_pair};
use crate::error::{ChannelError, DeliveryError};
use crate::transport::{ChannelTransport, OutboundRequest};

const WEBHOOK_BASE: &str = "https://maker.ifttt.com";
const KEY_LEN: usize = 22;

/// Largest number of values a webhook event carries.
pub const WEBHOOK_MAX_VALUES: usize = 3;

/// Channel firing a named webhook event with up to three values.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookChannel {
    event: String,
    key: String,
}

impl WebhookChannel {
    /// Builds a channel for a non-empty event name and 22-character key.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::InvalidCredential`] when the event is empty,
    /// either value contains characters unsafe in a URL path, or the key has
    /// the wrong length.
    pub fn new(event: impl Into<String>, key: impl Into<String>) -> Result<Self, ChannelError> {
        let event = event.into();
        let key = key.into();
        if event.is_empty() {
            return Err(ChannelError::invalid(ChannelKind::Webhook, "event name must not be empty"));
        }
        if !is_path_safe(&event) {
            return Err(ChannelError::invalid(
                ChannelKind::Webhook,
                "event name may only contain letters, digits, '-' and '_'",
            ));
        }
        if key.len() != KEY_LEN || !is_path_safe(&key) {
            return Err(ChannelError::invalid(
                ChannelKind::Webhook,
                "key must be 22 URL-safe characters",
            ));
        }
        Ok(Self { event, key })
    }

    /// Loads the channel from a two-line file: event name, then key.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the file is unreadable, does not have
    /// exactly two lines, or holds invalid credentials.
    pub fn from_file(path: &Path) -> Result<Self, ChannelError> {
        let (event, key) = read_credential_pair(ChannelKind::Webhook, path)?;
        Self::new(event, key)
    }

    /// Event name fired by this channel.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    pub(super) fn send_message(
        &self,
        transport: &dyn ChannelTransport,
        message: &str,
    ) -> Result<(), DeliveryError> {
        self.send_values(transport, &[message])
    }

    pub(super) fn send_values<S: AsRef<str>>(
        &self,
        transport: &dyn ChannelTransport,
        values: &[S],
    ) -> Result<(), DeliveryError> {
        if values.is_empty() || values.iter().any(|value| value.as_ref().is_empty()) {
            return Err(DeliveryError::EmptyPayload {
                kind: ChannelKind::Webhook,
            });
        }
        if values.len() > WEBHOOK_MAX_VALUES {
            return Err(DeliveryError::TooManyValues {
                kind: ChannelKind::Webhook,
                count: values.len(),
                max: WEBHOOK_MAX_VALUES,
            });
        }

        let request = OutboundRequest::PostJson {
            url: self.url()?,
            body: event_body(values),
        };
        let status = transport.execute(&request)?;
        if status == 200 {
            Ok(())
        } else {
            Err(DeliveryError::Rejected {
                kind: ChannelKind::Webhook,
                status,
                reason: "unexpected status",
            })
        }
    }

    fn url(&self) -> Result<Url, DeliveryError> {
        let raw = format!(
            "{WEBHOOK_BASE}/trigger/{}/with/key/{}",
            self.event, self.key
        );
        Url::parse(&raw).map_err(|source| DeliveryError::Url {
            kind: ChannelKind::Webhook,
            source,
        })
    }
}

/// Builds `{"value1": .., "value2": .., ...}` for the supplied values.
fn event_body<S: AsRef<str>>(values: &[S]) -> Value {
    let fields: Map<String, Value> = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            (
                format!("value{}", index + 1),
                Value::String(value.as_ref().to_owned()),
            )
        })
        .collect();
    Value::Object(fields)
}

impl fmt::Debug for WebhookChannel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("WebhookChannel")
            .field("event", &self.event)
            .field("key", &"<redacted>")
            .finish()
    }
}
