//! Fan-out of alert messages to every registered channel.
//!
//! A broadcast validates its payload, snapshots the registry, and sends to
//! each channel in registry order with no lock held. Channels whose send
//! fails are logged and collected; once the pass completes they are removed
//! from the live registry in one locked step. A pruned channel is never
//! contacted again unless it is re-added.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::channel::{Channel, ChannelKind, WEBHOOK_MAX_VALUES};
use crate::error::{DeliveryError, DispatchError};
use crate::registry::ChannelRegistry;
use crate::transport::ChannelTransport;

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of channels that accepted the payload.
    pub delivered: usize,
    /// Kinds of the channels removed because their send failed, in order.
    pub pruned: Vec<ChannelKind>,
}

impl BroadcastReport {
    /// Whether every targeted channel accepted the payload.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.pruned.is_empty()
    }
}

/// Broadcasts messages to a shared registry of channels.
pub struct NotificationDispatcher {
    registry: Mutex<ChannelRegistry>,
    transport: Arc<dyn ChannelTransport>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with an empty registry.
    #[must_use]
    pub fn new(transport: Arc<dyn ChannelTransport>) -> Self {
        Self {
            registry: Mutex::new(ChannelRegistry::new()),
            transport,
        }
    }

    /// Registers a channel for future broadcasts.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateChannel`] when an equal channel is
    /// already registered, or [`DispatchError::RegistryPoisoned`].
    pub fn add_channel(&self, channel: impl Into<Channel>) -> Result<(), DispatchError> {
        self.lock()?.add(channel.into())
    }

    /// Sends `message` to every channel, or only those of `kind`.
    ///
    /// Delivery failures never reach the caller; the failing channels are
    /// pruned and listed in the returned report.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] for an empty message, in
    /// which case no channel is contacted.
    pub fn broadcast(
        &self,
        message: &str,
        kind: Option<ChannelKind>,
    ) -> Result<BroadcastReport, DispatchError> {
        if message.is_empty() {
            return Err(DispatchError::invalid_argument("message must not be empty"));
        }
        self.fan_out(kind, |channel| {
            channel.send_message(self.transport.as_ref(), message)
        })
    }

    /// Sends an ordered list of values to every channel, or only those of
    /// `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] when the list or any of
    /// its elements is empty.
    pub fn broadcast_values<S: AsRef<str>>(
        &self,
        values: &[S],
        kind: Option<ChannelKind>,
    ) -> Result<BroadcastReport, DispatchError> {
        validate_values(values)?;
        self.fan_out(kind, |channel| {
            channel.send_values(self.transport.as_ref(), values)
        })
    }

    /// Sends `message` to SMS channels only.
    ///
    /// # Errors
    ///
    /// See [`NotificationDispatcher::broadcast`].
    pub fn broadcast_sms(&self, message: &str) -> Result<BroadcastReport, DispatchError> {
        self.broadcast(message, Some(ChannelKind::Sms))
    }

    /// Fires webhook channels with between one and three values.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArgument`] for zero or more than three
    /// values, before any channel is contacted.
    pub fn broadcast_webhook<S: AsRef<str>>(
        &self,
        values: &[S],
    ) -> Result<BroadcastReport, DispatchError> {
        if values.is_empty() || values.len() > WEBHOOK_MAX_VALUES {
            return Err(DispatchError::invalid_argument(
                "webhook broadcasts carry between one and three values",
            ));
        }
        self.broadcast_values(values, Some(ChannelKind::Webhook))
    }

    /// Number of registered channels.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::RegistryPoisoned`].
    pub fn len(&self) -> Result<usize, DispatchError> {
        Ok(self.lock()?.len())
    }

    /// Whether no channel is registered.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::RegistryPoisoned`].
    pub fn is_empty(&self) -> Result<bool, DispatchError> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of the registered channels in broadcast order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::RegistryPoisoned`].
    pub fn channels(&self) -> Result<Vec<Channel>, DispatchError> {
        Ok(self.lock()?.snapshot(None))
    }

    /// Listing of registered channel kinds.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::RegistryPoisoned`].
    pub fn describe(&self) -> Result<String, DispatchError> {
        Ok(self.lock()?.describe())
    }

    fn fan_out<F>(
        &self,
        kind: Option<ChannelKind>,
        send: F,
    ) -> Result<BroadcastReport, DispatchError>
    where
        F: Fn(&Channel) -> Result<(), DeliveryError>,
    {
        let targets = self.lock()?.snapshot(kind);
        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();

        for channel in targets {
            match send(&channel) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        kind = %channel.kind(),
                        error = %error,
                        "notification delivery failed; removing channel"
                    );
                    failed.push(channel);
                }
            }
        }

        if !failed.is_empty() {
            let mut registry = self.lock()?;
            for channel in failed {
                if registry.remove(&channel) {
                    report.pruned.push(channel.kind());
                }
            }
        }

        debug!(
            target: DISPATCH_TARGET,
            delivered = report.delivered,
            pruned = report.pruned.len(),
            "broadcast completed"
        );
        Ok(report)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ChannelRegistry>, DispatchError> {
        self.registry
            .lock()
            .map_err(|_| DispatchError::RegistryPoisoned)
    }
}

fn validate_values<S: AsRef<str>>(values: &[S]) -> Result<(), DispatchError> {
    if values.is_empty() {
        return Err(DispatchError::invalid_argument("values must not be empty"));
    }
    if values.iter().any(|value| value.as_ref().is_empty()) {
        return Err(DispatchError::invalid_argument("values must not contain empty elements"));
    }
    Ok(())
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NotificationDispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for NotificationDispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Ok(listing) => formatter.write_str(&listing),
            Err(error) => write!(formatter, "{error}"),
        }
    }
}
