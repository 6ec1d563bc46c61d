//! Ordered set of registered notification channels.
//!
//! The [`ChannelRegistry`] keeps channels in registration order and rejects
//! a channel equal to one already present. Removal happens only through the
//! dispatcher when a delivery fails.

use tracing::info;

use crate::channel::{Channel, ChannelKind};
use crate::error::DispatchError;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Channels registered for broadcast.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `channel` at the end of the broadcast order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateChannel`] when an equal channel is
    /// already registered.
    pub fn add(&mut self, channel: Channel) -> Result<(), DispatchError> {
        if self.contains(&channel) {
            return Err(DispatchError::DuplicateChannel {
                kind: channel.kind(),
            });
        }
        info!(
            target: REGISTRY_TARGET,
            kind = %channel.kind(),
            position = self.channels.len(),
            "notification channel registered"
        );
        self.channels.push(channel);
        Ok(())
    }

    /// Removes the channel equal to `channel`, returning whether one was found.
    pub(crate) fn remove(&mut self, channel: &Channel) -> bool {
        let before = self.channels.len();
        self.channels.retain(|existing| existing != channel);
        self.channels.len() != before
    }

    /// Whether an equal channel is registered.
    #[must_use]
    pub fn contains(&self, channel: &Channel) -> bool {
        self.channels.contains(channel)
    }

    /// Copies the channels, optionally keeping only one kind.
    #[must_use]
    pub fn snapshot(&self, kind: Option<ChannelKind>) -> Vec<Channel> {
        self.channels
            .iter()
            .filter(|channel| kind.is_none_or(|wanted| channel.kind() == wanted))
            .cloned()
            .collect()
    }

    /// Iterates the channels in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    /// Number of registered channels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Human-readable listing of the registered channel kinds.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut listing = String::from("Currently active notification channels:\n");
        for channel in &self.channels {
            listing.push_str(" - ");
            listing.push_str(channel.kind().as_str());
            listing.push('\n');
        }
        listing
    }
}
