//! Alert fan-out for the home-security daemon.
//!
//! The `homesec-notify` crate owns the notification side of `homesecd`: the
//! [`Channel`] model with its credential loaders, the ordered
//! [`ChannelRegistry`], and the [`NotificationDispatcher`] that broadcasts a
//! message to every registered channel.
//!
//! Delivery is fault-isolated. A channel whose send fails is logged and
//! removed from the registry; the broadcast continues with the remaining
//! channels and the caller only ever sees a [`BroadcastReport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use homesec_notify::{HttpTransport, NotificationDispatcher, SmsChannel};
//!
//! let transport = HttpTransport::new(Duration::from_secs(30)).expect("http client");
//! let dispatcher = NotificationDispatcher::new(Arc::new(transport));
//! let channel = SmsChannel::new("12345678", "abcdefghijklmn").expect("credentials");
//! dispatcher.add_channel(channel).expect("register channel");
//! let report = dispatcher.broadcast("Alarm armed (web)", None).expect("broadcast");
//! println!("delivered to {} channel(s)", report.delivered);
//! ```

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod transport;

#[cfg(test)]
mod tests;

pub use self::channel::{Channel, ChannelKind, SmsChannel, WEBHOOK_MAX_VALUES, WebhookChannel};
pub use self::dispatcher::{BroadcastReport, NotificationDispatcher};
pub use self::error::{ChannelError, DeliveryError, DispatchError, TransportError};
pub use self::registry::ChannelRegistry;
pub use self::transport::{ChannelTransport, HttpTransport, OutboundRequest};
