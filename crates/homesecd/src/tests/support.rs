//! Shared doubles for the daemon test suites.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use homesec_config::Config;
use homesec_notify::{
    ChannelKind, ChannelTransport, NotificationDispatcher, OutboundRequest, TransportError,
    WebhookChannel,
};

use crate::bootstrap::{BootstrapError, ChannelSetupError, TransportProvider};
use crate::health::HealthReporter;
use crate::security::{HomeSecurity, MemoryEventLog, SensorBank};

pub(crate) const WEBHOOK_KEY: &str = "abcdefghijklmnopqrstuv";

/// Transport that records requests instead of contacting providers.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingTransport {
    /// Makes every request whose URL contains `marker` fail.
    pub(crate) fn fail_when_url_contains(&self, marker: &str) {
        self.failing
            .lock()
            .expect("failing lock")
            .push(marker.to_owned());
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Text carried by each request sent to `marker`, in order.
    ///
    /// SMS requests report their `msg` parameter; webhook requests report
    /// their values ordered by key and joined by `|`.
    pub(crate) fn payloads_to(&self, marker: &str) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|request| request.url().as_str().contains(marker))
            .map(payload_text)
            .collect()
    }
}

impl ChannelTransport for RecordingTransport {
    fn execute(&self, request: &OutboundRequest) -> Result<u16, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let url = request.url().as_str();
        let failing = self.failing.lock().expect("failing lock");
        if failing.iter().any(|marker| url.contains(marker.as_str())) {
            return Err(TransportError::unavailable("simulated outage"));
        }
        Ok(200)
    }
}

fn payload_text(request: &OutboundRequest) -> String {
    match request {
        OutboundRequest::Get { url } => url
            .query_pairs()
            .find(|(key, _)| key == "msg")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default(),
        OutboundRequest::PostJson { body, .. } => {
            let Some(fields) = body.as_object() else {
                return String::new();
            };
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            keys.iter()
                .filter_map(|key| fields.get(key.as_str())?.as_str())
                .collect::<Vec<_>>()
                .join("|")
        }
    }
}

/// Dispatcher holding a single webhook channel for `event`.
pub(crate) fn dispatcher_with_webhook(
    event: &str,
) -> (Arc<RecordingTransport>, Arc<NotificationDispatcher>) {
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = NotificationDispatcher::new(transport.clone());
    let channel = WebhookChannel::new(event, WEBHOOK_KEY).expect("valid webhook");
    dispatcher.add_channel(channel).expect("register webhook");
    (transport, Arc::new(dispatcher))
}

/// Disarmed system over the named sensors with one webhook channel.
pub(crate) fn security_with_sensors(
    names: &[&str],
) -> (Arc<RecordingTransport>, Arc<HomeSecurity>) {
    let (transport, dispatcher) = dispatcher_with_webhook("door_open");
    let security = HomeSecurity::new(
        SensorBank::new(names.iter().copied()),
        Arc::new(MemoryEventLog::default()),
        dispatcher,
    );
    (transport, Arc::new(security))
}

/// Sends one raw request and returns the whole reply.
pub(crate) fn exchange(address: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(address).expect("connect to listener");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    stream.write_all(raw.as_bytes()).expect("send request");
    let mut reply = String::new();
    let mut reader = BufReader::new(stream);
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).expect("read reply");
        if read == 0 {
            break;
        }
        reply.push_str(&line);
    }
    reply
}

/// Status line of a raw reply.
pub(crate) fn status_line(reply: &str) -> &str {
    reply.lines().next().unwrap_or_default()
}

/// Provider that hands out a shared recording transport.
#[derive(Default, Clone)]
pub(crate) struct RecordingTransportProvider {
    transport: Arc<RecordingTransport>,
}

impl RecordingTransportProvider {
    pub(crate) fn recorder(&self) -> Arc<RecordingTransport> {
        Arc::clone(&self.transport)
    }
}

impl TransportProvider for RecordingTransportProvider {
    fn transport(
        &self,
        _config: &Config,
    ) -> Result<Arc<dyn ChannelTransport>, TransportError> {
        Ok(self.transport.clone())
    }
}

/// Lifecycle events observed by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    WhitelistEmpty,
    ChannelRegistered(ChannelKind),
    ChannelRejected(ChannelKind),
    ListenerReady(SocketAddr),
    ListenerStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Address reported by the most recent `listener_ready` event.
    pub(crate) fn ready_address(&self) -> Option<SocketAddr> {
        self.events().iter().rev().find_map(|event| match event {
            HealthEvent::ListenerReady(address) => Some(*address),
            _ => None,
        })
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn whitelist_empty(&self) {
        self.record(HealthEvent::WhitelistEmpty);
    }

    fn channel_registered(&self, kind: ChannelKind) {
        self.record(HealthEvent::ChannelRegistered(kind));
    }

    fn channel_rejected(&self, error: &ChannelSetupError) {
        self.record(HealthEvent::ChannelRejected(error.kind()));
    }

    fn listener_ready(&self, address: SocketAddr) {
        self.record(HealthEvent::ListenerReady(address));
    }

    fn listener_stopped(&self) {
        self.record(HealthEvent::ListenerStopped);
    }
}
