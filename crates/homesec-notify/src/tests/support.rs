//! Test doubles and channel fixtures.

use std::sync::Mutex;

use crate::channel::{Channel, SmsChannel, WebhookChannel};
use crate::error::TransportError;
use crate::transport::{ChannelTransport, OutboundRequest};

/// Transport that records every request and fails for marked destinations.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    failing: Mutex<Vec<String>>,
    status: Mutex<Option<u16>>,
}

impl RecordingTransport {
    /// Makes every request whose URL contains `marker` fail at the transport.
    pub(crate) fn fail_when_url_contains(&self, marker: &str) {
        self.failing
            .lock()
            .expect("failing lock")
            .push(marker.to_owned());
    }

    /// Overrides the status returned for successful requests.
    pub(crate) fn respond_with(&self, status: u16) {
        *self.status.lock().expect("status lock") = Some(status);
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Requests whose URL contains `marker`.
    pub(crate) fn requests_to(&self, marker: &str) -> Vec<OutboundRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url().as_str().contains(marker))
            .collect()
    }

    /// Text carried by each request sent to `marker`, in order.
    ///
    /// SMS requests report their `msg` query parameter; webhook requests
    /// report their values joined by `|`.
    pub(crate) fn payloads_to(&self, marker: &str) -> Vec<String> {
        self.requests_to(marker).iter().map(payload_text).collect()
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
        Ok(self.status.lock().expect("status lock").unwrap_or(200))
    }
}

fn payload_text(request: &OutboundRequest) -> String {
    match request {
        OutboundRequest::Get { url } => url
            .query_pairs()
            .find(|(key, _)| key == "msg")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default(),
        OutboundRequest::PostJson { body, .. } => body
            .as_object()
            .map(|fields| {
                let mut keys: Vec<&String> = fields.keys().collect();
                keys.sort();
                keys.iter()
                    .filter_map(|key| fields.get(key.as_str()).and_then(|v| v.as_str()))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .unwrap_or_default(),
    }
}

pub(crate) const SMS_SECRET: &str = "abcdefghijklmn";
pub(crate) const WEBHOOK_KEY: &str = "abcdefghijklmnopqrstuv";

pub(crate) fn sms(account: &str) -> Channel {
    SmsChannel::new(account, SMS_SECRET)
        .expect("valid sms credentials")
        .into()
}

pub(crate) fn webhook(event: &str) -> Channel {
    WebhookChannel::new(event, WEBHOOK_KEY)
        .expect("valid webhook credentials")
        .into()
}
