//! Unit tests for error rendering.

use std::path::PathBuf;

use super::*;

#[test]
fn invalid_credential_names_kind_and_rule() {
    let error = ChannelError::invalid(ChannelKind::Sms, "secret must be 14 characters");
    assert_eq!(
        error.to_string(),
        "invalid sms credentials: secret must be 14 characters"
    );
}

#[test]
fn file_format_reports_line_counts() {
    let error = ChannelError::FileFormat {
        kind: ChannelKind::Webhook,
        path: PathBuf::from("/etc/homesec/webhook.credentials"),
        expected: 2,
        found: 3,
    };
    let message = error.to_string();
    assert!(message.contains("must have 2 lines"));
    assert!(message.contains("found 3"));
}

#[test]
fn duplicate_channel_mentions_kind() {
    let error = DispatchError::DuplicateChannel {
        kind: ChannelKind::Webhook,
    };
    assert!(error.to_string().contains("webhook"));
}

#[test]
fn transport_error_is_transparent_in_delivery() {
    let error = DeliveryError::from(TransportError::unavailable("connection refused"));
    assert_eq!(
        error.to_string(),
        "destination unavailable: connection refused"
    );
}

#[test]
fn rejected_delivery_includes_status() {
    let error = DeliveryError::Rejected {
        kind: ChannelKind::Sms,
        status: 402,
        reason: "too many messages sent",
    };
    assert_eq!(
        error.to_string(),
        "sms provider answered 402: too many messages sent"
    );
}
