//! Unit tests for channel construction and wire requests.

use std::io::Write;

use rstest::rstest;

use super::*;
use crate::error::DeliveryError;
use crate::tests::support::{RecordingTransport, SMS_SECRET, WEBHOOK_KEY, sms, webhook};
use crate::transport::OutboundRequest;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[rstest]
#[case("1234567", SMS_SECRET)]
#[case("123456789", SMS_SECRET)]
#[case("1234567a", SMS_SECRET)]
#[case("12345678", "too-short")]
#[case("12345678", "fifteen-chars!!")]
fn sms_rejects_malformed_credentials(#[case] account: &str, #[case] secret: &str) {
    let error = SmsChannel::new(account, secret).expect_err("credentials should be rejected");
    assert!(matches!(
        error,
        ChannelError::InvalidCredential {
            kind: ChannelKind::Sms,
            ..
        }
    ));
}

#[rstest]
#[case("", WEBHOOK_KEY)]
#[case("door open", WEBHOOK_KEY)]
#[case("../admin", WEBHOOK_KEY)]
#[case("door_open", "short")]
#[case("door_open", "abcdefghijklmnopqrstu/")]
fn webhook_rejects_malformed_credentials(#[case] event: &str, #[case] key: &str) {
    let error = WebhookChannel::new(event, key).expect_err("credentials should be rejected");
    assert!(matches!(
        error,
        ChannelError::InvalidCredential {
            kind: ChannelKind::Webhook,
            ..
        }
    ));
}

#[test]
fn equality_is_value_based() {
    assert_eq!(sms("12345678"), sms("12345678"));
    assert_ne!(sms("12345678"), sms("87654321"));
    assert_ne!(webhook("door_open"), webhook("window_open"));
}

#[test]
fn debug_output_redacts_secrets() {
    let rendered = format!("{:?} {:?}", sms("12345678"), webhook("door_open"));
    assert!(!rendered.contains(SMS_SECRET));
    assert!(!rendered.contains(WEBHOOK_KEY));
    assert!(rendered.contains("12345678"));
}

#[test]
fn kind_tags_match_variants() {
    assert_eq!(sms("12345678").kind(), ChannelKind::Sms);
    assert_eq!(webhook("door_open").kind(), ChannelKind::Webhook);
    assert_eq!(ChannelKind::Webhook.to_string(), "webhook");
}

// ---------------------------------------------------------------------------
// Credential files
// ---------------------------------------------------------------------------

fn credential_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    for line in lines {
        writeln!(file, "{line}").expect("write line");
    }
    file
}

#[test]
fn sms_loads_from_two_line_file() {
    let file = credential_file(&["12345678", SMS_SECRET]);
    let channel = SmsChannel::from_file(file.path()).expect("load sms channel");
    assert_eq!(channel.account(), "12345678");
}

#[test]
fn webhook_loads_from_two_line_file() {
    let file = credential_file(&["door_open", WEBHOOK_KEY]);
    let channel = WebhookChannel::from_file(file.path()).expect("load webhook channel");
    assert_eq!(channel.event(), "door_open");
}

#[rstest]
#[case(&["12345678"], 1)]
#[case(&["12345678", SMS_SECRET, "extra"], 3)]
fn credential_file_requires_two_lines(#[case] lines: &[&str], #[case] found: usize) {
    let file = credential_file(lines);
    let error = SmsChannel::from_file(file.path()).expect_err("format should be rejected");
    match error {
        ChannelError::FileFormat {
            expected,
            found: actual,
            ..
        } => {
            assert_eq!(expected, 2);
            assert_eq!(actual, found);
        }
        other => panic!("expected FileFormat, got {other:?}"),
    }
}

#[test]
fn missing_credential_file_is_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = WebhookChannel::from_file(&dir.path().join("webhook.credentials"))
        .expect_err("missing file should fail");
    assert!(matches!(error, ChannelError::Read { .. }));
}

// ---------------------------------------------------------------------------
// Wire requests
// ---------------------------------------------------------------------------

#[test]
fn sms_sends_get_with_encoded_message() {
    let transport = RecordingTransport::default();
    sms("12345678")
        .send_message(&transport, "Alarm armed & ready")
        .expect("send");

    let requests = transport.requests();
    let [OutboundRequest::Get { url }] = requests.as_slice() else {
        panic!("expected a single GET, got {requests:?}");
    };
    assert_eq!(url.host_str(), Some("smsapi.free-mobile.fr"));
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("user".to_owned(), "12345678".to_owned())));
    let message = ("msg".to_owned(), "Alarm armed & ready".to_owned());
    assert!(pairs.contains(&message));
}

#[test]
fn sms_joins_multiple_values() {
    let transport = RecordingTransport::default();
    sms("12345678")
        .send_values(&transport, &["TEST", "Test alarm activation."])
        .expect("send");
    assert_eq!(
        transport.payloads_to("12345678"),
        vec!["TEST Test alarm activation.".to_owned()]
    );
}

#[rstest]
#[case(400)]
#[case(402)]
#[case(403)]
#[case(500)]
#[case(418)]
fn sms_maps_non_success_status(#[case] status: u16) {
    let transport = RecordingTransport::default();
    transport.respond_with(status);
    let error = sms("12345678")
        .send_message(&transport, "hello")
        .expect_err("status should be rejected");
    assert!(matches!(
        error,
        DeliveryError::Rejected { status: s, .. } if s == status
    ));
}

#[test]
fn webhook_posts_numbered_values() {
    let transport = RecordingTransport::default();
    webhook("door_open")
        .send_values(&transport, &["TEST", "front door"])
        .expect("send");

    let requests = transport.requests();
    let [OutboundRequest::PostJson { url, body }] = requests.as_slice() else {
        panic!("expected a single POST, got {requests:?}");
    };
    assert_eq!(url.host_str(), Some("maker.ifttt.com"));
    assert_eq!(
        url.path(),
        format!("/trigger/door_open/with/key/{WEBHOOK_KEY}")
    );
    assert_eq!(
        body,
        &serde_json::json!({"value1": "TEST", "value2": "front door"})
    );
}

#[test]
fn webhook_message_is_single_value() {
    let transport = RecordingTransport::default();
    webhook("door_open")
        .send_message(&transport, "intrusion")
        .expect("send");
    assert_eq!(
        transport.payloads_to("door_open"),
        vec!["intrusion".to_owned()]
    );
}

#[test]
fn webhook_refuses_more_than_three_values() {
    let transport = RecordingTransport::default();
    let error = webhook("door_open")
        .send_values(&transport, &["a", "b", "c", "d"])
        .expect_err("four values should fail");
    assert!(matches!(
        error,
        DeliveryError::TooManyValues { count: 4, .. }
    ));
    assert!(transport.requests().is_empty());
}

#[test]
fn empty_payloads_never_reach_transport() {
    let transport = RecordingTransport::default();
    assert!(sms("12345678").send_message(&transport, "").is_err());
    assert!(
        webhook("door_open")
            .send_values(&transport, &[] as &[&str])
            .is_err()
    );
    assert!(transport.requests().is_empty());
}

#[test]
fn transport_failure_is_delivery_error() {
    let transport = RecordingTransport::default();
    transport.fail_when_url_contains("door_open");
    let error = webhook("door_open")
        .send_message(&transport, "intrusion")
        .expect_err("transport should fail");
    assert!(matches!(error, DeliveryError::Transport(_)));
}
