//! Behaviour-driven tests for the control plane over loopback TCP.

use std::net::SocketAddr;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use homesec_config::{AuthWhitelist, ListenEndpoint};

use super::support::{RecordingTransport, exchange, security_with_sensors, status_line};
use crate::dispatch::{AuthGuard, DispatchConnectionHandler};
use crate::transport::{ListenerHandle, SocketListener};

struct ControlPlaneWorld {
    transport: Option<Arc<RecordingTransport>>,
    listener: Option<ListenerHandle>,
    reply: Option<String>,
}

impl ControlPlaneWorld {
    fn start(&mut self, token: &str) {
        let (transport, security) = security_with_sensors(&["Front door", "Garage"]);
        let handler = DispatchConnectionHandler::new(
            AuthGuard::new(AuthWhitelist::new([token])),
            security,
        );
        let listener = SocketListener::bind(&ListenEndpoint::new("127.0.0.1", 0))
            .expect("bind control plane");
        let handle = listener
            .start(Arc::new(handler))
            .expect("start control plane");
        self.transport = Some(transport);
        self.listener = Some(handle);
    }

    fn address(&self) -> SocketAddr {
        self.listener
            .as_ref()
            .expect("control plane should be running")
            .local_addr()
    }

    fn request(&mut self, path: &str, token: Option<&str>) {
        let mut raw = format!("GET {path} HTTP/1.0\r\n");
        if let Some(token) = token {
            raw.push_str(&format!("appPassword: {token}\r\n"));
        }
        raw.push_str("\r\n");
        self.reply = Some(exchange(self.address(), &raw));
    }

    fn reply(&self) -> &str {
        self.reply.as_deref().expect("no reply captured")
    }

    fn body(&self) -> &str {
        self.reply()
            .split_once("\r\n\r\n")
            .map_or("", |(_, body)| body.trim_end_matches("\r\n"))
    }
}

impl Drop for ControlPlaneWorld {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.take() {
            let _ = handle.stop();
        }
    }
}

#[fixture]
fn world() -> ControlPlaneWorld {
    ControlPlaneWorld {
        transport: None,
        listener: None,
        reply: None,
    }
}

#[given("a control plane accepting token {token}")]
fn given_control_plane(world: &mut ControlPlaneWorld, token: String) {
    world.start(token.trim_matches('"'));
}

#[when("a client requests {path} with token {token}")]
fn when_request_with_token(world: &mut ControlPlaneWorld, path: String, token: String) {
    world.request(path.trim_matches('"'), Some(token.trim_matches('"')));
}

#[when("a client requests {path} without a token")]
fn when_request_without_token(world: &mut ControlPlaneWorld, path: String) {
    world.request(path.trim_matches('"'), None);
}

#[then("the response status is {code}")]
fn then_status(world: &mut ControlPlaneWorld, code: u16) {
    let line = status_line(world.reply());
    assert!(
        line.starts_with(&format!("HTTP/1.0 {code} ")),
        "unexpected status line {line:?}"
    );
}

#[then("the response has no body")]
fn then_body_empty(world: &mut ControlPlaneWorld) {
    assert_eq!(world.body(), "");
}

#[then("the response body is {expected}")]
fn then_body_is(world: &mut ControlPlaneWorld, expected: String) {
    assert_eq!(world.body(), expected.trim_matches('"'));
}

#[then("the response body contains {fragment}")]
fn then_body_contains(world: &mut ControlPlaneWorld, fragment: String) {
    let fragment = fragment.trim_matches('"');
    assert!(
        world.body().contains(fragment),
        "body {:?} lacks {fragment:?}",
        world.body()
    );
}

#[then("the alarm webhook received {count} alert(s)")]
fn then_alerts(world: &mut ControlPlaneWorld, count: usize) {
    let transport = world.transport.as_ref().expect("transport");
    assert_eq!(transport.payloads_to("door_open").len(), count);
}

#[scenario(
    path = "tests/features/control_plane.feature",
    name = "Requests without a whitelisted token are refused"
)]
fn unauthorised_requests_are_refused(world: ControlPlaneWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/control_plane.feature",
    name = "Toggling the alarm flips its state and alerts channels"
)]
fn alarm_toggle_round_trip(world: ControlPlaneWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/control_plane.feature",
    name = "Unknown paths and sensors are not found"
)]
fn unknown_paths_are_not_found(world: ControlPlaneWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/control_plane.feature",
    name = "Toggling a sensor reports its new state"
)]
fn sensor_toggle_is_reported(world: ControlPlaneWorld) {
    let _ = world;
}
