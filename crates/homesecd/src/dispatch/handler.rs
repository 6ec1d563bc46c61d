//! Connection handler that runs one request/response exchange.
//!
//! Each connection goes through parse, authenticate, route, execute and
//! write, in that order. Authentication is checked before routing so an
//! unauthenticated client learns nothing about which paths exist.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::security::{HomeSecurity, RECENT_EVENT_LIMIT};
use crate::transport::{ConnectionHandler, ConnectionStream};

use super::auth::AuthGuard;
use super::errors::{HandlerError, RequestError, RouteError};
use super::request::RequestParser;
use super::response::{Response, ResponseWriter};
use super::router::{DISPATCH_TARGET, Route, Router};

/// Origin reported in alarm notifications triggered over the control plane.
pub(crate) const CONTROL_PLANE_ORIGIN: &str = "app";

/// Grace period for reading leftover client bytes before closing.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(50);
const DRAIN_LIMIT: u64 = 64 * 1024;

/// Connection handler serving the control-plane endpoints.
pub struct DispatchConnectionHandler {
    parser: RequestParser,
    guard: AuthGuard,
    security: Arc<HomeSecurity>,
    read_timeout: Option<Duration>,
}

impl DispatchConnectionHandler {
    /// Creates a handler over the shared security state.
    #[must_use]
    pub fn new(guard: AuthGuard, security: Arc<HomeSecurity>) -> Self {
        Self {
            parser: RequestParser::default(),
            guard,
            security,
            read_timeout: None,
        }
    }

    /// Applies a read deadline to every accepted connection.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Reads one request from `reader` and produces its response.
    pub(crate) fn respond<R: BufRead>(&self, reader: R) -> Response {
        let request = match self.parser.parse(reader) {
            Ok(request) => request,
            Err(RequestError::Empty) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return Response::internal_error(RequestError::Empty.to_string());
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                return Response::internal_error(error.to_string());
            }
        };

        debug!(
            target: DISPATCH_TARGET,
            method = request.method(),
            path = request.path(),
            "dispatching request"
        );

        if !self.guard.authenticate(&request) {
            info!(
                target: DISPATCH_TARGET,
                path = request.path(),
                "rejected unauthenticated request"
            );
            return Response::unauthorized();
        }

        let route = match Router::route(request.path(), self.security.sensor_bank()) {
            Ok(route) => route,
            Err(error) => {
                debug!(target: DISPATCH_TARGET, %error, "no route");
                return Response::not_found(error.to_string());
            }
        };

        match self.execute(route, request.path()) {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    path = request.path(),
                    %error,
                    "request handler failed"
                );
                Response::internal_error(error.to_string())
            }
        }
    }

    fn execute(&self, route: Route, path: &str) -> Result<Response, HandlerError> {
        let security = self.security.as_ref();
        let body = match route {
            Route::Alarm => json_bool(security.is_armed()),
            Route::AlarmToggle => json_bool(security.toggle_alarm(CONTROL_PLANE_ORIGIN)?),
            Route::AlarmTest => {
                security.trigger_test_alert()?;
                json_bool(true)
            }
            Route::Notify => serde_json::to_string(&security.recent_events(RECENT_EVENT_LIMIT)?)?,
            Route::Sensors => serde_json::to_string(&security.sensors())?,
            Route::SensorToggle { id } => match security.toggle_sensor(id)? {
                Some(enabled) => json_bool(enabled),
                None => return Ok(Response::not_found(RouteError::not_found(path).to_string())),
            },
        };
        Ok(Response::json(body))
    }

    fn serve(&self, mut stream: ConnectionStream) {
        let peer = stream.peer();
        if let Err(error) = stream.set_read_timeout(self.read_timeout) {
            warn!(target: DISPATCH_TARGET, ?peer, %error, "failed to set read timeout");
        }

        let response = self.respond(BufReader::new(&mut stream));
        debug!(
            target: DISPATCH_TARGET,
            ?peer,
            status = response.status().code(),
            "writing response"
        );
        if let Err(error) = ResponseWriter::new(&mut stream).write_response(&response) {
            warn!(target: DISPATCH_TARGET, ?peer, %error, "failed to write response");
            return;
        }
        if let Err(error) = stream.finish_writes() {
            debug!(target: DISPATCH_TARGET, ?peer, %error, "failed to close write half");
        }
        drain_unread(&mut stream);
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.serve(stream);
    }
}

fn json_bool(value: bool) -> String {
    value.to_string()
}

/// Consumes bytes the parser left unread (headers after the first
/// malformed line, or a body) so closing the socket does not reset the
/// connection before the client has read the response.
fn drain_unread(stream: &mut ConnectionStream) {
    if stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_err() {
        return;
    }
    let _ = io::copy(&mut Read::take(&mut *stream, DRAIN_LIMIT), &mut io::sink());
}
