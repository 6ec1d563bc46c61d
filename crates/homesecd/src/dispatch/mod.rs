//! Request dispatch for the control plane.
//!
//! A connection carries exactly one exchange:
//!
//! ```text
//! GET /alarm/toggle HTTP/1.0
//! appPassword: <token>
//!
//! ```
//!
//! answered by
//!
//! ```text
//! HTTP/1.0 200 OK
//! Content-Type: application/json
//!
//! true
//!
//! ```
//!
//! after which the server closes the connection.

mod auth;
mod errors;
mod handler;
mod request;
mod response;
mod router;

pub use self::auth::{AUTH_HEADER, AuthGuard};
pub use self::errors::{HandlerError, RequestError, RouteError};
pub use self::handler::DispatchConnectionHandler;
pub use self::request::{Request, RequestParser};
pub use self::response::{JSON_CONTENT_TYPE, Response, ResponseWriter, Status};
pub use self::router::{Route, Router, SensorDirectory};
