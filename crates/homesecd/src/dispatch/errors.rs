//! Error types for request handling.
//!
//! Each failure maps onto exactly one response: parse and handler failures
//! become a 500 carrying the error message, unknown routes a 404 echoing
//! the path.

use std::io;

use thiserror::Error;

use crate::security::SecurityError;

/// Errors raised while reading a request from the connection.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The client closed the connection without sending a request line.
    #[error("empty request")]
    Empty,

    /// The request line has fewer than two whitespace-separated tokens.
    #[error("malformed request line: {line}")]
    MalformedRequestLine {
        /// Request line as received.
        line: String,
    },

    /// The request line and headers exceed the size limit.
    #[error("request exceeds {max_size} byte limit")]
    TooLarge {
        /// Configured limit in bytes.
        max_size: usize,
    },

    /// Reading from the connection failed.
    #[error("failed to read request: {0}")]
    Io(#[from] io::Error),
}

/// Failure to resolve a path to a route.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// No route matches the path.
    #[error("NOT FOUND : {path}")]
    NotFound {
        /// Requested path.
        path: String,
    },
}

impl RouteError {
    /// Creates a not-found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Errors raised while executing a routed request.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A domain operation failed.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// The response body could not be serialised.
    #[error("failed to serialise response: {0}")]
    Serialise(#[from] serde_json::Error),
}
