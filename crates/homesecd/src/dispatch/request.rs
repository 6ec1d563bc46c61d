//! Minimal request parsing.
//!
//! A request is a request line followed by `Key: Value` header lines. The
//! body is never read. Header collection stops at the first line that is
//! blank *or* lacks the `": "` separator; any lines after it are ignored,
//! even if they are well-formed headers.

use std::io::{BufRead, Read};

use super::errors::RequestError;

/// Upper bound for the request line plus headers.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

const HEADER_SEPARATOR: &str = ": ";

/// Parsed request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Request method as sent; not used for routing.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path, the second token of the request line.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Value of the first header named exactly `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Headers in the order received.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Reads one request from a buffered reader.
#[derive(Debug, Clone, Copy)]
pub struct RequestParser {
    max_bytes: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new(MAX_REQUEST_BYTES)
    }
}

impl RequestParser {
    /// Creates a parser that rejects requests larger than `max_bytes`.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Parses the request line and headers.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Empty`] when no bytes arrive,
    /// [`RequestError::MalformedRequestLine`] when the path is missing,
    /// [`RequestError::TooLarge`] past the size limit and
    /// [`RequestError::Io`] when reading fails.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Request, RequestError> {
        let limit = u64::try_from(self.max_bytes).map_or(u64::MAX, |max| max.saturating_add(1));
        let mut reader = LineReader {
            inner: reader.take(limit),
            consumed: 0,
            max_bytes: self.max_bytes,
        };

        let Some(request_line) = reader.next_line()? else {
            return Err(RequestError::Empty);
        };
        let mut tokens = request_line.split_whitespace();
        let (Some(method), Some(path)) = (tokens.next(), tokens.next()) else {
            return Err(RequestError::MalformedRequestLine { line: request_line });
        };
        let method = method.to_owned();
        let path = path.to_owned();

        let mut headers = Vec::new();
        while let Some(line) = reader.next_line()? {
            let Some((key, value)) = line.split_once(HEADER_SEPARATOR) else {
                break;
            };
            headers.push((key.to_owned(), value.to_owned()));
        }

        Ok(Request {
            method,
            path,
            headers,
        })
    }
}

struct LineReader<R> {
    inner: R,
    consumed: usize,
    max_bytes: usize,
}

impl<R: BufRead> LineReader<R> {
    /// Next line without its terminator, or `None` at end of stream.
    fn next_line(&mut self) -> Result<Option<String>, RequestError> {
        let mut raw = Vec::new();
        let read = self.inner.read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Ok(None);
        }
        self.consumed += read;
        if self.consumed > self.max_bytes {
            return Err(RequestError::TooLarge {
                max_size: self.max_bytes,
            });
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}
