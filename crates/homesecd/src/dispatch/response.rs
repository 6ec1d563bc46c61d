//! Response serialisation.
//!
//! Responses are framed by connection close: a status line, an optional
//! content type, a blank line, the body and a trailing blank line. Every
//! line ends in CRLF.

use std::io::{self, Write};

const PROTOCOL: &str = "HTTP/1.0";
const CRLF: &str = "\r\n";

/// Content type sent with every successful response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status codes used by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 200.
    Ok,
    /// 401.
    Unauthorized,
    /// 404.
    NotFound,
    /// 500.
    InternalServerError,
}

impl Status {
    /// Numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }

    /// Reason phrase for the status line.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete response, written once per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Body {
    content_type: Option<&'static str>,
    text: String,
}

impl Response {
    /// 200 with a JSON body.
    pub fn json(text: impl Into<String>) -> Self {
        Self::with_body(Status::Ok, Some(JSON_CONTENT_TYPE), text)
    }

    /// 401 with an empty body.
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self {
            status: Status::Unauthorized,
            body: None,
        }
    }

    /// 404 carrying `message`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_body(Status::NotFound, None, message)
    }

    /// 500 carrying `message`.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_body(Status::InternalServerError, None, message)
    }

    fn with_body(
        status: Status,
        content_type: Option<&'static str>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: Some(Body {
                content_type,
                text: text.into(),
            }),
        }
    }

    /// Status of the response.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Body text, empty when the response has none.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_ref().map_or("", |body| body.text.as_str())
    }
}

/// Writes responses to a connection.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the status line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_status(&mut self, status: Status) -> io::Result<()> {
        write!(
            self.writer,
            "{PROTOCOL} {} {}{CRLF}",
            status.code(),
            status.reason()
        )
    }

    /// Writes the optional content type, the header terminator, the body and
    /// a trailing blank line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_body(&mut self, content_type: Option<&str>, text: &str) -> io::Result<()> {
        if let Some(content_type) = content_type {
            write!(self.writer, "Content-Type: {content_type}{CRLF}")?;
        }
        write!(self.writer, "{CRLF}{text}{CRLF}{CRLF}")
    }

    /// Writes `response` in full and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_response(&mut self, response: &Response) -> io::Result<()> {
        self.write_status(response.status)?;
        match &response.body {
            Some(body) => self.write_body(body.content_type, &body.text)?,
            None => self.writer.write_all(CRLF.as_bytes())?,
        }
        self.writer.flush()
    }
}
