//! Connection handling abstractions for the control-plane listener.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// An accepted control-plane connection.
#[derive(Debug)]
pub(crate) struct ConnectionStream {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl ConnectionStream {
    pub(crate) fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self { stream, peer }
    }

    /// Remote address, when the OS still reports one.
    pub(crate) const fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub(crate) fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }

    /// Signals end-of-response to the client.
    pub(crate) fn finish_writes(&self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Write)
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}
