//! Test helpers for the transport module.

use std::io::Write;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
    mpsc,
};

use super::{ConnectionHandler, ConnectionStream};

/// Reply written by [`CountingHandler`] before it closes a connection.
pub(crate) const COUNTING_REPLY: &[u8] = b"counted\n";

/// Handler that counts connections and answers each with a fixed line.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
        let _ = stream.write_all(COUNTING_REPLY);
        let _ = stream.finish_writes();
    }
}

/// Reply written by [`BlockingHandler`] once it is released.
pub(crate) const BLOCKING_REPLY: &[u8] = b"released\n";

/// Handler that parks each connection until the test releases it.
pub(crate) struct BlockingHandler {
    entered: mpsc::Sender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Test-side ends of a [`BlockingHandler`].
pub(crate) struct BlockingControls {
    /// Receives one message per connection that reached the handler.
    pub(crate) entered: mpsc::Receiver<()>,
    /// Each message lets one parked connection write its reply.
    pub(crate) release: mpsc::Sender<()>,
}

impl BlockingHandler {
    pub(crate) fn new() -> (BlockingControls, Arc<Self>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let handler = Arc::new(Self {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        });
        let controls = BlockingControls {
            entered: entered_rx,
            release: release_tx,
        };
        (controls, handler)
    }
}

impl ConnectionHandler for BlockingHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        let _ = self.entered.send(());
        if let Ok(release) = self.release.lock() {
            let _ = release.recv();
        }
        let _ = stream.write_all(BLOCKING_REPLY);
        let _ = stream.finish_writes();
    }
}
