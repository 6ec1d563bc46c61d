//! Accept loop for the control-plane socket.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use homesec_config::ListenEndpoint;

use super::workers::WorkerGauge;
use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const WORKER_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Source of accepted connections polled by the accept loop.
pub(crate) trait AcceptSource {
    /// Returns the next pending connection, or `None` when nothing is
    /// waiting.
    fn accept(&self) -> io::Result<Option<ConnectionStream>>;
}

impl AcceptSource for TcpListener {
    fn accept(&self) -> io::Result<Option<ConnectionStream>> {
        match TcpListener::accept(self) {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                Ok(Some(ConnectionStream::new(stream)))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Listener bound to the control-plane endpoint.
///
/// Binding happens eagerly so a port of `0` can be resolved to the
/// OS-assigned port before any connection is accepted.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: ListenEndpoint,
    listener: TcpListener,
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &ListenEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port())?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
        })
    }

    /// Address actually bound, including the OS-assigned port.
    pub(crate) fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        self.listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })
    }

    /// Starts accepting connections on a dedicated thread.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        let local_addr = self.local_addr()?;
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            address = %local_addr,
            "control-plane listener active"
        );
        start_accept_thread(self.listener, local_addr, handler)
    }
}

/// Runs the accept loop for `source` on a dedicated thread.
fn start_accept_thread<S>(
    source: S,
    local_addr: SocketAddr,
    handler: Arc<dyn ConnectionHandler>,
) -> Result<ListenerHandle, ListenerError>
where
    S: AcceptSource + Send + 'static,
{
    let shutdown = Arc::new(AtomicBool::new(false));
    let workers = Arc::new(WorkerGauge::default());
    let loop_state = AcceptLoop {
        local_addr,
        shutdown: Arc::clone(&shutdown),
        handler,
        workers: Arc::clone(&workers),
    };
    let handle = thread::Builder::new()
        .name("homesecd-accept".to_owned())
        .spawn(move || loop_state.run(&source))
        .map_err(|source| ListenerError::Spawn { source })?;
    Ok(ListenerHandle {
        local_addr,
        shutdown,
        workers,
        handle: Some(handle),
    })
}

/// Handle to the background accept thread.
///
/// Dropping the handle requests shutdown without waiting for the thread
/// or its connection workers.
#[derive(Debug)]
pub(crate) struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    workers: Arc<WorkerGauge>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Asks the accept loop to exit after its current iteration.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to exit, then gives in-flight connection
    /// workers up to `grace` to finish.
    ///
    /// The listening socket is closed once the accept loop exits. Workers
    /// still running when `grace` elapses are detached and keep running
    /// until they finish or the process exits.
    pub(crate) fn join_within(mut self, grace: Duration) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| ListenerError::ThreadPanic)?;
        }
        let remaining = self.workers.wait_idle(grace);
        if remaining > 0 {
            warn!(
                target: LISTENER_TARGET,
                remaining,
                grace_ms = grace.as_millis(),
                "connection workers still running after shutdown grace"
            );
        }
        Ok(())
    }

    /// Requests shutdown and waits for the accept loop and its workers.
    pub(crate) fn stop(self) -> Result<(), ListenerError> {
        self.stop_within(WORKER_DRAIN_GRACE)
    }

    /// Requests shutdown and drains workers for at most `grace`.
    pub(crate) fn stop_within(self, grace: Duration) -> Result<(), ListenerError> {
        self.shutdown();
        self.join_within(grace)
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// State shared by the accept loop and the workers it spawns.
pub(super) struct AcceptLoop {
    pub(super) local_addr: SocketAddr,
    pub(super) shutdown: Arc<AtomicBool>,
    pub(super) handler: Arc<dyn ConnectionHandler>,
    pub(super) workers: Arc<WorkerGauge>,
}

impl AcceptLoop {
    /// Polls `source` until shutdown is requested. Accept errors are logged
    /// once per distinct error kind and never end the loop.
    pub(super) fn run<S: AcceptSource + ?Sized>(&self, source: &S) {
        let mut last_error = None::<io::ErrorKind>;
        while !self.shutdown.load(Ordering::SeqCst) {
            match source.accept() {
                Ok(Some(stream)) => {
                    last_error = None;
                    self.spawn_worker(stream);
                }
                Ok(None) => thread::sleep(ACCEPT_BACKOFF),
                Err(error) => {
                    let kind = error.kind();
                    if last_error != Some(kind) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "socket accept error"
                        );
                    }
                    last_error = Some(kind);
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        info!(
            target: LISTENER_TARGET,
            address = %self.local_addr,
            "control-plane listener stopped"
        );
    }

    fn spawn_worker(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        let handler = Arc::clone(&self.handler);
        let guard = self.workers.enter();
        let spawned = thread::Builder::new()
            .name("homesecd-conn".to_owned())
            .spawn(move || {
                handler.handle(stream);
                drop(guard);
            });
        match spawned {
            Ok(_) => debug!(target: LISTENER_TARGET, ?peer, "connection accepted"),
            Err(error) => warn!(
                target: LISTENER_TARGET,
                ?peer,
                error = %error,
                "failed to spawn connection worker"
            ),
        }
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
