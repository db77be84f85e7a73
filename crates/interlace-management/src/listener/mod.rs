//! TCP listener behind the connector server.
//!
//! Each started listener accepts connections on a background thread and hands
//! every stream to a [`ConnectionHandler`] on its own named thread. Accepted
//! streams carry a read timeout, so an idle client cannot hold a thread
//! forever. Stopping sets a shutdown flag; the accept loop then shuts down
//! every open stream and joins its thread before exiting, and `stop` waits
//! for the accept loop up to [`SHUTDOWN_GRACE`].

use std::fmt;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::ManagementError;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::listener");
const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const JOIN_POLL: Duration = Duration::from_millis(10);
const CONNECTION_DRAIN: Duration = Duration::from_secs(2);

/// Read timeout applied to every accepted connection.
pub const CONNECTION_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest time `stop` waits for an accept loop before detaching it.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A `tcp://host:port` service address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAddress {
    host: String,
    port: u16,
}

impl ServiceAddress {
    /// Host part.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port part.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ServiceAddress {
    type Err = ManagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ManagementError::InvalidAddress {
            address: s.to_owned(),
            reason: reason.to_owned(),
        };
        let authority = s
            .trim()
            .strip_prefix("tcp://")
            .ok_or_else(|| invalid("expected the tcp:// scheme"))?;
        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = port
            .parse::<u16>()
            .map_err(|error| invalid(&format!("invalid port: {error}")))?;
        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "tcp://[{}]:{}", self.host, self.port)
        } else {
            write!(f, "tcp://{}:{}", self.host, self.port)
        }
    }
}

/// Handles accepted connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream);
}

/// Handle to a running accept loop.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Binds `address` and starts accepting connections for `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagementError`] when the address cannot be resolved or
    /// bound, or the accept thread cannot be spawned.
    pub fn start(
        address: &ServiceAddress,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<Self, ManagementError> {
        Self::start_with_idle_timeout(address, handler, CONNECTION_IDLE_TIMEOUT)
    }

    fn start_with_idle_timeout(
        address: &ServiceAddress,
        handler: Arc<dyn ConnectionHandler>,
        idle_timeout: Duration,
    ) -> Result<Self, ManagementError> {
        let listener = bind_tcp(address)?;
        let setup_error = |source: io::Error| ManagementError::Listener {
            address: address.to_string(),
            source: Arc::new(source),
        };
        let local_addr = listener.local_addr().map_err(setup_error)?;
        listener.set_nonblocking(true).map_err(setup_error)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let join = thread::Builder::new()
            .name(format!("interlace-accept-{}", local_addr.port()))
            .spawn(move || run_accept_loop(&listener, &flag, &handler, idle_timeout))
            .map_err(setup_error)?;
        info!(target: LISTENER_TARGET, %local_addr, "listener active");
        Ok(Self {
            local_addr,
            shutdown,
            join: Some(join),
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signals shutdown and waits for the accept loop within
    /// [`SHUTDOWN_GRACE`]; a loop still running after that is detached.
    pub fn stop(mut self) {
        self.stop_within(SHUTDOWN_GRACE);
    }

    fn stop_within(&mut self, grace: Duration) {
        self.shutdown.store(true, Ordering::SeqCst);
        let Some(join) = self.join.take() else {
            return;
        };
        match join_within(join, grace) {
            Some(Ok(())) => {}
            Some(Err(_)) => {
                warn!(target: LISTENER_TARGET, local_addr = %self.local_addr, "accept loop panicked");
            }
            None => warn!(
                target: LISTENER_TARGET,
                local_addr = %self.local_addr,
                grace_ms = grace.as_millis(),
                "accept loop did not stop in time; detaching"
            ),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

pub(crate) fn bind_tcp(address: &ServiceAddress) -> Result<TcpListener, ManagementError> {
    let resolve_error = |reason: String| ManagementError::InvalidAddress {
        address: address.to_string(),
        reason,
    };
    let addr = (address.host(), address.port())
        .to_socket_addrs()
        .map_err(|error| resolve_error(error.to_string()))?
        .next()
        .ok_or_else(|| resolve_error("host resolved to no addresses".to_owned()))?;
    TcpListener::bind(addr).map_err(|source| ManagementError::Bind {
        address: addr,
        source: Arc::new(source),
    })
}

/// A served connection: a clone of its stream for shutdown, and its thread.
struct OpenConnection {
    peer: SocketAddr,
    stream: TcpStream,
    join: JoinHandle<()>,
}

fn run_accept_loop(
    listener: &TcpListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
    idle_timeout: Duration,
) {
    let mut open: Vec<OpenConnection> = Vec::new();
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        open.retain(|connection| !connection.join.is_finished());
        match listener.accept() {
            Ok((stream, peer)) => {
                last_error = None;
                match serve_connection(stream, peer, handler, idle_timeout) {
                    Ok(connection) => open.push(connection),
                    Err(error) => {
                        warn!(target: LISTENER_TARGET, %peer, %error, "failed to serve connection");
                    }
                }
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(target: LISTENER_TARGET, %error, "accept error");
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    close_connections(open, CONNECTION_DRAIN);
}

fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: &Arc<dyn ConnectionHandler>,
    idle_timeout: Duration,
) -> io::Result<OpenConnection> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(idle_timeout))?;
    let tracked = stream.try_clone()?;
    let shared = Arc::clone(handler);
    let join = thread::Builder::new()
        .name(format!("interlace-conn-{}", peer.port()))
        .spawn(move || shared.handle(stream))?;
    Ok(OpenConnection {
        peer,
        stream: tracked,
        join,
    })
}

/// Shuts down every open stream so blocked reads return, then joins the
/// connection threads until `grace` runs out.
fn close_connections(open: Vec<OpenConnection>, grace: Duration) {
    for connection in &open {
        if let Err(error) = connection.stream.shutdown(Shutdown::Both) {
            tracing::debug!(
                target: LISTENER_TARGET,
                peer = %connection.peer,
                %error,
                "connection already closed"
            );
        }
    }
    let deadline = Instant::now() + grace;
    for connection in open {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match join_within(connection.join, remaining) {
            Some(Ok(())) => {}
            Some(Err(_)) => {
                warn!(target: LISTENER_TARGET, peer = %connection.peer, "connection handler panicked");
            }
            None => warn!(
                target: LISTENER_TARGET,
                peer = %connection.peer,
                "connection thread did not stop in time; detaching"
            ),
        }
    }
}

/// Joins `join` if it finishes within `grace`. `None` means the thread is
/// still running and has been detached.
pub(crate) fn join_within(join: JoinHandle<()>, grace: Duration) -> Option<thread::Result<()>> {
    let deadline = Instant::now() + grace;
    while !join.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(JOIN_POLL);
    }
    Some(join.join())
}
