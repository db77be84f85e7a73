//! HTTP side of the web console, served by axum on a private tokio runtime.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::sync::oneshot;

use crate::listener::{SHUTDOWN_GRACE, ServiceAddress, bind_tcp, join_within};
use crate::{MANAGEMENT_TARGET, ManagementError, ObjectRegistry};

const OBJECTS_PATH: &str = "/objects";

/// A running console server.
pub(super) struct ConsoleServer {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl ConsoleServer {
    /// Binds `address` and serves the registry listing until stopped.
    pub(super) fn start(
        address: &ServiceAddress,
        registry: Arc<ObjectRegistry>,
    ) -> Result<Self, ManagementError> {
        let setup_error = |source: io::Error| ManagementError::Listener {
            address: address.to_string(),
            source: Arc::new(source),
        };
        let std_listener = bind_tcp(address)?;
        std_listener.set_nonblocking(true).map_err(setup_error)?;
        let local_addr = std_listener.local_addr().map_err(setup_error)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("interlace-webconsole-rt")
            .build()
            .map_err(setup_error)?;
        let listener = {
            let _entered = runtime.enter();
            tokio::net::TcpListener::from_std(std_listener).map_err(setup_error)?
        };

        let (shutdown, signal) = oneshot::channel();
        let app = router(registry);
        let join = thread::Builder::new()
            .name(format!("interlace-webconsole-{}", local_addr.port()))
            .spawn(move || serve(&runtime, listener, app, signal))
            .map_err(setup_error)?;
        Ok(Self {
            local_addr,
            shutdown,
            join,
        })
    }

    pub(super) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Asks the server to finish in-flight requests and waits for it up to
    /// [`SHUTDOWN_GRACE`].
    pub(super) fn stop(self) {
        let Self {
            local_addr,
            shutdown,
            join,
        } = self;
        if shutdown.send(()).is_err() {
            tracing::debug!(target: MANAGEMENT_TARGET, %local_addr, "web console already stopped");
        }
        match join_within(join, SHUTDOWN_GRACE) {
            Some(Ok(())) => {}
            Some(Err(_)) => {
                tracing::warn!(target: MANAGEMENT_TARGET, %local_addr, "web console panicked");
            }
            None => tracing::warn!(
                target: MANAGEMENT_TARGET,
                %local_addr,
                grace_ms = SHUTDOWN_GRACE.as_millis(),
                "web console did not stop in time; detaching"
            ),
        }
    }
}

fn serve(
    runtime: &Runtime,
    listener: tokio::net::TcpListener,
    app: Router,
    signal: oneshot::Receiver<()>,
) {
    let served = runtime.block_on(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if signal.await.is_err() {
                    tracing::debug!(target: MANAGEMENT_TARGET, "web console handle dropped");
                }
            })
            .await
    });
    if let Err(error) = served {
        tracing::warn!(target: MANAGEMENT_TARGET, %error, "web console server failed");
    }
}

fn router(registry: Arc<ObjectRegistry>) -> Router {
    Router::new()
        .route(OBJECTS_PATH, get(list_objects).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(registry)
}

async fn list_objects(State(registry): State<Arc<ObjectRegistry>>) -> Json<Value> {
    Json(listing(&registry))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "method not allowed" })),
    )
}

fn listing(registry: &ObjectRegistry) -> Value {
    let objects: Vec<Value> = registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let object = registry.get(&name)?;
            Some(json!({
                "name": name.to_string(),
                "kind": object.kind(),
                "attributes": object.attributes(),
            }))
        })
        .collect();
    json!({ "objects": objects })
}
