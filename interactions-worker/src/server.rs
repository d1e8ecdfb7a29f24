//! Server lifecycle.
//!
//! [`InteractionServer`] binds the configured route to the verification
//! gate. [`InteractionServer::start`] binds the listener, fires the
//! readiness callback and serves in a background task until
//! [`ServerHandle::close`] is called.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::post, Router};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::dispatch::{Dispatcher, InteractionHandler};
use crate::error::{ConfigError, ServerError};
use crate::web::{interactions_webhook, AppState, VerificationGate};
use crate::Config;

type ReadyCallback = Box<dyn FnOnce(SocketAddr) + Send>;

/// Interactions receiver bound to one handler.
pub struct InteractionServer {
    state: AppState,
    on_ready: Option<ReadyCallback>,
}

impl InteractionServer {
    /// Build a server for `config`, sending every verified interaction to `handler`.
    pub fn new(config: Config, handler: impl InteractionHandler) -> Result<Self, ConfigError> {
        let gate = VerificationGate::from_config(&config)?;
        let state = AppState::new(Arc::new(config), gate, Dispatcher::new(handler));

        Ok(Self {
            state,
            on_ready: None,
        })
    }

    /// Register a callback fired once the listener is bound, before any request is served.
    pub fn on_ready(mut self, callback: impl FnOnce(SocketAddr) + Send + 'static) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Interactions route without middleware.
    ///
    /// Applications may merge further routes into it and pass the result to
    /// [`start_with`](Self::start_with), which layers every route alike.
    pub fn routes(&self) -> Router {
        Router::new()
            .route(&self.state.config.route, post(interactions_webhook))
            .with_state(self.state.clone())
    }

    /// Wrap `app` in request tracing and the configured request timeout.
    pub fn with_layers(&self, app: Router) -> Router {
        app.layer(TimeoutLayer::new(Duration::from_millis(
            self.state.config.request_timeout_ms,
        )))
        .layer(TraceLayer::new_for_http())
    }

    /// Router serving the interactions route with tracing and timeout applied.
    pub fn router(&self) -> Router {
        self.with_layers(self.routes())
    }

    /// Bind `0.0.0.0:port` and serve the interactions route.
    pub async fn start(self, port: u16) -> Result<ServerHandle, ServerError> {
        let app = self.routes();
        self.start_with(app, port).await
    }

    /// Like [`start`](Self::start) but serves `app`, typically [`routes`](Self::routes)
    /// with extra routes merged in. Tracing and the request timeout apply to all of them.
    pub async fn start_with(self, app: Router, port: u16) -> Result<ServerHandle, ServerError> {
        let app = self.with_layers(app);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { port, source })?;
        let local_addr = listener.local_addr()?;

        info!(
            address = %local_addr,
            route = %self.state.config.route,
            "server_listening"
        );

        if let Some(callback) = self.on_ready {
            callback(local_addr);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            info!("server_shutting_down");
        });
        let task = tokio::spawn(async move { serve.await });

        Ok(ServerHandle {
            local_addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Handle to a running server.
///
/// Dropping the handle also stops the server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn close(self) -> Result<(), ServerError> {
        let _ = self.shutdown.send(());
        self.task.await??;

        info!(address = %self.local_addr, "server_closed");
        Ok(())
    }
}
