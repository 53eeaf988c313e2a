//! Relay server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use relay_notify::{Notifier, Transport};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{ServerError, ServerResult};
use crate::routes::create_router;
use crate::state::RelayState;

/// HTTP server that receives alerts and relays them to Discord.
pub struct RelayServer<T> {
    state: Arc<RelayState<T>>,
}

impl<T> Clone for RelayServer<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Transport + 'static> RelayServer<T> {
    /// Create a new relay server around a notifier.
    #[must_use]
    pub fn new(notifier: Notifier<T>, app_name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RelayState::new(notifier, app_name)),
        }
    }

    /// Get the relay state for external access.
    #[must_use]
    pub fn state(&self) -> Arc<RelayState<T>> {
        Arc::clone(&self.state)
    }

    /// Start the relay server and listen for connections.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> ServerResult<()> {
        let listener = bind(addr).await?;
        self.log_listening(&listener, addr);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }

    /// Start the relay server with graceful shutdown support.
    ///
    /// The server stops accepting connections when `shutdown` completes and
    /// returns once in-flight requests have finished.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = bind(addr).await?;
        self.log_listening(&listener, addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        info!(
            app = %self.state.app_name(),
            uptime_secs = self.state.uptime_secs(),
            "relay server shut down"
        );
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(Arc::clone(&self.state))
    }

    fn log_listening(&self, listener: &TcpListener, requested: SocketAddr) {
        let addr = listener.local_addr().unwrap_or(requested);
        info!(app = %self.state.app_name(), addr = %addr, "relay server listening");
    }
}

async fn bind(addr: SocketAddr) -> ServerResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::BindFailed(addr, e))
}
