//! `RpcServer` builder and serve loop.
//!
//! Ties the services to a listening socket:
//! HTTP → router → services → engine → store.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::{AuthRpc, LobbyRpc, RpcError, router};

/// Builder for configuring and starting the RPC server.
///
/// # Example
///
/// ```rust,ignore
/// let server = RpcServer::builder()
///     .bind("0.0.0.0:8081")
///     .request_timeout(Duration::from_secs(5))
///     .build(lobby_service, auth_service)
///     .await?;
/// server.run().await
/// ```
pub struct RpcServerBuilder {
    bind_addr: String,
    request_timeout: Duration,
}

impl RpcServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8081".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the address to bind the server to. Port `0` picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-request deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Binds the socket and wires the services into the router.
    pub async fn build<L: LobbyRpc, A: AuthRpc>(
        self,
        lobby: Arc<L>,
        auth: Arc<A>,
    ) -> Result<RpcServer, RpcError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|source| RpcError::Bind {
                addr: self.bind_addr.clone(),
                source,
            })?;

        Ok(RpcServer {
            listener,
            app: router(lobby, auth, self.request_timeout),
        })
    }
}

impl Default for RpcServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound RPC server. Call [`run()`](Self::run) to start serving.
pub struct RpcServer {
    listener: TcpListener,
    app: Router,
}

impl RpcServer {
    /// Creates a new builder.
    pub fn builder() -> RpcServerBuilder {
        RpcServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until the process is terminated.
    pub async fn run(self) -> Result<(), RpcError> {
        self.run_until(std::future::pending()).await
    }

    /// Serves until `shutdown` resolves, then stops accepting connections
    /// and lets in-flight requests finish.
    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "lobbyforge RPC server listening");
        }

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(RpcError::Serve)?;

        tracing::info!("lobbyforge RPC server stopped");
        Ok(())
    }
}
