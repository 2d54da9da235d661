//! Error types for the RPC server.
//!
//! Request-level failures never show up here; they are
//! [`Status`](lobbyforge_protocol::Status) values inside the response.
//! These are the failures of the server itself.

/// Errors that can occur while starting or running the RPC server.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// The server loop failed.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}
