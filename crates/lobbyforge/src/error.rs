//! Unified error type for Lobbyforge.

use lobbyforge_engine::EngineError;
use lobbyforge_gateway::GatewayError;
use lobbyforge_identity::IdentityError;
use lobbyforge_protocol::ProtocolError;
use lobbyforge_rpc::RpcError;
use lobbyforge_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `lobbyforge` facade crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LobbyforgeError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The server could not start or stopped with an I/O failure.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
