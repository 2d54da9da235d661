//! # Lobbyforge
//!
//! Matchmaking lobbies for two-player games.
//!
//! Players create a lobby, a second player joins it, and finishing the game
//! records a randomly picked winner. Every change to a lobby runs through
//! its own actor, so two players racing for the last seat can never both
//! get it.
//!
//! The facade re-exports the layer crates and adds what the binary needs:
//! [`Config`], [`logging::init`], and [`build_server`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lobbyforge::prelude::*;
//!
//! # async fn run() -> Result<(), LobbyforgeError> {
//! let config = Config::load()?;
//! let server = build_server(&config).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
pub mod logging;

pub use app::build_server;
pub use config::{CONFIG_FILE, Config, ENV_PREFIX, LogFormat, StoreKind};
pub use error::LobbyforgeError;

pub use lobbyforge_engine as engine;
pub use lobbyforge_gateway as gateway;
pub use lobbyforge_identity as identity;
pub use lobbyforge_protocol as protocol;
pub use lobbyforge_rpc as rpc;
pub use lobbyforge_store as store;

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{Config, LobbyforgeError, LogFormat, StoreKind, build_server};

    pub use lobbyforge_engine::{EngineConfig, LobbyEngine, RandomWinner, SeededWinner, WinnerPicker};
    pub use lobbyforge_gateway::{
        Action, ApiError, ApiErrorKind, AuthClient, GatewayConfig, GatewayError, LobbyClient,
    };
    pub use lobbyforge_identity::{
        CredentialStore, IdentityResolver, MemoryCredentials, SessionTokens, TokenIssuer,
        UserDirectory, UserRegistry,
    };
    pub use lobbyforge_protocol::{
        CreateLobbyRequest, JoinLobbyRequest, Lobby, LobbyId, LobbyStatus, LoginUserRequest,
        LoginUserResponse, MAX_PLAYERS, Player, RegisterUserRequest, User, UserId,
    };
    pub use lobbyforge_rpc::{AuthService, LobbyService, RpcServer};
    pub use lobbyforge_store::{LobbyRecord, LobbyStore, MemoryLobbyStore};
}
