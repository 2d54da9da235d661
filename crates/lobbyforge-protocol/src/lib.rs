//! Wire protocol for Lobbyforge.
//!
//! This crate defines the vocabulary every other layer shares:
//!
//! - **Types** ([`UserId`], [`LobbyId`], [`LobbyStatus`]) — identifiers
//!   and the lobby lifecycle state machine.
//! - **Messages** ([`Lobby`], [`CreateLobbyRequest`], etc.) — the RPC
//!   request/response messages, in their canonical JSON mapping.
//! - **Status** ([`Code`], [`Status`]) — RPC status codes and how they
//!   map onto HTTP statuses at the transcoding boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about storage, actors, or sockets.
//! Both the RPC server and the gateway client depend on it, which keeps
//! the two sides of the HTTP boundary speaking exactly the same JSON.
//!
//! ```text
//! Gateway (client) ──JSON──→ RPC transcoding ──→ Engine ──→ Store
//!          └────────── lobbyforge-protocol ──────────┘
//! ```

mod codec;
mod error;
mod messages;
mod status;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{
    CreateLobbyRequest, DeleteLobbyRequest, ErrorBody, FinishGameRequest,
    GetLobbyRequest, JoinLobbyRequest, ListAvailableLobbiesRequest,
    ListAvailableLobbiesResponse, Lobby, LoginUserRequest, LoginUserResponse, Player,
    RegisterUserRequest, User,
};
pub use status::{Code, Status};
pub use types::{LobbyId, LobbyStatus, MAX_PLAYERS, UserId};
