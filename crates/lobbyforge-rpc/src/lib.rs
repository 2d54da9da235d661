//! RPC service layer for Lobbyforge.
//!
//! Two halves:
//!
//! - **Services** ([`LobbyService`], [`AuthService`]) take typed request
//!   messages, call the engine or the user registry, and turn every domain
//!   error into a [`Status`](lobbyforge_protocol::Status). This is the only
//!   place that mapping happens.
//! - **Transcoding** ([`router`], [`RpcServer`]) exposes the services as
//!   JSON over HTTP, turning each `Status` into an HTTP status plus an
//!   [`ErrorBody`](lobbyforge_protocol::ErrorBody).
//!
//! ```text
//! HTTP/JSON ──→ router ──→ LobbyRpc / AuthRpc ──→ engine / registry
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod http;
mod server;
mod service;

pub use error::RpcError;
pub use http::{StatusResponse, router};
pub use server::{RpcServer, RpcServerBuilder};
pub use service::{AuthRpc, AuthService, LobbyRpc, LobbyService, engine_status};
