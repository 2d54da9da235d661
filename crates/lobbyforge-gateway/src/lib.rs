//! Protocol gateway: a typed HTTP client for the Lobbyforge RPC surface.
//!
//! Web-facing code uses [`LobbyClient`] and [`AuthClient`] instead of
//! talking to the engine directly. Both speak the canonical JSON mapping of
//! the protocol messages and share one [`BaseClient`].
//!
//! Failures keep their HTTP status: a non-2xx answer becomes
//! [`GatewayError::Api`], classified into a closed [`ApiErrorKind`].
//! The client never retries.

mod auth;
mod client;
mod config;
mod error;
mod lobby;

pub use auth::AuthClient;
pub use client::BaseClient;
pub use config::GatewayConfig;
pub use error::{Action, ApiError, ApiErrorKind, GatewayError, UNEXPECTED_ERROR_MESSAGE};
pub use lobby::LobbyClient;
