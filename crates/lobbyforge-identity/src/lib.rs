//! User identity for Lobbyforge.
//!
//! The lobby core never authenticates anyone. By the time a request reaches
//! it, the web-facing layer has already validated credentials and hands over
//! a plain *username*. This crate is the seam where that username becomes a
//! stable [`UserId`](lobbyforge_protocol::UserId):
//!
//! 1. **Resolution** — [`IdentityResolver`] maps username ⇄ user id. The
//!    engine and the RPC layer consume only this trait.
//! 2. **Registration** — [`UserRegistry`] adds users. Only the auth RPC
//!    uses it; the lobby core never creates users.
//! 3. **A default backend** — [`UserDirectory`], an in-memory directory
//!    good for tests, demos and single-process deployments.
//! 4. **Login collaborators** — [`CredentialStore`] checks passwords and
//!    [`TokenIssuer`] hands out session tokens. Only the auth RPC uses
//!    them; [`MemoryCredentials`] and [`SessionTokens`] are the in-memory
//!    defaults.
//!
//! # How it fits in the stack
//!
//! ```text
//! Engine / RPC layer  ← resolve usernames for lobby operations and snapshots
//!     ↕
//! Identity layer (this crate)
//!     ↕
//! Protocol layer      ← provides UserId and the User message
//! ```

#![allow(async_fn_in_trait)]

mod credentials;
mod directory;
mod error;
mod resolver;
mod tokens;

pub use credentials::{CredentialStore, MemoryCredentials};
pub use directory::UserDirectory;
pub use error::IdentityError;
pub use resolver::{IdentityResolver, UserRegistry};
pub use tokens::{SessionTokens, TokenIssuer};
