//! Error types for the identity layer.

use lobbyforge_protocol::UserId;

/// Errors that can occur while resolving or registering users.
///
/// The split between the `*NotFound` variants and [`Backend`](Self::Backend)
/// is load-bearing: the RPC layer answers `NotFound` for the former and
/// `Internal` for the latter, so a flaky user database never masquerades
/// as "no such user".
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No user has this username.
    #[error("user {0:?} not found")]
    UsernameNotFound(String),

    /// No user has this id.
    #[error("user {0} not found")]
    IdNotFound(UserId),

    /// Registration failed because the username is already in use.
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),

    /// The username is empty or otherwise unusable.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The lookup itself failed (database down, timeout, etc.).
    #[error("identity backend failure: {0}")]
    Backend(String),
}

impl IdentityError {
    /// Returns `true` for the "entity is absent" variants.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UsernameNotFound(_) | Self::IdNotFound(_))
    }
}
