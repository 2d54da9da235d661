//! The identity resolver hook.
//!
//! Lobbyforge doesn't own user accounts; that is the job of whatever
//! account system sits next to it (a SQL users table, an OAuth provider,
//! a test fixture). Instead it defines [`IdentityResolver`]: two lookups
//! that turn a username into a [`UserId`] and back. The engine calls it
//! when a request names a player, and the RPC layer calls it when it
//! renders usernames into a lobby snapshot.

use std::future::Future;

use lobbyforge_protocol::{User, UserId};

use crate::IdentityError;

/// Maps usernames to stable user ids and back.
///
/// `Send + Sync + 'static` because one resolver is shared by every request
/// task for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use lobbyforge_identity::{IdentityError, IdentityResolver};
/// use lobbyforge_protocol::{User, UserId};
///
/// /// Every username is "user-<n>" and resolves to id n.
/// struct NumberedUsers;
///
/// impl IdentityResolver for NumberedUsers {
///     async fn find_by_username(&self, username: &str) -> Result<User, IdentityError> {
///         let id = username
///             .strip_prefix("user-")
///             .and_then(|n| n.parse().ok())
///             .ok_or_else(|| IdentityError::UsernameNotFound(username.to_string()))?;
///         Ok(User { id: UserId(id), username: username.to_string() })
///     }
///
///     async fn find_by_id(&self, id: UserId) -> Result<User, IdentityError> {
///         Ok(User { id, username: format!("user-{}", id.0) })
///     }
/// }
/// ```
pub trait IdentityResolver: Send + Sync + 'static {
    /// Resolves a username to its user.
    ///
    /// # Returns
    /// - `Ok(User)` — the user exists
    /// - `Err(IdentityError::UsernameNotFound)` — no such user
    /// - `Err(IdentityError::Backend)` — the lookup itself failed
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<User, IdentityError>> + Send;

    /// Resolves a user id to its user.
    fn find_by_id(&self, id: UserId) -> impl Future<Output = Result<User, IdentityError>> + Send;
}

/// An identity backend that can also register new users.
///
/// Only the auth service needs this; lobby operations only ever read.
pub trait UserRegistry: IdentityResolver {
    /// Registers `username` and returns the new user.
    ///
    /// # Errors
    /// - [`IdentityError::InvalidUsername`] — blank username
    /// - [`IdentityError::UsernameTaken`] — already registered
    fn register(&self, username: &str) -> impl Future<Output = Result<User, IdentityError>> + Send;
}
