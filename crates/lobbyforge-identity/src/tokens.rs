//! Session tokens handed out on login.
//!
//! The token is opaque to everything in Lobbyforge: the auth service asks a
//! [`TokenIssuer`] for one and returns it to the caller. [`SessionTokens`]
//! issues random tokens and remembers which user each one belongs to.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::future::Future;

use lobbyforge_protocol::{User, UserId};
use rand::Rng;
use tokio::sync::RwLock;

use crate::IdentityError;

/// Issues a session token for an authenticated user.
pub trait TokenIssuer: Send + Sync + 'static {
    fn issue(&self, user: &User) -> impl Future<Output = Result<String, IdentityError>> + Send;
}

/// Random 256-bit tokens, hex encoded, kept in memory.
#[derive(Default)]
pub struct SessionTokens {
    sessions: RwLock<HashMap<String, UserId>>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user a token was issued to, if it was issued here.
    pub async fn user_for(&self, token: &str) -> Option<UserId> {
        self.sessions.read().await.get(token).copied()
    }

    /// Forgets a token. Returns `false` if it was unknown.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens").finish_non_exhaustive()
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

impl TokenIssuer for SessionTokens {
    async fn issue(&self, user: &User) -> Result<String, IdentityError> {
        let token = random_token();
        self.sessions.write().await.insert(token.clone(), user.id);
        tracing::debug!(user_id = %user.id, "session token issued");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: UserId(1),
            username: "alice".into(),
        }
    }

    #[tokio::test]
    async fn test_issued_token_maps_back_to_user() {
        let tokens = SessionTokens::new();

        let token = tokens.issue(&alice()).await.unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(tokens.user_for(&token).await, Some(UserId(1)));
    }

    #[tokio::test]
    async fn test_every_login_gets_a_fresh_token() {
        let tokens = SessionTokens::new();

        let first = tokens.issue(&alice()).await.unwrap();
        let second = tokens.issue(&alice()).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_revoked_token_is_forgotten() {
        let tokens = SessionTokens::new();
        let token = tokens.issue(&alice()).await.unwrap();

        assert!(tokens.revoke(&token).await);
        assert!(!tokens.revoke(&token).await);
        assert_eq!(tokens.user_for(&token).await, None);
    }
}
