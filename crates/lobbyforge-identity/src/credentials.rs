//! Password checks behind login.
//!
//! The auth service only needs two answers from a credential backend:
//! "remember this password for this user" and "is this the right
//! password". [`CredentialStore`] is that seam. [`MemoryCredentials`]
//! keeps a salted SHA-256 digest per user in memory; anything that needs
//! a slow password hash plugs in its own store.

use std::collections::HashMap;
use std::future::Future;

use lobbyforge_protocol::UserId;
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::IdentityError;

/// Stores and checks user passwords.
pub trait CredentialStore: Send + Sync + 'static {
    /// Sets (or replaces) the password of `user_id`.
    fn set_password(
        &self,
        user_id: UserId,
        password: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Returns `Ok(false)` for a wrong password and for a user that has
    /// no password at all.
    fn verify_password(
        &self,
        user_id: UserId,
        password: &str,
    ) -> impl Future<Output = Result<bool, IdentityError>> + Send;
}

const SALT_LEN: usize = 16;

struct Salted {
    salt: [u8; SALT_LEN],
    digest: [u8; 32],
}

fn digest(salt: &[u8; SALT_LEN], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Compares without stopping at the first differing byte.
fn same_digest(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// An in-memory [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentials {
    entries: RwLock<HashMap<UserId, Salted>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentials").finish_non_exhaustive()
    }
}

impl CredentialStore for MemoryCredentials {
    async fn set_password(&self, user_id: UserId, password: &str) -> Result<(), IdentityError> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        let entry = Salted {
            digest: digest(&salt, password),
            salt,
        };

        self.entries.write().await.insert(user_id, entry);
        Ok(())
    }

    async fn verify_password(&self, user_id: UserId, password: &str) -> Result<bool, IdentityError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&user_id)
            .is_some_and(|entry| same_digest(&entry.digest, &digest(&entry.salt, password))))
    }
}
