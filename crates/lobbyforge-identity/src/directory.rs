//! The in-memory user directory.
//!
//! A registry of every known user, indexed both ways so each lookup the
//! resolver needs is a single hash lookup. User ids are assigned from a
//! counter starting at 1; id 0 is never handed out, so a defaulted
//! `UserId` on the wire can't collide with a real user.

use std::collections::HashMap;

use lobbyforge_protocol::{User, UserId};
use tokio::sync::RwLock;

use crate::{IdentityError, IdentityResolver, UserRegistry};

/// The two indexes, kept in sync under one lock.
#[derive(Debug, Default)]
struct Inner {
    /// Usernames keyed by id.
    users: HashMap<UserId, String>,

    /// Ids keyed by username. Usernames are unique and case-sensitive.
    ids: HashMap<String, UserId>,

    /// The last id handed out.
    last_id: u32,
}

impl Inner {
    fn insert(&mut self, username: &str) -> Result<User, IdentityError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(IdentityError::InvalidUsername(
                "username must not be empty".into(),
            ));
        }
        if self.ids.contains_key(username) {
            return Err(IdentityError::UsernameTaken(username.to_string()));
        }

        self.last_id += 1;
        let id = UserId(self.last_id);
        self.users.insert(id, username.to_string());
        self.ids.insert(username.to_string(), id);

        Ok(User {
            id,
            username: username.to_string(),
        })
    }
}

/// An in-memory [`IdentityResolver`] and [`UserRegistry`].
///
/// Reads take a shared lock; only registration takes the write lock.
#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<Inner>,
}

impl UserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory pre-populated with `usernames`, assigning ids
    /// 1, 2, 3… in iteration order.
    ///
    /// # Errors
    /// Fails on the first blank or duplicate username.
    pub fn with_users<I, S>(usernames: I) -> Result<Self, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inner = Inner::default();
        for username in usernames {
            inner.insert(username.as_ref())?;
        }
        tracing::debug!(users = inner.users.len(), "user directory seeded");
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users.is_empty()
    }
}

impl IdentityResolver for UserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<User, IdentityError> {
        let inner = self.inner.read().await;
        let id = inner
            .ids
            .get(username)
            .copied()
            .ok_or_else(|| IdentityError::UsernameNotFound(username.to_string()))?;
        Ok(User {
            id,
            username: username.to_string(),
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, IdentityError> {
        let inner = self.inner.read().await;
        let username = inner
            .users
            .get(&id)
            .cloned()
            .ok_or(IdentityError::IdNotFound(id))?;
        Ok(User { id, username })
    }
}

impl UserRegistry for UserDirectory {
    async fn register(&self, username: &str) -> Result<User, IdentityError> {
        let user = self.inner.write().await.insert(username)?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }
}

// =========================================================================
// Tests
// =========================================================================
