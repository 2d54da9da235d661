//! Error types for the engine layer.

use lobbyforge_identity::IdentityError;
use lobbyforge_protocol::{LobbyId, LobbyStatus, UserId};
use lobbyforge_store::StoreError;

/// Errors that can occur during lobby operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed input: blank name, username or lobby id.
    #[error("{0}")]
    InvalidArgument(String),

    /// The named user does not exist.
    #[error("user {0} not found")]
    UserNotFound(String),

    /// The lobby does not exist.
    #[error("lobby {0} not found")]
    LobbyNotFound(LobbyId),

    /// Both seats are taken.
    #[error("lobby is full")]
    LobbyFull(LobbyId),

    /// The joiner already holds a seat in this lobby.
    #[error("player already in lobby")]
    AlreadyInLobby(UserId, LobbyId),

    /// The lobby has a free seat but is no longer waiting for players.
    #[error("lobby is not accepting players")]
    NotJoinable { lobby_id: LobbyId, status: LobbyStatus },

    /// The game was already finished; the recorded winner stands.
    #[error("game already finished")]
    AlreadyFinished(LobbyId),

    /// Nobody is seated, so nobody can win.
    #[error("lobby has no players")]
    EmptyRoster(LobbyId),

    /// The identity lookup itself failed. Not the same as "no such user".
    #[error("identity lookup failed: {0}")]
    Identity(IdentityError),

    /// A store call failed.
    #[error("store failure: {0}")]
    Store(StoreError),

    /// The second step of a two-step update failed after the first had
    /// been applied. `rolled_back` says whether the first step was undone.
    #[error("lobby {lobby_id}: {step} failed: {cause} ({})", rollback_note(.rolled_back))]
    Compensated {
        lobby_id: LobbyId,
        step: &'static str,
        cause: StoreError,
        rolled_back: bool,
    },

    /// The lobby's actor went away before replying.
    #[error("lobby {0} worker stopped")]
    WorkerStopped(LobbyId),
}

fn rollback_note(rolled_back: &bool) -> &'static str {
    if *rolled_back {
        "first step rolled back"
    } else {
        "rollback failed"
    }
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::LobbyNotFound(_))
    }

    /// Valid request, but the lobby's current state forbids it.
    pub fn is_failed_precondition(&self) -> bool {
        matches!(
            self,
            Self::LobbyFull(_)
                | Self::AlreadyInLobby(..)
                | Self::NotJoinable { .. }
                | Self::AlreadyFinished(_)
                | Self::EmptyRoster(_)
        )
    }
}

impl From<IdentityError> for EngineError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UsernameNotFound(name) => Self::UserNotFound(name),
            IdentityError::IdNotFound(id) => Self::UserNotFound(id.to_string()),
            other => Self::Identity(other),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(lobby_id) => Self::LobbyNotFound(lobby_id),
            other => Self::Store(other),
        }
    }
}
