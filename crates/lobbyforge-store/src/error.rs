//! Error types for the store layer.

use lobbyforge_protocol::{LobbyId, LobbyStatus, UserId};

/// Errors that can occur during store operations.
///
/// Each variant is the most specific condition the store could detect;
/// the engine decides which ones are the caller's fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A lobby with this id exists, or existed and was deleted.
    #[error("lobby {0} already exists")]
    AlreadyExists(LobbyId),

    /// The lobby does not exist.
    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    /// Every seat in the lobby is taken.
    #[error("lobby {0} roster is full")]
    RosterFull(LobbyId),

    /// The player already holds a seat in this lobby.
    #[error("player {1} already seated in lobby {0}")]
    AlreadySeated(LobbyId, UserId),

    /// The lobby has left `Waiting` and takes no more players.
    #[error("lobby {0} is {1}, not accepting players")]
    NotWaiting(LobbyId, LobbyStatus),

    /// The player holds no seat in this lobby.
    #[error("player {1} not seated in lobby {0}")]
    NotSeated(LobbyId, UserId),

    /// The status change would move the lobby backwards (or nowhere).
    #[error("lobby {lobby_id} cannot move from {from} to {to}")]
    InvalidTransition {
        lobby_id: LobbyId,
        from: LobbyStatus,
        to: LobbyStatus,
    },

    /// A stored row could not be turned back into a lobby.
    #[error("corrupt lobby data: {0}")]
    Corrupt(String),

    /// The database driver failed.
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
