//! The stored form of a lobby.

use chrono::{DateTime, Utc};
use lobbyforge_protocol::{LobbyId, LobbyStatus, MAX_PLAYERS, UserId};

/// A lobby as the store keeps it: user ids only, no usernames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyRecord {
    pub lobby_id: LobbyId,
    pub name: String,
    /// Seated players in seat order. Never longer than [`MAX_PLAYERS`].
    pub players: Vec<UserId>,
    pub status: LobbyStatus,
    /// Set only once the lobby is `Finished`, and always one of `players`.
    pub winner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LobbyRecord {
    /// A fresh `Waiting` lobby with `creator` in the first seat.
    pub fn new(lobby_id: LobbyId, name: impl Into<String>, creator: UserId) -> Self {
        let now = Utc::now();
        Self {
            lobby_id,
            name: name.into(),
            players: vec![creator],
            status: LobbyStatus::Waiting,
            winner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_player(&self, user_id: UserId) -> bool {
        self.players.contains(&user_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
