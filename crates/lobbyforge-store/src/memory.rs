//! The in-memory lobby store.
//!
//! One `RwLock` guards the whole table. Each trait method takes the lock
//! exactly once, so every mutator is atomic with respect to every other.

use std::collections::{HashMap, HashSet};

use lobbyforge_protocol::{LobbyId, LobbyStatus, MAX_PLAYERS, UserId};
use tokio::sync::RwLock;

use crate::{LobbyRecord, LobbyStore, StoreError};

#[derive(Debug, Default)]
struct Table {
    lobbies: HashMap<LobbyId, LobbyRecord>,

    /// Lobby ids in creation order, so listings are stable.
    order: Vec<LobbyId>,

    /// Ids of deleted lobbies. They can never be created again.
    tombstones: HashSet<LobbyId>,
}

impl Table {
    fn get_mut(&mut self, lobby_id: &LobbyId) -> Result<&mut LobbyRecord, StoreError> {
        self.lobbies
            .get_mut(lobby_id)
            .ok_or_else(|| StoreError::NotFound(lobby_id.clone()))
    }
}

/// A [`LobbyStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryLobbyStore {
    table: RwLock<Table>,
}

impl MemoryLobbyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live lobbies.
    pub async fn len(&self) -> usize {
        self.table.read().await.lobbies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.lobbies.is_empty()
    }
}

impl LobbyStore for MemoryLobbyStore {
    async fn create(&self, record: LobbyRecord) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let id = record.lobby_id.clone();

        if table.lobbies.contains_key(&id) || table.tombstones.contains(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        table.order.push(id.clone());
        table.lobbies.insert(id, record);
        Ok(())
    }

    async fn find_by_id(&self, lobby_id: &LobbyId) -> Result<LobbyRecord, StoreError> {
        self.table
            .read()
            .await
            .lobbies
            .get(lobby_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(lobby_id.clone()))
    }

    async fn add_player(&self, lobby_id: &LobbyId, user_id: UserId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(lobby_id)?;

        if record.has_player(user_id) {
            return Err(StoreError::AlreadySeated(lobby_id.clone(), user_id));
        }
        if record.is_full() {
            return Err(StoreError::RosterFull(lobby_id.clone()));
        }

        record.players.push(user_id);
        record.touch();
        Ok(())
    }

    async fn seat_player(
        &self,
        lobby_id: &LobbyId,
        user_id: UserId,
    ) -> Result<LobbyRecord, StoreError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(lobby_id)?;

        if record.has_player(user_id) {
            return Err(StoreError::AlreadySeated(lobby_id.clone(), user_id));
        }
        if record.is_full() {
            return Err(StoreError::RosterFull(lobby_id.clone()));
        }
        if !record.status.is_joinable() {
            return Err(StoreError::NotWaiting(lobby_id.clone(), record.status));
        }

        record.players.push(user_id);
        if record.players.len() == MAX_PLAYERS {
            record.status = LobbyStatus::InProgress;
        }
        record.touch();
        Ok(record.clone())
    }

    async fn remove_player(&self, lobby_id: &LobbyId, user_id: UserId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(lobby_id)?;

        let seat = record
            .players
            .iter()
            .position(|&p| p == user_id)
            .ok_or_else(|| StoreError::NotSeated(lobby_id.clone(), user_id))?;

        record.players.remove(seat);
        record.touch();
        Ok(())
    }

    async fn update_status(&self, lobby_id: &LobbyId, status: LobbyStatus) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(lobby_id)?;

        if !record.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                lobby_id: lobby_id.clone(),
                from: record.status,
                to: status,
            });
        }

        record.status = status;
        record.touch();
        Ok(())
    }

    async fn update_winner(
        &self,
        lobby_id: &LobbyId,
        winner: Option<UserId>,
    ) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(lobby_id)?;

        if let Some(user_id) = winner {
            if !record.has_player(user_id) {
                return Err(StoreError::NotSeated(lobby_id.clone(), user_id));
            }
        }

        record.winner_id = winner;
        record.touch();
        Ok(())
    }

    async fn list_available(&self) -> Result<Vec<LobbyRecord>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .order
            .iter()
            .filter_map(|id| table.lobbies.get(id))
            .filter(|record| record.status == LobbyStatus::Waiting)
            .cloned()
            .collect())
    }

    async fn delete(&self, lobby_id: &LobbyId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;

        if table.lobbies.remove(lobby_id).is_none() {
            return Err(StoreError::NotFound(lobby_id.clone()));
        }
        table.order.retain(|id| id != lobby_id);
        table.tombstones.insert(lobby_id.clone());
        Ok(())
    }
}
