//! The lobby store contract.

use std::future::Future;

use lobbyforge_protocol::{LobbyId, LobbyStatus, UserId};

use crate::{LobbyRecord, StoreError};

/// Durable storage for lobbies and their rosters.
///
/// Every method is atomic on its own. Nothing here spans two calls; the
/// engine sequences calls and compensates when a later one fails.
/// [`seat_player`](Self::seat_player) is the one compound mutator: a join
/// must never be observable half applied.
///
/// Implementations must be safe to call concurrently from many tasks,
/// including concurrent mutators on the same lobby.
pub trait LobbyStore: Send + Sync + 'static {
    /// Inserts a new lobby.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] if the id is present or was ever used.
    fn create(&self, record: LobbyRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Loads a lobby with its full roster and winner.
    fn find_by_id(
        &self,
        lobby_id: &LobbyId,
    ) -> impl Future<Output = Result<LobbyRecord, StoreError>> + Send;

    /// Seats `user_id` in the lobby, if a seat is free.
    ///
    /// The free-seat check and the append are one atomic step.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`]
    /// - [`StoreError::RosterFull`] — both seats taken
    /// - [`StoreError::AlreadySeated`] — player already in this lobby
    fn add_player(
        &self,
        lobby_id: &LobbyId,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Seats `user_id` in a `Waiting` lobby and, if that fills the last
    /// seat, moves the lobby to `InProgress`. Both changes land in one
    /// atomic step; returns the lobby as it now stands.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`]
    /// - [`StoreError::AlreadySeated`]
    /// - [`StoreError::RosterFull`]
    /// - [`StoreError::NotWaiting`]: the lobby has a free seat but has
    ///   already started or finished
    fn seat_player(
        &self,
        lobby_id: &LobbyId,
        user_id: UserId,
    ) -> impl Future<Output = Result<LobbyRecord, StoreError>> + Send;

    /// Removes `user_id` from the roster. Used to undo an `add_player`.
    fn remove_player(
        &self,
        lobby_id: &LobbyId,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Moves the lobby to `status`.
    ///
    /// # Errors
    /// [`StoreError::InvalidTransition`] unless the current status can move
    /// forward to `status`.
    fn update_status(
        &self,
        lobby_id: &LobbyId,
        status: LobbyStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Records the winner, or clears it with `None`.
    ///
    /// # Errors
    /// [`StoreError::NotSeated`] if the winner holds no seat.
    fn update_winner(
        &self,
        lobby_id: &LobbyId,
        winner: Option<UserId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Snapshot of every `Waiting` lobby, oldest first.
    fn list_available(&self) -> impl Future<Output = Result<Vec<LobbyRecord>, StoreError>> + Send;

    /// Removes a lobby and its roster. The id stays reserved.
    fn delete(&self, lobby_id: &LobbyId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<S: LobbyStore> LobbyStore for std::sync::Arc<S> {
    async fn create(&self, record: LobbyRecord) -> Result<(), StoreError> {
        (**self).create(record).await
    }

    async fn find_by_id(&self, lobby_id: &LobbyId) -> Result<LobbyRecord, StoreError> {
        (**self).find_by_id(lobby_id).await
    }

    async fn add_player(&self, lobby_id: &LobbyId, user_id: UserId) -> Result<(), StoreError> {
        (**self).add_player(lobby_id, user_id).await
    }

    async fn seat_player(
        &self,
        lobby_id: &LobbyId,
        user_id: UserId,
    ) -> Result<LobbyRecord, StoreError> {
        (**self).seat_player(lobby_id, user_id).await
    }

    async fn remove_player(&self, lobby_id: &LobbyId, user_id: UserId) -> Result<(), StoreError> {
        (**self).remove_player(lobby_id, user_id).await
    }

    async fn update_status(&self, lobby_id: &LobbyId, status: LobbyStatus) -> Result<(), StoreError> {
        (**self).update_status(lobby_id, status).await
    }

    async fn update_winner(
        &self,
        lobby_id: &LobbyId,
        winner: Option<UserId>,
    ) -> Result<(), StoreError> {
        (**self).update_winner(lobby_id, winner).await
    }

    async fn list_available(&self) -> Result<Vec<LobbyRecord>, StoreError> {
        (**self).list_available().await
    }

    async fn delete(&self, lobby_id: &LobbyId) -> Result<(), StoreError> {
        (**self).delete(lobby_id).await
    }
}
