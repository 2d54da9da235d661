//! The lobby engine: validates requests, resolves users, and routes
//! lobby writes to their actors.

use std::collections::HashMap;
use std::sync::Arc;

use lobbyforge_identity::IdentityResolver;
use lobbyforge_protocol::{LobbyId, User};
use lobbyforge_store::{LobbyRecord, LobbyStore};
use tokio::sync::{Mutex, oneshot};
use uuid::Uuid;

use crate::actor::{LobbyCommand, LobbyHandle, spawn_lobby};
use crate::{EngineConfig, EngineError, RandomWinner, WinnerPicker};

/// Entry point for every lobby operation.
///
/// Generic over its collaborators: `S` is the lobby store, `R` resolves
/// usernames, `P` picks winners. Share it between request handlers with
/// an `Arc`.
///
/// ```text
/// create ──→ store.create
/// join   ──→ lobby actor ──→ seat_player
/// finish ──→ lobby actor ──→ update_winner, update_status
/// get / list / delete ──→ store
/// ```
pub struct LobbyEngine<S, R, P = RandomWinner> {
    store: Arc<S>,
    identity: Arc<R>,
    picker: Arc<P>,
    config: EngineConfig,

    /// Running lobby actors, keyed by lobby id. An actor stops on its own
    /// once its lobby is finished or deleted, or after sitting idle for
    /// `actor_idle_timeout_ms`. Closed handles are pruned and replaced on
    /// next use.
    workers: Mutex<HashMap<LobbyId, LobbyHandle>>,
}

impl<S: LobbyStore, R: IdentityResolver> LobbyEngine<S, R, RandomWinner> {
    /// Creates an engine with the default config and a uniform random
    /// winner.
    pub fn new(store: Arc<S>, identity: Arc<R>) -> Self {
        Self {
            store,
            identity,
            picker: Arc::new(RandomWinner),
            config: EngineConfig::default(),
            workers: Mutex::new(HashMap::new()),
        }
    }
}

impl<S: LobbyStore, R: IdentityResolver, P: WinnerPicker> LobbyEngine<S, R, P> {
    /// Replaces the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the winner picker.
    pub fn with_picker<Q: WinnerPicker>(self, picker: Q) -> LobbyEngine<S, R, Q> {
        LobbyEngine {
            store: self.store,
            identity: self.identity,
            picker: Arc::new(picker),
            config: self.config,
            workers: self.workers,
        }
    }

    /// The identity resolver this engine resolves usernames with.
    pub fn identity(&self) -> &Arc<R> {
        &self.identity
    }

    /// The lobby store. Writing to it directly bypasses the lobby actors.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Creates a `Waiting` lobby with the creator in the first seat.
    ///
    /// # Errors
    /// - [`EngineError::InvalidArgument`] — blank name or username
    /// - [`EngineError::UserNotFound`] — the creator doesn't resolve
    /// - [`EngineError::Store`] — the write was refused (e.g. id collision)
    pub async fn create_lobby(
        &self,
        name: &str,
        creator_username: &str,
    ) -> Result<LobbyRecord, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidArgument(
                "lobby name must not be empty".into(),
            ));
        }
        let creator = self.resolve(creator_username).await?;

        let lobby_id = LobbyId::new(Uuid::new_v4().to_string());
        let record = LobbyRecord::new(lobby_id.clone(), name, creator.id);
        self.store.create(record.clone()).await?;

        tracing::info!(%lobby_id, creator = %creator.id, lobby_name = name, "lobby created");
        Ok(record)
    }

    /// Seats `joiner_username` in the lobby. Filling the second seat
    /// starts the game.
    ///
    /// # Errors
    /// - [`EngineError::UserNotFound`], [`EngineError::LobbyNotFound`]
    /// - [`EngineError::LobbyFull`] — both seats taken
    /// - [`EngineError::AlreadyInLobby`], [`EngineError::NotJoinable`]
    /// - [`EngineError::Store`]
    pub async fn join_lobby(
        &self,
        lobby_id: &LobbyId,
        joiner_username: &str,
    ) -> Result<LobbyRecord, EngineError> {
        check_lobby_id(lobby_id)?;
        let joiner = self.resolve(joiner_username).await?;

        let (reply, response) = oneshot::channel();
        self.submit(
            lobby_id,
            LobbyCommand::Join {
                user_id: joiner.id,
                reply,
            },
        )
        .await?;
        response
            .await
            .map_err(|_| EngineError::WorkerStopped(lobby_id.clone()))?
    }

    /// Picks a winner uniformly among the seated players and finishes the
    /// game.
    ///
    /// # Errors
    /// - [`EngineError::LobbyNotFound`]
    /// - [`EngineError::AlreadyFinished`] — the recorded winner stands
    /// - [`EngineError::EmptyRoster`]
    /// - [`EngineError::Store`], [`EngineError::Compensated`]
    pub async fn finish_game(&self, lobby_id: &LobbyId) -> Result<LobbyRecord, EngineError> {
        check_lobby_id(lobby_id)?;

        let (reply, response) = oneshot::channel();
        self.submit(lobby_id, LobbyCommand::Finish { reply }).await?;
        response
            .await
            .map_err(|_| EngineError::WorkerStopped(lobby_id.clone()))?
    }

    /// Reads one lobby.
    pub async fn get_lobby(&self, lobby_id: &LobbyId) -> Result<LobbyRecord, EngineError> {
        check_lobby_id(lobby_id)?;
        Ok(self.store.find_by_id(lobby_id).await?)
    }

    /// Every lobby still waiting for a second player. Empty is not an
    /// error.
    pub async fn list_available_lobbies(&self) -> Result<Vec<LobbyRecord>, EngineError> {
        Ok(self.store.list_available().await?)
    }

    /// Removes a lobby. Administrative; the id is never reused.
    pub async fn delete_lobby(&self, lobby_id: &LobbyId) -> Result<(), EngineError> {
        check_lobby_id(lobby_id)?;
        self.store.delete(lobby_id).await?;

        // Dropping the handle lets the actor stop once its queue is empty.
        self.workers.lock().await.remove(lobby_id);
        tracing::info!(%lobby_id, "lobby deleted");
        Ok(())
    }

    /// Number of lobby actors currently registered.
    pub async fn active_workers(&self) -> usize {
        self.workers
            .lock()
            .await
            .values()
            .filter(|h| !h.is_closed())
            .count()
    }

    async fn resolve(&self, username: &str) -> Result<User, EngineError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidArgument(
                "username must not be empty".into(),
            ));
        }
        Ok(self.identity.find_by_username(username).await?)
    }

    /// Delivers a command to the lobby's actor, spawning one if needed.
    ///
    /// An actor that retires between lookup and send hands the command
    /// back; it is then resent once to a fresh actor.
    async fn submit(&self, lobby_id: &LobbyId, command: LobbyCommand) -> Result<(), EngineError> {
        let mut command = command;
        for _ in 0..2 {
            let handle = self.worker(lobby_id).await;
            match handle.send(command).await {
                Ok(()) => return Ok(()),
                Err(returned) => command = returned,
            }
        }
        Err(EngineError::WorkerStopped(lobby_id.clone()))
    }

    async fn worker(&self, lobby_id: &LobbyId) -> LobbyHandle {
        let mut workers = self.workers.lock().await;

        if let Some(handle) = workers.get(lobby_id) {
            if !handle.is_closed() {
                return handle.clone();
            }
        }

        workers.retain(|_, handle| !handle.is_closed());
        let handle = spawn_lobby(
            lobby_id.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.picker),
            &self.config,
        );
        workers.insert(lobby_id.clone(), handle.clone());
        handle
    }
}

fn check_lobby_id(lobby_id: &LobbyId) -> Result<(), EngineError> {
    if lobby_id.is_blank() {
        return Err(EngineError::InvalidArgument(
            "lobby id must not be empty".into(),
        ));
    }
    Ok(())
}
