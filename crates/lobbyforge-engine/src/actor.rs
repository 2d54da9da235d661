//! Lobby actor: an isolated Tokio task that serializes one lobby's writes.
//!
//! Each active lobby gets its own task, fed through an mpsc channel. Join
//! and finish both read the lobby, check it, and then write; running them
//! one at a time inside the actor means no other join or finish on the
//! same lobby can slip in between the check and the write.
//!
//! A join is a single [`LobbyStore::seat_player`] call. A finish is two
//! writes, winner then status, and undoes the winner if the status write
//! fails.
//!
//! The actor holds no lobby state of its own. Every command re-reads the
//! store first.

use std::sync::Arc;
use std::time::Duration;

use lobbyforge_protocol::{LobbyId, LobbyStatus, UserId};
use lobbyforge_store::{LobbyRecord, LobbyStore, StoreError};
use tokio::sync::{mpsc, oneshot};

use crate::{EngineConfig, EngineError, WinnerPicker};

type Reply = oneshot::Sender<Result<LobbyRecord, EngineError>>;

/// Commands sent to a lobby actor through its channel.
pub(crate) enum LobbyCommand {
    /// Seat a player.
    Join { user_id: UserId, reply: Reply },

    /// Pick a winner and finish the game.
    Finish { reply: Reply },
}

/// Handle to a running lobby actor.
///
/// Cheap to clone. The engine's registry holds one per active lobby.
#[derive(Clone)]
pub(crate) struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// Queues a command. Hands the command back if the actor has stopped
    /// accepting work, so the caller can resend it to a fresh actor.
    pub(crate) async fn send(&self, command: LobbyCommand) -> Result<(), LobbyCommand> {
        self.sender.send(command).await.map_err(|e| e.0)
    }

    /// Returns `true` once the actor has stopped accepting commands.
    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct LobbyActor<S, P> {
    lobby_id: LobbyId,
    store: Arc<S>,
    picker: Arc<P>,
    receiver: mpsc::Receiver<LobbyCommand>,
    idle_timeout: Duration,

    /// Set once the lobby is finished or gone, or the actor has sat idle
    /// for `idle_timeout`. The actor then stops.
    retired: bool,
}

impl<S: LobbyStore, P: WinnerPicker> LobbyActor<S, P> {
    async fn run(mut self) {
        tracing::debug!(lobby_id = %self.lobby_id, "lobby actor started");

        loop {
            match tokio::time::timeout(self.idle_timeout, self.receiver.recv()).await {
                Ok(Some(command)) => self.dispatch(command).await,
                Ok(None) => break,
                Err(_) => {
                    tracing::debug!(lobby_id = %self.lobby_id, "lobby actor idle");
                    self.retired = true;
                }
            }

            if self.retired {
                // Refuse new work, but answer what is already queued.
                self.receiver.close();
                while let Some(command) = self.receiver.recv().await {
                    self.dispatch(command).await;
                }
                break;
            }
        }

        tracing::debug!(lobby_id = %self.lobby_id, "lobby actor stopped");
    }

    async fn dispatch(&mut self, command: LobbyCommand) {
        match command {
            LobbyCommand::Join { user_id, reply } => {
                let result = self.handle_join(user_id).await;
                let _ = reply.send(result);
            }
            LobbyCommand::Finish { reply } => {
                let result = self.handle_finish().await;
                let _ = reply.send(result);
            }
        }
    }

    async fn load(&mut self) -> Result<LobbyRecord, EngineError> {
        match self.store.find_by_id(&self.lobby_id).await {
            Ok(record) => {
                if record.status.is_terminal() {
                    self.retired = true;
                }
                Ok(record)
            }
            Err(StoreError::NotFound(id)) => {
                self.retired = true;
                Err(EngineError::LobbyNotFound(id))
            }
            Err(e) => Err(EngineError::Store(e)),
        }
    }

    async fn handle_join(&mut self, user_id: UserId) -> Result<LobbyRecord, EngineError> {
        let record = self.load().await?;
        let lobby_id = record.lobby_id.clone();

        if record.has_player(user_id) {
            return Err(EngineError::AlreadyInLobby(user_id, lobby_id));
        }
        if record.is_full() {
            tracing::warn!(%lobby_id, %user_id, "join refused, lobby is full");
            return Err(EngineError::LobbyFull(lobby_id));
        }
        if !record.status.is_joinable() {
            tracing::warn!(%lobby_id, %user_id, status = %record.status, "join refused");
            return Err(EngineError::NotJoinable {
                lobby_id,
                status: record.status,
            });
        }

        // One store step: take the seat, and start the game if it was the
        // last one.
        let record = match self.store.seat_player(&lobby_id, user_id).await {
            Ok(record) => record,
            Err(StoreError::RosterFull(_)) => return Err(EngineError::LobbyFull(lobby_id)),
            Err(StoreError::AlreadySeated(..)) => {
                return Err(EngineError::AlreadyInLobby(user_id, lobby_id));
            }
            Err(StoreError::NotWaiting(_, status)) => {
                return Err(EngineError::NotJoinable { lobby_id, status });
            }
            Err(StoreError::NotFound(id)) => {
                self.retired = true;
                return Err(EngineError::LobbyNotFound(id));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            %lobby_id,
            %user_id,
            players = record.players.len(),
            status = %record.status,
            "player joined"
        );
        Ok(record)
    }

    async fn handle_finish(&mut self) -> Result<LobbyRecord, EngineError> {
        let mut record = self.load().await?;
        let lobby_id = record.lobby_id.clone();

        if record.status.is_terminal() {
            tracing::warn!(%lobby_id, "finish refused, game already finished");
            return Err(EngineError::AlreadyFinished(lobby_id));
        }
        if record.players.is_empty() {
            return Err(EngineError::EmptyRoster(lobby_id));
        }

        // Out-of-range picks wrap around the roster.
        let seat = self.picker.pick(record.players.len()) % record.players.len();
        let winner = record.players[seat];

        self.store.update_winner(&lobby_id, Some(winner)).await?;

        if let Err(cause) = self.store.update_status(&lobby_id, LobbyStatus::Finished).await {
            let undo = self.store.update_winner(&lobby_id, None).await;
            return Err(compensated(lobby_id, "finish game", cause, undo));
        }

        record.winner_id = Some(winner);
        record.status = LobbyStatus::Finished;
        self.retired = true;

        tracing::info!(%lobby_id, winner_id = %winner, "game finished");
        Ok(record)
    }
}

/// Builds the error for a failed second step, logging the outcome of the
/// undo.
fn compensated(
    lobby_id: LobbyId,
    step: &'static str,
    cause: StoreError,
    undo: Result<(), StoreError>,
) -> EngineError {
    let rolled_back = match undo {
        Ok(()) => {
            tracing::warn!(%lobby_id, step, error = %cause, "second write failed, first write undone");
            true
        }
        Err(undo_error) => {
            tracing::error!(
                %lobby_id,
                step,
                error = %cause,
                undo_error = %undo_error,
                "second write failed and undo failed, lobby left partially updated"
            );
            false
        }
    };

    EngineError::Compensated {
        lobby_id,
        step,
        cause,
        rolled_back,
    }
}

/// Spawns a lobby actor and returns a handle to it.
pub(crate) fn spawn_lobby<S: LobbyStore, P: WinnerPicker>(
    lobby_id: LobbyId,
    store: Arc<S>,
    picker: Arc<P>,
    config: &EngineConfig,
) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(config.actor_channel_size.max(1));

    let actor = LobbyActor {
        lobby_id,
        store,
        picker,
        receiver: rx,
        idle_timeout: config.actor_idle_timeout(),
        retired: false,
    };

    tokio::spawn(actor.run());

    LobbyHandle { sender: tx }
}
