//! The lobby engine for Lobbyforge.
//!
//! Owns the lobby lifecycle and its business rules:
//!
//! ```text
//! Waiting ──join (2nd player)──→ InProgress ──finish──→ Finished
//!    └──────────────────finish (creator alone)───────────────┘
//! ```
//!
//! # Key types
//!
//! - [`LobbyEngine`] — create, join, finish, get, list and delete lobbies
//! - [`WinnerPicker`] — where the winner's seat comes from
//! - [`EngineConfig`] — actor channel sizing
//! - [`EngineError`] — every way an operation can be refused or fail
//!
//! # Concurrency
//!
//! Join and finish on a given lobby are serialized through a per-lobby
//! actor task, so the roster check and the roster update can never
//! interleave with another join on the same lobby. Reads go straight to
//! the store, which seats a player and starts the game in one atomic step.
//!
//! Actors are spawned on demand and stop once their lobby is finished,
//! deleted, or idle for [`EngineConfig::actor_idle_timeout_ms`].

mod actor;
mod config;
mod engine;
mod error;
mod picker;

pub use config::EngineConfig;
pub use engine::LobbyEngine;
pub use error::EngineError;
pub use picker::{RandomWinner, SeededWinner, WinnerPicker};
