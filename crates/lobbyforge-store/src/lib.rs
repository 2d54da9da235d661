//! Lobby persistence for Lobbyforge.
//!
//! The store is the sole writer of lobby state. It exposes fine-grained,
//! individually atomic mutators ([`LobbyStore::add_player`],
//! [`LobbyStore::update_status`], [`LobbyStore::update_winner`]) and leaves
//! the sequencing of multi-step operations, and their compensation, to the
//! engine.
//!
//! Even so, every mutator refuses to break a lobby invariant on its own:
//!
//! - `add_player` only appends while the roster has a free seat
//! - `seat_player` appends and starts the game in one step, so no reader
//!   sees a full roster that is still `Waiting`
//! - `update_status` only moves forward through the lifecycle
//! - `update_winner` only accepts a seated player
//!
//! # Backends
//!
//! - [`MemoryLobbyStore`]: a locked `HashMap`, the default.
//! - `SqliteLobbyStore` (feature `sqlite`): two tables, with the seat limit
//!   enforced by the schema.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod record;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;

pub use error::StoreError;
pub use memory::MemoryLobbyStore;
pub use record::LobbyRecord;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLobbyStore;
pub use store::LobbyStore;
