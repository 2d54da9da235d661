//! Wires the layers together from a [`Config`].

use std::sync::Arc;

use lobbyforge_engine::LobbyEngine;
use lobbyforge_identity::UserDirectory;
use lobbyforge_rpc::{AuthService, LobbyService, RpcServer};
use lobbyforge_store::{LobbyStore, MemoryLobbyStore};

use crate::{Config, LobbyforgeError, StoreKind};

/// Builds the store, identity directory, engine, and services named by
/// `config` and binds the RPC server.
pub async fn build_server(config: &Config) -> Result<RpcServer, LobbyforgeError> {
    let users = Arc::new(UserDirectory::with_users(&config.seed_users)?);

    match config.store {
        StoreKind::Memory => assemble(Arc::new(MemoryLobbyStore::new()), users, config).await,
        StoreKind::Sqlite => sqlite_server(users, config).await,
    }
}

#[cfg(feature = "sqlite")]
async fn sqlite_server(
    users: Arc<UserDirectory>,
    config: &Config,
) -> Result<RpcServer, LobbyforgeError> {
    let store = lobbyforge_store::SqliteLobbyStore::connect(&config.database_url).await?;
    assemble(Arc::new(store), users, config).await
}

#[cfg(not(feature = "sqlite"))]
async fn sqlite_server(
    _users: Arc<UserDirectory>,
    _config: &Config,
) -> Result<RpcServer, LobbyforgeError> {
    Err(LobbyforgeError::InvalidConfig(
        "store = \"sqlite\" requires the `sqlite` feature".into(),
    ))
}

async fn assemble<S: LobbyStore>(
    store: Arc<S>,
    users: Arc<UserDirectory>,
    config: &Config,
) -> Result<RpcServer, LobbyforgeError> {
    let engine = LobbyEngine::new(store, Arc::clone(&users)).with_config(config.engine_config());
    let lobby = Arc::new(LobbyService::new(Arc::new(engine)));
    let auth = Arc::new(AuthService::new(users));

    let server = RpcServer::builder()
        .bind(&config.bind_addr)
        .request_timeout(config.request_timeout())
        .build(lobby, auth)
        .await?;

    tracing::info!(
        store = ?config.store,
        seeded = config.seed_users.len(),
        "lobbyforge assembled"
    );
    Ok(server)
}
