//! Client for the lobby routes.

use lobbyforge_protocol::{
    CreateLobbyRequest, JoinLobbyRequest, ListAvailableLobbiesResponse, Lobby, LobbyId,
    ProtocolError,
};
use reqwest::Method;
use serde::de::IgnoredAny;

use crate::client::required;
use crate::{BaseClient, GatewayConfig, GatewayError};

const API: &str = "api";
const VERSION: &str = "v1";
const LOBBIES: &str = "lobbies";
/// Collides with `GET /api/v1/lobbies/available`.
const RESERVED_ID: &str = "available";

/// Rejects ids that cannot stand alone as a path segment under
/// `/api/v1/lobbies`.
fn checked_id(lobby_id: &LobbyId) -> Result<&str, GatewayError> {
    let id = lobby_id.as_str();
    if id.trim().is_empty() || matches!(id, "." | ".." | RESERVED_ID) {
        return Err(GatewayError::InvalidLobbyId(id.to_string()));
    }
    Ok(id)
}

/// A lobby body without an id is not a lobby.
fn identified(lobby: Lobby, operation: &str) -> Result<Lobby, GatewayError> {
    if lobby.lobby_id.as_str().is_empty() {
        return Err(
            ProtocolError::InvalidMessage(format!("{operation}: lobby without an id")).into(),
        );
    }
    Ok(lobby)
}

/// Calls the lobby RPCs over their HTTP mapping.
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), lobbyforge_gateway::GatewayError> {
/// use lobbyforge_gateway::{GatewayConfig, LobbyClient};
/// use lobbyforge_protocol::CreateLobbyRequest;
///
/// let client = LobbyClient::new(&GatewayConfig::new("http://127.0.0.1:8081"))?;
/// let lobby = client
///     .create_lobby(&CreateLobbyRequest {
///         name: "Friendly Match".into(),
///         username: "alice".into(),
///     })
///     .await?;
/// println!("created {}", lobby.lobby_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LobbyClient {
    base: BaseClient,
}

impl LobbyClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self::from_base(BaseClient::new(config)?))
    }

    /// Shares an existing client (and its connection pool).
    pub fn from_base(base: BaseClient) -> Self {
        Self { base }
    }

    pub async fn create_lobby(&self, request: &CreateLobbyRequest) -> Result<Lobby, GatewayError> {
        let lobby = self
            .base
            .do_request(Method::POST, &[API, VERSION, LOBBIES], Some(request))
            .await?;
        identified(required(lobby, "create lobby")?, "create lobby")
    }

    /// Joins the lobby named by `request.lobby_id`.
    ///
    /// Returns the updated lobby when the server sends one back.
    ///
    /// # Errors
    /// `InvalidLobbyId` for a blank id or one that would address another
    /// route; nothing is sent in that case.
    pub async fn join_lobby(
        &self,
        request: &JoinLobbyRequest,
    ) -> Result<Option<Lobby>, GatewayError> {
        let id = checked_id(&request.lobby_id)?;
        let lobby: Option<Lobby> = self
            .base
            .do_request(Method::PUT, &[API, VERSION, LOBBIES, id, "join"], Some(request))
            .await?;
        lobby.map(|l| identified(l, "join lobby")).transpose()
    }

    pub async fn finish_lobby(&self, lobby_id: &LobbyId) -> Result<Lobby, GatewayError> {
        let id = checked_id(lobby_id)?;
        let lobby = self
            .base
            .do_request::<(), _>(Method::PUT, &[API, VERSION, LOBBIES, id, "finish"], None)
            .await?;
        identified(required(lobby, "finish lobby")?, "finish lobby")
    }

    pub async fn get_lobby(&self, lobby_id: &LobbyId) -> Result<Lobby, GatewayError> {
        let id = checked_id(lobby_id)?;
        let lobby = self
            .base
            .do_request::<(), _>(Method::GET, &[API, VERSION, LOBBIES, id], None)
            .await?;
        identified(required(lobby, "get lobby")?, "get lobby")
    }

    /// Lobbies still waiting for players. An empty body means none.
    pub async fn list_available_lobbies(&self) -> Result<Vec<Lobby>, GatewayError> {
        let response: Option<ListAvailableLobbiesResponse> = self
            .base
            .do_request::<(), _>(Method::GET, &[API, VERSION, LOBBIES, RESERVED_ID], None)
            .await?;
        Ok(response.map(|r| r.lobbies).unwrap_or_default())
    }

    pub async fn delete_lobby(&self, lobby_id: &LobbyId) -> Result<(), GatewayError> {
        let id = checked_id(lobby_id)?;
        self.base
            .do_request::<(), IgnoredAny>(Method::DELETE, &[API, VERSION, LOBBIES, id], None)
            .await?;
        Ok(())
    }
}
