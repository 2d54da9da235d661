//! RPC request and response messages.
//!
//! These are the messages of the lobby and auth services, in their
//! canonical JSON mapping: lowerCamelCase field names, absent optional
//! fields and empty lists omitted on encode, and every field defaulted on
//! decode. That last part matters for the gateway: a server is allowed to
//! leave out anything that is at its default value, and `{}` is a valid
//! (empty) `ListAvailableLobbiesResponse`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LobbyId, LobbyStatus, UserId};

// ---------------------------------------------------------------------------
// Lobby snapshot
// ---------------------------------------------------------------------------

/// A seated player, with the username resolved for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub id: UserId,
    pub username: String,
}

/// A serialized snapshot of a lobby.
///
/// Every successful lobby RPC returns one of these. Player and winner
/// usernames are filled in by the RPC layer from the identity resolver;
/// the store only knows user ids.
///
/// ```json
/// {
///   "lobbyId": "9b2c…",
///   "name": "Friendly Match",
///   "status": "FINISHED",
///   "players": [{"id": 1, "username": "alice"}, {"id": 2, "username": "bob"}],
///   "winnerId": 2,
///   "winnerUsername": "bob"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lobby {
    pub lobby_id: LobbyId,
    pub name: String,
    pub status: LobbyStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub players: Vec<Player>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_username: Option<String>,
}

// ---------------------------------------------------------------------------
// Lobby service requests
// ---------------------------------------------------------------------------

/// `CreateLobby(name, username)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateLobbyRequest {
    pub name: String,
    pub username: String,
}

/// `JoinLobby(lobbyId, username)`.
///
/// Over HTTP the lobby id also appears in the path; the path wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinLobbyRequest {
    pub lobby_id: LobbyId,
    pub username: String,
}

/// `FinishGame(lobbyId)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinishGameRequest {
    pub lobby_id: LobbyId,
}

/// `GetLobby(lobbyId)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetLobbyRequest {
    pub lobby_id: LobbyId,
}

/// `DeleteLobby(lobbyId)`. Administrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteLobbyRequest {
    pub lobby_id: LobbyId,
}

/// `ListAvailableLobbies()` takes no arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAvailableLobbiesRequest {}

/// The lobbies currently in `WAITING` state, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListAvailableLobbiesResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lobbies: Vec<Lobby>,
}

// ---------------------------------------------------------------------------
// Auth service
// ---------------------------------------------------------------------------

/// `RegisterUser(username, password)`.
///
/// `Debug` is implemented by hand so the password never reaches a log line.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `LoginUser(username, password)`. `Debug` redacts the password.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginUserRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A successful login: an opaque session token plus the user it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginUserResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// A registered user as returned by the auth service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The body of a non-2xx HTTP response from the transcoding layer.
///
/// `code` is the numeric RPC [`Code`](crate::Code). Clients must not rely
/// on this body being present; the HTTP status is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_lobby() -> Lobby {
        Lobby {
            lobby_id: LobbyId::new("lobby-xyz"),
            name: "Friendly Match".into(),
            status: LobbyStatus::Finished,
            players: vec![
                Player { id: UserId(1), username: "alice".into() },
                Player { id: UserId(2), username: "bob".into() },
            ],
            winner_id: Some(UserId(2)),
            winner_username: Some("bob".into()),
        }
    }

    #[test]
    fn test_lobby_uses_camel_case_field_names() {
        let json = serde_json::to_value(finished_lobby()).unwrap();

        assert_eq!(json["lobbyId"], "lobby-xyz");
        assert_eq!(json["status"], "FINISHED");
        assert_eq!(json["winnerId"], 2);
        assert_eq!(json["winnerUsername"], "bob");
        assert_eq!(json["players"][0]["username"], "alice");
    }

    #[test]
    fn test_waiting_lobby_omits_winner_fields() {
        let lobby = Lobby {
            lobby_id: LobbyId::new("l-1"),
            name: "Open".into(),
            status: LobbyStatus::Waiting,
            players: vec![Player { id: UserId(1), username: "alice".into() }],
            winner_id: None,
            winner_username: None,
        };
        let json = serde_json::to_value(&lobby).unwrap();

        assert!(json.get("winnerId").is_none());
        assert!(json.get("winnerUsername").is_none());
    }

    #[test]
    fn test_partial_lobby_decodes_with_defaults() {
        // Stub servers (and real ones) may send only a few fields.
        let lobby: Lobby =
            serde_json::from_str(r#"{"lobbyId":"new-lobby-123","name":"Test Lobby"}"#).unwrap();

        assert_eq!(lobby.lobby_id, LobbyId::new("new-lobby-123"));
        assert_eq!(lobby.status, LobbyStatus::Waiting);
        assert!(lobby.players.is_empty());
        assert_eq!(lobby.winner_id, None);
    }

    #[test]
    fn test_empty_lobby_list_encodes_as_empty_object() {
        let json = serde_json::to_string(&ListAvailableLobbiesResponse::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_join_request_wire_shape() {
        let req = JoinLobbyRequest {
            lobby_id: LobbyId::new("lobby-abc"),
            username: "player2".into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"lobbyId":"lobby-abc","username":"player2"}"#);
    }

    #[test]
    fn test_register_request_debug_redacts_password() {
        let req = RegisterUserRequest {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{req:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginUserRequest {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{req:?}").contains("hunter2"));
    }

    #[test]
    fn test_login_response_wire_shape() {
        let response = LoginUserResponse {
            token: "abc".into(),
            user: Some(User { id: UserId(3), username: "carol".into() }),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"token":"abc","user":{"id":3,"username":"carol"}}"#);
    }

    #[test]
    fn test_unknown_status_fails_to_decode() {
        let result: Result<Lobby, _> = serde_json::from_str(r#"{"status":"PAUSED"}"#);
        assert!(result.is_err());
    }
}
