//! Integration tests for the HTTP surface: a real server on a free port,
//! driven with plain HTTP requests.

use std::sync::Arc;
use std::time::Duration;

use lobbyforge_engine::{LobbyEngine, RandomWinner};
use lobbyforge_identity::UserDirectory;
use lobbyforge_protocol::{
    CreateLobbyRequest, DeleteLobbyRequest, ErrorBody, FinishGameRequest, GetLobbyRequest,
    JoinLobbyRequest, ListAvailableLobbiesRequest, ListAvailableLobbiesResponse, Lobby,
    LobbyStatus, LoginUserResponse, RegisterUserRequest, Status,
};
use lobbyforge_rpc::{AuthService, LobbyRpc, LobbyService, RpcServer};
use lobbyforge_store::MemoryLobbyStore;
use serde_json::{Value, json};
use tokio::sync::oneshot;

type Service = LobbyService<MemoryLobbyStore, UserDirectory, RandomWinner>;

/// A running test server. Dropping it shuts the server down.
struct TestServer {
    base: String,
    client: reqwest::Client,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start_with<L: LobbyRpc>(lobby: Arc<L>, users: Arc<UserDirectory>, timeout: Duration) -> Self {
        let server = RpcServer::builder()
            .bind("127.0.0.1:0")
            .request_timeout(timeout)
            .build(lobby, Arc::new(AuthService::new(users)))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(server.run_until(async {
            let _ = rx.await;
        }));

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            _shutdown: tx,
        }
    }

    async fn start() -> Self {
        let users = Arc::new(UserDirectory::with_users(["alice", "bob", "carol"]).unwrap());
        let engine = LobbyEngine::new(Arc::new(MemoryLobbyStore::new()), Arc::clone(&users));
        let service: Arc<Service> = Arc::new(LobbyService::new(Arc::new(engine)));
        Self::start_with(service, users, Duration::from_secs(5)).await
    }

    async fn call(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> (u16, String) {
        let mut request = self.client.request(method, format!("{}{}", self.base, path));
        if let Some(body) = body {
            request = request
                .header("content-type", "application/json")
                .body(body.to_string());
        }
        let response = request.send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    async fn create(&self, name: &str, username: &str) -> Lobby {
        let (status, body) = self
            .call(
                reqwest::Method::POST,
                "/api/v1/lobbies",
                Some(json!({"name": name, "username": username})),
            )
            .await;
        assert_eq!(status, 200, "{body}");
        serde_json::from_str(&body).unwrap()
    }
}

fn error_body(raw: &str) -> ErrorBody {
    serde_json::from_str(raw).unwrap()
}

// =========================================================================
// Lobby lifecycle over HTTP
// =========================================================================

#[tokio::test]
async fn test_full_lobby_lifecycle() {
    let server = TestServer::start().await;

    let lobby = server.create("Friendly Match", "alice").await;
    assert_eq!(lobby.status, LobbyStatus::Waiting);
    assert_eq!(lobby.players[0].username, "alice");

    let path = format!("/api/v1/lobbies/{}/join", lobby.lobby_id);
    let (status, body) = server
        .call(reqwest::Method::PUT, &path, Some(json!({"username": "bob"})))
        .await;
    assert_eq!(status, 200, "{body}");
    let joined: Lobby = serde_json::from_str(&body).unwrap();
    assert_eq!(joined.status, LobbyStatus::InProgress);
    assert_eq!(joined.players.len(), 2);

    let (status, body) = server
        .call(reqwest::Method::PUT, &path, Some(json!({"username": "carol"})))
        .await;
    assert_eq!(status, 409);
    assert_eq!(error_body(&body).message, "lobby is full");

    let path = format!("/api/v1/lobbies/{}/finish", lobby.lobby_id);
    let (status, body) = server.call(reqwest::Method::PUT, &path, Some(json!({}))).await;
    assert_eq!(status, 200, "{body}");
    let finished: Lobby = serde_json::from_str(&body).unwrap();
    assert_eq!(finished.status, LobbyStatus::Finished);
    let winner = finished.winner_username.unwrap();
    assert!(winner == "alice" || winner == "bob");

    let path = format!("/api/v1/lobbies/{}", lobby.lobby_id);
    let (status, body) = server.call(reqwest::Method::GET, &path, None).await;
    assert_eq!(status, 200);
    let fetched: Lobby = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.winner_id, finished.winner_id);
}

#[tokio::test]
async fn test_join_uses_path_lobby_id() {
    let server = TestServer::start().await;
    let lobby = server.create("Match", "alice").await;

    let path = format!("/api/v1/lobbies/{}/join", lobby.lobby_id);
    let (status, _) = server
        .call(
            reqwest::Method::PUT,
            &path,
            Some(json!({"lobbyId": "something-else", "username": "bob"})),
        )
        .await;

    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_available_lists_only_waiting_lobbies() {
    let server = TestServer::start().await;

    let (status, body) = server
        .call(reqwest::Method::GET, "/api/v1/lobbies/available", None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body, "{}");

    let open = server.create("Open", "alice").await;
    let full = server.create("Full", "bob").await;
    let path = format!("/api/v1/lobbies/{}/join", full.lobby_id);
    server
        .call(reqwest::Method::PUT, &path, Some(json!({"username": "carol"})))
        .await;

    let (_, body) = server
        .call(reqwest::Method::GET, "/api/v1/lobbies/available", None)
        .await;
    let listed: ListAvailableLobbiesResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(listed.lobbies.len(), 1);
    assert_eq!(listed.lobbies[0].lobby_id, open.lobby_id);
}

#[tokio::test]
async fn test_error_statuses() {
    let server = TestServer::start().await;

    let (status, body) = server
        .call(reqwest::Method::GET, "/api/v1/lobbies/missing", None)
        .await;
    assert_eq!(status, 404);
    assert_eq!(error_body(&body).code, 5);

    let (status, _) = server
        .call(
            reqwest::Method::POST,
            "/api/v1/lobbies",
            Some(json!({"name": "  ", "username": "alice"})),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = server
        .call(
            reqwest::Method::POST,
            "/api/v1/lobbies",
            Some(json!({"name": "Match", "username": "mallory"})),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let server = TestServer::start().await;

    let response = server
        .client
        .post(format!("{}/api/v1/lobbies", server.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body = error_body(&response.text().await.unwrap());
    assert_eq!(body.code, 3);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let server = TestServer::start().await;
    let lobby = server.create("Doomed", "alice").await;
    let path = format!("/api/v1/lobbies/{}", lobby.lobby_id);

    let (status, body) = server.call(reqwest::Method::DELETE, &path, None).await;
    assert_eq!(status, 204);
    assert!(body.is_empty());

    let (status, _) = server.call(reqwest::Method::GET, &path, None).await;
    assert_eq!(status, 404);
}

// =========================================================================
// Auth and health
// =========================================================================

#[tokio::test]
async fn test_register_conflict_is_409() {
    let server = TestServer::start().await;
    let body = json!({"username": "dave", "password": "pw"});

    let (status, first) = server
        .call(reqwest::Method::POST, "/api/v1/auth/register", Some(body.clone()))
        .await;
    assert_eq!(status, 200, "{first}");

    let (status, second) = server
        .call(reqwest::Method::POST, "/api/v1/auth/register", Some(body))
        .await;
    assert_eq!(status, 409);
    assert_eq!(error_body(&second).message, "username already taken");

    // The new user can create lobbies straight away.
    server.create("Dave's game", "dave").await;
}

#[tokio::test]
async fn test_login_after_register() {
    let server = TestServer::start().await;
    let (status, body) = server
        .call(
            reqwest::Method::POST,
            "/api/v1/auth/register",
            Some(json!({"username": "dave", "password": "pw"})),
        )
        .await;
    assert_eq!(status, 200, "{body}");

    let (status, body) = server
        .call(
            reqwest::Method::POST,
            "/api/v1/auth/login",
            Some(json!({"username": "dave", "password": "pw"})),
        )
        .await;
    assert_eq!(status, 200, "{body}");
    let response: LoginUserResponse = serde_json::from_str(&body).unwrap();
    assert!(!response.token.is_empty());
    assert_eq!(response.user.unwrap().username, "dave");
}

#[tokio::test]
async fn test_bad_login_is_401() {
    let server = TestServer::start().await;
    server
        .call(
            reqwest::Method::POST,
            "/api/v1/auth/register",
            Some(json!({"username": "dave", "password": "pw"})),
        )
        .await;

    for body in [
        json!({"username": "dave", "password": "wrong"}),
        json!({"username": "nobody", "password": "pw"}),
    ] {
        let (status, text) = server
            .call(reqwest::Method::POST, "/api/v1/auth/login", Some(body))
            .await;
        assert_eq!(status, 401, "{text}");
        let error = error_body(&text);
        assert_eq!(error.code, 16);
        assert_eq!(error.message, "invalid credentials");
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let (status, body) = server.call(reqwest::Method::GET, "/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}

// =========================================================================
// Deadlines
// =========================================================================

/// A lobby service that never answers in time.
struct StalledLobbies;

impl LobbyRpc for StalledLobbies {
    async fn create_lobby(&self, _request: CreateLobbyRequest) -> Result<Lobby, Status> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Lobby::default())
    }

    async fn join_lobby(&self, _request: JoinLobbyRequest) -> Result<Lobby, Status> {
        Err(Status::internal("unused"))
    }

    async fn finish_game(&self, _request: FinishGameRequest) -> Result<Lobby, Status> {
        Err(Status::internal("unused"))
    }

    async fn get_lobby(&self, _request: GetLobbyRequest) -> Result<Lobby, Status> {
        Err(Status::internal("unused"))
    }

    async fn list_available_lobbies(
        &self,
        _request: ListAvailableLobbiesRequest,
    ) -> Result<ListAvailableLobbiesResponse, Status> {
        Ok(ListAvailableLobbiesResponse::default())
    }

    async fn delete_lobby(&self, _request: DeleteLobbyRequest) -> Result<(), Status> {
        Err(Status::internal("unused"))
    }
}

#[tokio::test]
async fn test_slow_call_times_out_with_504() {
    let users = Arc::new(UserDirectory::new());
    let server =
        TestServer::start_with(Arc::new(StalledLobbies), users, Duration::from_millis(50)).await;

    let (status, body) = server
        .call(
            reqwest::Method::POST,
            "/api/v1/lobbies",
            Some(json!({"name": "Match", "username": "alice"})),
        )
        .await;

    assert_eq!(status, 504);
    assert_eq!(error_body(&body).code, 4);
}

#[tokio::test]
async fn test_register_request_never_echoes_password() {
    let request = RegisterUserRequest {
        username: "frank".into(),
        password: "letmein".into(),
    };
    assert!(!format!("{request:?}").contains("letmein"));
}
