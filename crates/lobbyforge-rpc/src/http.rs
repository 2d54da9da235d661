//! HTTP/JSON transcoding for the RPC services.
//!
//! | Method | Path | RPC |
//! |---|---|---|
//! | `POST` | `/api/v1/lobbies` | `CreateLobby` |
//! | `PUT` | `/api/v1/lobbies/{id}/join` | `JoinLobby` |
//! | `PUT` | `/api/v1/lobbies/{id}/finish` | `FinishGame` |
//! | `GET` | `/api/v1/lobbies/{id}` | `GetLobby` |
//! | `GET` | `/api/v1/lobbies/available` | `ListAvailableLobbies` |
//! | `DELETE` | `/api/v1/lobbies/{id}` | `DeleteLobby` |
//! | `POST` | `/api/v1/auth/register` | `RegisterUser` |
//! | `POST` | `/api/v1/auth/login` | `LoginUser` |
//! | `GET` | `/health` | liveness check |
//!
//! Successful calls answer `200` with the response message as JSON
//! (`204` for delete). Failures answer with the status's HTTP code and an
//! [`ErrorBody`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use lobbyforge_protocol::{
    CreateLobbyRequest, DeleteLobbyRequest, ErrorBody, FinishGameRequest, GetLobbyRequest,
    JoinLobbyRequest, ListAvailableLobbiesRequest, ListAvailableLobbiesResponse, Lobby, LobbyId,
    LoginUserRequest, LoginUserResponse, RegisterUserRequest, Status, User,
};
use tower_http::trace::TraceLayer;

use crate::{AuthRpc, LobbyRpc};

/// A failed call, rendered as HTTP.
#[derive(Debug)]
pub struct StatusResponse(pub Status);

impl From<Status> for StatusResponse {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        let status = self.0;
        let http = StatusCode::from_u16(status.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if http.is_server_error() {
            tracing::warn!(code = %status.code(), message = status.message(), "request failed");
        } else {
            tracing::debug!(code = %status.code(), message = status.message(), "request rejected");
        }

        let body = ErrorBody {
            code: status.code() as i32,
            message: status.message().to_string(),
        };
        (http, Json(body)).into_response()
    }
}

type HttpResult<T> = Result<T, StatusResponse>;

/// Shared router state.
struct AppState<L, A> {
    lobby: Arc<L>,
    auth: Arc<A>,
    request_timeout: Duration,
}

impl<L, A> Clone for AppState<L, A> {
    fn clone(&self) -> Self {
        Self {
            lobby: Arc::clone(&self.lobby),
            auth: Arc::clone(&self.auth),
            request_timeout: self.request_timeout,
        }
    }
}

/// Builds the HTTP surface for the given services.
///
/// Every call is bounded by `request_timeout`; one that runs over answers
/// `504` with `DEADLINE_EXCEEDED`. Work already handed to a lobby actor
/// still completes.
pub fn router<L: LobbyRpc, A: AuthRpc>(
    lobby: Arc<L>,
    auth: Arc<A>,
    request_timeout: Duration,
) -> Router {
    let state = AppState {
        lobby,
        auth,
        request_timeout,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/lobbies", post(create_lobby::<L, A>))
        .route("/api/v1/lobbies/available", get(list_available_lobbies::<L, A>))
        .route(
            "/api/v1/lobbies/{id}",
            get(get_lobby::<L, A>).delete(delete_lobby::<L, A>),
        )
        .route("/api/v1/lobbies/{id}/join", put(join_lobby::<L, A>))
        .route("/api/v1/lobbies/{id}/finish", put(finish_game::<L, A>))
        .route("/api/v1/auth/register", post(register_user::<L, A>))
        .route("/api/v1/auth/login", post(login_user::<L, A>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Runs `call` under the request deadline.
async fn with_deadline<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, Status>>,
) -> HttpResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(StatusResponse),
        Err(_) => Err(StatusResponse(Status::deadline_exceeded(format!(
            "request did not complete within {} ms",
            limit.as_millis()
        )))),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> HttpResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| StatusResponse(Status::invalid_argument(rejection.body_text())))
}

async fn health() -> &'static str {
    "ok"
}

async fn create_lobby<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    body: Result<Json<CreateLobbyRequest>, JsonRejection>,
) -> HttpResult<Json<Lobby>> {
    let request = json_body(body)?;
    with_deadline(state.request_timeout, state.lobby.create_lobby(request))
        .await
        .map(Json)
}

async fn join_lobby<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    Path(id): Path<String>,
    body: Result<Json<JoinLobbyRequest>, JsonRejection>,
) -> HttpResult<Json<Lobby>> {
    let mut request = json_body(body)?;
    // The path names the lobby; a mismatching body field is ignored.
    request.lobby_id = LobbyId::new(id);
    with_deadline(state.request_timeout, state.lobby.join_lobby(request))
        .await
        .map(Json)
}

async fn finish_game<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    Path(id): Path<String>,
) -> HttpResult<Json<Lobby>> {
    let request = FinishGameRequest {
        lobby_id: LobbyId::new(id),
    };
    with_deadline(state.request_timeout, state.lobby.finish_game(request))
        .await
        .map(Json)
}

async fn get_lobby<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    Path(id): Path<String>,
) -> HttpResult<Json<Lobby>> {
    let request = GetLobbyRequest {
        lobby_id: LobbyId::new(id),
    };
    with_deadline(state.request_timeout, state.lobby.get_lobby(request))
        .await
        .map(Json)
}

async fn list_available_lobbies<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
) -> HttpResult<Json<ListAvailableLobbiesResponse>> {
    with_deadline(
        state.request_timeout,
        state.lobby.list_available_lobbies(ListAvailableLobbiesRequest {}),
    )
    .await
    .map(Json)
}

async fn delete_lobby<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    Path(id): Path<String>,
) -> HttpResult<StatusCode> {
    let request = DeleteLobbyRequest {
        lobby_id: LobbyId::new(id),
    };
    with_deadline(state.request_timeout, state.lobby.delete_lobby(request)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn register_user<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> HttpResult<Json<User>> {
    let request = json_body(body)?;
    tracing::debug!(?request, "register user");
    with_deadline(state.request_timeout, state.auth.register_user(request))
        .await
        .map(Json)
}

async fn login_user<L: LobbyRpc, A: AuthRpc>(
    State(state): State<AppState<L, A>>,
    body: Result<Json<LoginUserRequest>, JsonRejection>,
) -> HttpResult<Json<LoginUserResponse>> {
    let request = json_body(body)?;
    tracing::debug!(?request, "log in user");
    with_deadline(state.request_timeout, state.auth.login_user(request))
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_uses_mapped_http_code() {
        let response = StatusResponse(Status::failed_precondition("lobby is full")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = StatusResponse(Status::not_found("lobby x not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = StatusResponse(Status::deadline_exceeded("slow")).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_deadline_turns_into_deadline_exceeded() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Status>(())
        };

        let result = with_deadline(Duration::from_millis(10), slow).await;

        let StatusResponse(status) = result.unwrap_err();
        assert_eq!(status.code(), lobbyforge_protocol::Code::DeadlineExceeded);
    }
}
