//! The lobby and auth RPC services.

use std::future::Future;
use std::sync::Arc;

use lobbyforge_engine::{EngineError, LobbyEngine, WinnerPicker};
use lobbyforge_identity::{
    CredentialStore, IdentityError, IdentityResolver, MemoryCredentials, SessionTokens,
    TokenIssuer, UserRegistry,
};
use lobbyforge_protocol::{
    CreateLobbyRequest, DeleteLobbyRequest, FinishGameRequest, GetLobbyRequest,
    JoinLobbyRequest, ListAvailableLobbiesRequest, ListAvailableLobbiesResponse, Lobby,
    LoginUserRequest, LoginUserResponse, Player, RegisterUserRequest, Status, User, UserId,
};
use lobbyforge_store::{LobbyRecord, LobbyStore};

// ---------------------------------------------------------------------------
// Service traits
// ---------------------------------------------------------------------------

/// The lobby service: one method per RPC.
///
/// The HTTP router is generic over this trait, so tests can stand a fake
/// service behind the real transcoding layer.
pub trait LobbyRpc: Send + Sync + 'static {
    fn create_lobby(
        &self,
        request: CreateLobbyRequest,
    ) -> impl Future<Output = Result<Lobby, Status>> + Send;

    fn join_lobby(
        &self,
        request: JoinLobbyRequest,
    ) -> impl Future<Output = Result<Lobby, Status>> + Send;

    fn finish_game(
        &self,
        request: FinishGameRequest,
    ) -> impl Future<Output = Result<Lobby, Status>> + Send;

    fn get_lobby(
        &self,
        request: GetLobbyRequest,
    ) -> impl Future<Output = Result<Lobby, Status>> + Send;

    fn list_available_lobbies(
        &self,
        request: ListAvailableLobbiesRequest,
    ) -> impl Future<Output = Result<ListAvailableLobbiesResponse, Status>> + Send;

    fn delete_lobby(
        &self,
        request: DeleteLobbyRequest,
    ) -> impl Future<Output = Result<(), Status>> + Send;
}

/// The auth service: registration and login.
pub trait AuthRpc: Send + Sync + 'static {
    fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> impl Future<Output = Result<User, Status>> + Send;

    /// Checks credentials and issues a session token. An unknown user and
    /// a wrong password both answer `Unauthenticated`.
    fn login_user(
        &self,
        request: LoginUserRequest,
    ) -> impl Future<Output = Result<LoginUserResponse, Status>> + Send;
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Maps an engine error onto an RPC status.
///
/// Internal statuses keep the underlying cause in their message.
pub fn engine_status(err: EngineError) -> Status {
    let message = err.to_string();
    match err {
        EngineError::InvalidArgument(_) => Status::invalid_argument(message),
        EngineError::UserNotFound(_) | EngineError::LobbyNotFound(_) => {
            Status::not_found(message)
        }
        EngineError::LobbyFull(_)
        | EngineError::AlreadyInLobby(..)
        | EngineError::NotJoinable { .. }
        | EngineError::AlreadyFinished(_)
        | EngineError::EmptyRoster(_) => Status::failed_precondition(message),
        EngineError::Identity(_)
        | EngineError::Store(_)
        | EngineError::Compensated { .. }
        | EngineError::WorkerStopped(_) => {
            tracing::error!(error = %message, "lobby operation failed");
            Status::internal(message)
        }
    }
}

// ---------------------------------------------------------------------------
// LobbyService
// ---------------------------------------------------------------------------

/// [`LobbyRpc`] backed by a [`LobbyEngine`].
///
/// Every successful response is a snapshot of the lobby with usernames
/// filled in from the engine's identity resolver.
pub struct LobbyService<S, R, P> {
    engine: Arc<LobbyEngine<S, R, P>>,
}

impl<S, R, P> LobbyService<S, R, P>
where
    S: LobbyStore,
    R: IdentityResolver,
    P: WinnerPicker,
{
    pub fn new(engine: Arc<LobbyEngine<S, R, P>>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<LobbyEngine<S, R, P>> {
        &self.engine
    }

    /// Turns a stored record into its wire snapshot.
    async fn render(&self, record: LobbyRecord) -> Result<Lobby, Status> {
        let mut players = Vec::with_capacity(record.players.len());
        for &id in &record.players {
            players.push(Player {
                id,
                username: self.username(id).await?,
            });
        }

        let winner_username = match record.winner_id {
            Some(winner) => match players.iter().find(|p| p.id == winner) {
                Some(player) => Some(player.username.clone()),
                None => Some(self.username(winner).await?),
            },
            None => None,
        };

        Ok(Lobby {
            lobby_id: record.lobby_id,
            name: record.name,
            status: record.status,
            players,
            winner_id: record.winner_id,
            winner_username,
        })
    }

    /// A user that has since disappeared renders with an empty name; a
    /// failed lookup fails the whole response.
    async fn username(&self, id: UserId) -> Result<String, Status> {
        match self.engine.identity().find_by_id(id).await {
            Ok(user) => Ok(user.username),
            Err(e) if e.is_not_found() => {
                tracing::warn!(user_id = %id, "seated user no longer resolves");
                Ok(String::new())
            }
            Err(e) => {
                tracing::error!(user_id = %id, error = %e, "username lookup failed");
                Err(Status::internal(format!("failed to resolve user {id}: {e}")))
            }
        }
    }
}

impl<S, R, P> LobbyRpc for LobbyService<S, R, P>
where
    S: LobbyStore,
    R: IdentityResolver,
    P: WinnerPicker,
{
    async fn create_lobby(&self, request: CreateLobbyRequest) -> Result<Lobby, Status> {
        let record = self
            .engine
            .create_lobby(&request.name, &request.username)
            .await
            .map_err(engine_status)?;
        self.render(record).await
    }

    async fn join_lobby(&self, request: JoinLobbyRequest) -> Result<Lobby, Status> {
        let record = self
            .engine
            .join_lobby(&request.lobby_id, &request.username)
            .await
            .map_err(engine_status)?;
        self.render(record).await
    }

    async fn finish_game(&self, request: FinishGameRequest) -> Result<Lobby, Status> {
        let record = self
            .engine
            .finish_game(&request.lobby_id)
            .await
            .map_err(engine_status)?;
        self.render(record).await
    }

    async fn get_lobby(&self, request: GetLobbyRequest) -> Result<Lobby, Status> {
        let record = self
            .engine
            .get_lobby(&request.lobby_id)
            .await
            .map_err(engine_status)?;
        self.render(record).await
    }

    async fn list_available_lobbies(
        &self,
        _request: ListAvailableLobbiesRequest,
    ) -> Result<ListAvailableLobbiesResponse, Status> {
        let records = self
            .engine
            .list_available_lobbies()
            .await
            .map_err(engine_status)?;

        let mut lobbies = Vec::with_capacity(records.len());
        for record in records {
            lobbies.push(self.render(record).await?);
        }
        Ok(ListAvailableLobbiesResponse { lobbies })
    }

    async fn delete_lobby(&self, request: DeleteLobbyRequest) -> Result<(), Status> {
        self.engine
            .delete_lobby(&request.lobby_id)
            .await
            .map_err(engine_status)
    }
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

/// [`AuthRpc`] backed by a [`UserRegistry`], a [`CredentialStore`] and a
/// [`TokenIssuer`].
pub struct AuthService<U, C = MemoryCredentials, T = SessionTokens> {
    users: Arc<U>,
    credentials: Arc<C>,
    tokens: Arc<T>,
}

impl<U: UserRegistry> AuthService<U> {
    /// Uses in-memory credentials and session tokens.
    pub fn new(users: Arc<U>) -> Self {
        Self::with_collaborators(
            users,
            Arc::new(MemoryCredentials::new()),
            Arc::new(SessionTokens::new()),
        )
    }
}

impl<U, C, T> AuthService<U, C, T>
where
    U: UserRegistry,
    C: CredentialStore,
    T: TokenIssuer,
{
    pub fn with_collaborators(users: Arc<U>, credentials: Arc<C>, tokens: Arc<T>) -> Self {
        Self {
            users,
            credentials,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<T> {
        &self.tokens
    }
}

fn invalid_credentials() -> Status {
    Status::unauthenticated("invalid credentials")
}

impl<U, C, T> AuthRpc for AuthService<U, C, T>
where
    U: UserRegistry,
    C: CredentialStore,
    T: TokenIssuer,
{
    async fn register_user(&self, request: RegisterUserRequest) -> Result<User, Status> {
        if request.username.trim().is_empty() {
            return Err(Status::invalid_argument("username must not be empty"));
        }
        if request.password.is_empty() {
            return Err(Status::invalid_argument("password must not be empty"));
        }

        let user = self
            .users
            .register(&request.username)
            .await
            .map_err(|e| match e {
                IdentityError::UsernameTaken(_) => Status::already_exists("username already taken"),
                IdentityError::InvalidUsername(reason) => Status::invalid_argument(reason),
                other => {
                    tracing::error!(error = %other, "user registration failed");
                    Status::internal(format!("failed to register user: {other}"))
                }
            })?;

        self.credentials
            .set_password(user.id, &request.password)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "storing password failed");
                Status::internal(format!("failed to store credentials: {e}"))
            })?;

        Ok(user)
    }

    async fn login_user(&self, request: LoginUserRequest) -> Result<LoginUserResponse, Status> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(Status::invalid_argument("username and password are required"));
        }

        let user = match self.users.find_by_username(request.username.trim()).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                tracing::debug!(username = %request.username, "login for unknown user");
                return Err(invalid_credentials());
            }
            Err(e) => {
                tracing::error!(error = %e, "user lookup failed during login");
                return Err(Status::internal(format!("failed to retrieve user: {e}")));
            }
        };

        let verified = self
            .credentials
            .verify_password(user.id, &request.password)
            .await
            .map_err(|e| Status::internal(format!("failed to check credentials: {e}")))?;
        if !verified {
            tracing::warn!(user_id = %user.id, "login refused, wrong password");
            return Err(invalid_credentials());
        }

        let token = self
            .tokens
            .issue(&user)
            .await
            .map_err(|e| Status::internal(format!("failed to create token: {e}")))?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginUserResponse {
            token,
            user: Some(user),
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
