//! Error types for the gateway client.
//!
//! A non-success HTTP answer is classified exactly once, into an
//! [`ApiErrorKind`]. Callers branch on the kind (or ask
//! [`ApiError::user_message`] for display text) and never compare raw status
//! codes themselves.

use std::fmt;

use lobbyforge_protocol::ProtocolError;

/// Fallback diagnostic when the server sends no usable error body.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors returned by the gateway clients.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response: connection refused, timed
    /// out, or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// The lobby id is blank or names another route. Nothing was sent.
    #[error("invalid lobby id: {0:?}")]
    InvalidLobbyId(String),
}

impl GatewayError {
    /// The HTTP status the server answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status),
            _ => None,
        }
    }

    /// Returns the classified kind for API errors.
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Whether the client gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request(err) => err.is_timeout(),
            Self::Api(err) => err.kind == ApiErrorKind::Timeout,
            _ => false,
        }
    }

    /// Text safe to show an end user for a failed `action`.
    pub fn user_message(&self, action: Action) -> &'static str {
        match self {
            Self::Api(err) => err.user_message(action),
            Self::InvalidLobbyId(_) => "lobby not found",
            _ => action.failure_message(),
        }
    }
}

/// A non-success answer from the RPC surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API error: status {status}, message: {message}")]
pub struct ApiError {
    /// The HTTP status code, exactly as received.
    pub status: u16,
    pub kind: ApiErrorKind,
    /// Diagnostic text from the error body, or
    /// [`UNEXPECTED_ERROR_MESSAGE`].
    pub message: String,
}

impl ApiError {
    /// Builds an error from a status code and an optional server message.
    pub fn new(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string());
        Self {
            status,
            kind: ApiErrorKind::from_status(status),
            message,
        }
    }

    /// Maps the error onto the message a user should see for `action`.
    ///
    /// Internal failures never leak the diagnostic message.
    pub fn user_message(&self, action: Action) -> &'static str {
        use Action::*;
        use ApiErrorKind::*;

        match (action, self.kind) {
            (Register, Conflict) => "username already taken",
            (CreateLobby, Conflict) => "lobby already exists",
            (JoinLobby, Conflict) => join_conflict_message(&self.message),
            (FinishGame, Conflict) => "game already finished",
            (_, Conflict) => "the request conflicts with the current state",

            (CreateLobby, NotFound) | (Register, NotFound) => "user not found",
            (_, NotFound) => "lobby not found",

            (Register, BadRequest) | (Login, BadRequest) => "username and password are required",
            (Login, Unauthorized) => "invalid credentials",
            (_, BadRequest) => "invalid request",
            (_, Unauthorized) => "please log in first",
            (_, Forbidden) => "you are not allowed to do that",
            (_, TooManyRequests) => "too many requests, try again later",
            (_, Unavailable) => "service unavailable, try again later",
            (_, Timeout) => "the server took too long to respond",
            (_, Cancelled) => "the request was cancelled",
            (_, Internal) | (_, Unexpected) => action.failure_message(),
        }
    }
}

/// The server answers every refused join with 409; its message says why.
fn join_conflict_message(message: &str) -> &'static str {
    if message.contains("already in lobby") {
        "you are already in this lobby"
    } else if message.contains("not accepting") {
        "lobby is no longer accepting players"
    } else {
        "lobby is full"
    }
}

/// Closed classification of HTTP failure statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    TooManyRequests,
    Cancelled,
    Internal,
    Unavailable,
    Timeout,
    Unexpected,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            429 => Self::TooManyRequests,
            499 => Self::Cancelled,
            500 => Self::Internal,
            502 | 503 => Self::Unavailable,
            504 => Self::Timeout,
            _ => Self::Unexpected,
        }
    }
}

/// The caller-level operation a request was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    Login,
    CreateLobby,
    JoinLobby,
    FinishGame,
    GetLobby,
    ListLobbies,
}

impl Action {
    /// Generic failure text for this action.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Register => "failed to register user",
            Self::Login => "failed to log in",
            Self::CreateLobby => "failed to create lobby",
            Self::JoinLobby => "failed to join lobby",
            Self::FinishGame => "failed to finish game",
            Self::GetLobby => "failed to load lobby",
            Self::ListLobbies => "failed to load lobbies",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Register => "register",
            Self::Login => "log in",
            Self::CreateLobby => "create lobby",
            Self::JoinLobby => "join lobby",
            Self::FinishGame => "finish game",
            Self::GetLobby => "get lobby",
            Self::ListLobbies => "list lobbies",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(409, Some("lobby is full".into()));
        assert_eq!(err.to_string(), "API error: status 409, message: lobby is full");
    }

    #[test]
    fn test_missing_message_falls_back() {
        let err = ApiError::new(500, None);
        assert_eq!(err.message, UNEXPECTED_ERROR_MESSAGE);

        let err = ApiError::new(500, Some("   ".into()));
        assert_eq!(err.message, UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ApiErrorKind::from_status(400), ApiErrorKind::BadRequest);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(409), ApiErrorKind::Conflict);
        assert_eq!(ApiErrorKind::from_status(503), ApiErrorKind::Unavailable);
        assert_eq!(ApiErrorKind::from_status(504), ApiErrorKind::Timeout);
        assert_eq!(ApiErrorKind::from_status(418), ApiErrorKind::Unexpected);
    }

    #[test]
    fn test_conflict_message_depends_on_action() {
        let err = ApiError::new(409, None);
        assert_eq!(err.user_message(Action::Register), "username already taken");
        assert_eq!(err.user_message(Action::CreateLobby), "lobby already exists");
        assert_eq!(err.user_message(Action::JoinLobby), "lobby is full");
    }

    #[test]
    fn test_join_conflict_follows_server_reason() {
        let cases = [
            ("lobby is full", "lobby is full"),
            ("player already in lobby", "you are already in this lobby"),
            ("lobby is not accepting players", "lobby is no longer accepting players"),
        ];
        for (server, shown) in cases {
            let err = ApiError::new(409, Some(server.into()));
            assert_eq!(err.user_message(Action::JoinLobby), shown, "{server}");
        }
    }

    #[test]
    fn test_login_messages() {
        let err = ApiError::new(401, Some("invalid credentials".into()));
        assert_eq!(err.user_message(Action::Login), "invalid credentials");
        assert_eq!(err.user_message(Action::GetLobby), "please log in first");

        let err = ApiError::new(400, None);
        assert_eq!(err.user_message(Action::Login), "username and password are required");

        let err = ApiError::new(500, None);
        assert_eq!(err.user_message(Action::Login), "failed to log in");
        assert_eq!(Action::Login.to_string(), "log in");
    }

    #[test]
    fn test_internal_hides_diagnostics() {
        let err = ApiError::new(500, Some("sqlite: disk I/O error".into()));
        assert_eq!(err.user_message(Action::GetLobby), "failed to load lobby");
    }

    #[test]
    fn test_gateway_error_accessors() {
        let err = GatewayError::from(ApiError::new(404, None));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), Some(ApiErrorKind::NotFound));
        assert!(!err.is_timeout());

        let err = GatewayError::InvalidBaseUrl("nope".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.user_message(Action::ListLobbies), "failed to load lobbies");
    }
}
