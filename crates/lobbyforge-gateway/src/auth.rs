//! Client for the auth routes.

use lobbyforge_protocol::{
    LoginUserRequest, LoginUserResponse, ProtocolError, RegisterUserRequest, User,
};
use reqwest::Method;

use crate::client::required;
use crate::{BaseClient, GatewayConfig, GatewayError};

const REGISTER: [&str; 4] = ["api", "v1", "auth", "register"];
const LOGIN: [&str; 4] = ["api", "v1", "auth", "login"];

/// Calls the auth RPCs over their HTTP mapping.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base: BaseClient,
}

impl AuthClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self::from_base(BaseClient::new(config)?))
    }

    pub fn from_base(base: BaseClient) -> Self {
        Self { base }
    }

    /// Registers a new user.
    ///
    /// A taken username comes back as a `Conflict` API error; use
    /// [`user_message`](crate::GatewayError::user_message) with
    /// [`Action::Register`](crate::Action::Register) to render it.
    pub async fn register(
        &self,
        request: &RegisterUserRequest,
    ) -> Result<Option<User>, GatewayError> {
        self.base
            .do_request(Method::POST, &REGISTER, Some(request))
            .await
    }

    /// Logs a user in and returns the session token.
    ///
    /// Wrong credentials come back as an `Unauthorized` API error, which
    /// [`Action::Login`](crate::Action::Login) renders as
    /// "invalid credentials".
    pub async fn login(&self, request: &LoginUserRequest) -> Result<LoginUserResponse, GatewayError> {
        let response: Option<LoginUserResponse> = self
            .base
            .do_request(Method::POST, &LOGIN, Some(request))
            .await?;
        let response = required(response, "log in")?;
        if response.token.is_empty() {
            return Err(ProtocolError::InvalidMessage("log in: response without a token".into()).into());
        }
        Ok(response)
    }
}
