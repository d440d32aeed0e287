//! Register/login/logout against the auth API.

use std::fmt;

use async_trait::async_trait;
use shared::models::{
    LoginRequest, LoginSuccessResponse, RegisterRequest, RegisterSuccessResponse, UserInfo,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    http::{ApiClient, ApiError},
    storage::SessionStore,
};

/// Registration endpoint.
pub const REGISTER_PATH: &str = "/api/auth/register";
/// Credential-exchange endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Message used when a failed registration carries no `detail`.
pub const REGISTRATION_FAILED: &str = "Registration failed";
/// Message used when a failed login carries no `detail`.
pub const LOGIN_FAILED: &str = "Login failed";

/// The single error kind of the auth layer.
///
/// Network failures, validation rejections, and server errors all collapse
/// into a display message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The request did not succeed.
    #[error("{0}")]
    RequestFailed(String),
}

impl AuthError {
    /// The display message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::RequestFailed(message) => message,
        }
    }

    fn from_api(error: &ApiError, default: &str) -> Self {
        Self::RequestFailed(error.detail().unwrap_or_else(|| default.to_string()))
    }
}

/// The operations the session context and views need from the auth layer.
#[async_trait]
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Creates an account. Never touches the persisted session.
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<RegisterSuccessResponse, AuthError>;

    /// Exchanges credentials for tokens and persists them.
    async fn login(&self, email: &str, password: &str) -> Result<LoginSuccessResponse, AuthError>;

    /// Deletes the persisted session.
    fn logout(&self);

    /// The persisted user, if any.
    fn current_user(&self) -> Option<UserInfo>;

    /// Whether an access token is persisted.
    fn is_authenticated(&self) -> bool;
}

/// [`Authenticator`] backed by the real auth API.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Uses `client` for requests and its store for persistence.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The session store shared with the HTTP client.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        self.client.store()
    }
}

#[async_trait]
impl Authenticator for AuthService {
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<RegisterSuccessResponse, AuthError> {
        let request = RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };

        let response: RegisterSuccessResponse = self
            .client
            .post_json(REGISTER_PATH, &request)
            .await
            .map_err(|err| {
                debug!(error = %err, "registration request failed");
                AuthError::from_api(&err, REGISTRATION_FAILED)
            })?;

        info!(status = %response.status, "registration accepted");
        Ok(response)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginSuccessResponse, AuthError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: LoginSuccessResponse = self
            .client
            .post_json(LOGIN_PATH, &request)
            .await
            .map_err(|err| {
                debug!(error = %err, "login request failed");
                AuthError::from_api(&err, LOGIN_FAILED)
            })?;

        if response.has_access_token() {
            self.store().save(&response).map_err(|err| {
                warn!(error = %err, "failed to persist session");
                AuthError::RequestFailed(LOGIN_FAILED.to_string())
            })?;
        }

        info!(user_id = response.user.id, "login succeeded");
        Ok(response)
    }

    fn logout(&self) {
        self.store().clear();
        debug!("persisted session cleared");
    }

    fn current_user(&self) -> Option<UserInfo> {
        self.store().user()
    }

    fn is_authenticated(&self) -> bool {
        self.store().has_access_token()
    }
}
