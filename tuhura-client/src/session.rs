//! The in-memory session the views render from.

use std::sync::Arc;

use shared::models::{LoginSuccessResponse, RegisterSuccessResponse, UserInfo};
use tracing::debug;

use crate::{
    auth::{AuthError, Authenticator},
    routes::{Route, RouteDecision},
    storage::SessionStore,
};

/// The current user and their tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The authenticated user.
    pub user: Option<UserInfo>,
    /// Bearer access token.
    pub access_token: Option<String>,
    /// Refresh token; kept, never exchanged.
    pub refresh_token: Option<String>,
}

impl Session {
    /// A session holds authentication iff it has an access token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// An empty access token yields an unauthenticated session.
    fn from_login(response: &LoginSuccessResponse) -> Self {
        if !response.has_access_token() {
            return Self::default();
        }
        Self {
            user: Some(response.user.clone()),
            access_token: Some(response.access_token.clone()),
            refresh_token: Some(response.refresh_token.clone()),
        }
    }
}

/// Application-wide authentication state, built once by the composition root
/// and passed to whatever renders views.
///
/// Starts in the loading state; [`SessionContext::initialize`] hydrates it
/// from persisted storage. After that the in-memory session is the source of
/// truth and is not re-read, so a `401` teardown in the HTTP layer is only
/// reflected here once the owner reacts to the event or re-initializes.
#[derive(Debug)]
pub struct SessionContext {
    auth: Arc<dyn Authenticator>,
    store: SessionStore,
    session: Session,
    loading: bool,
}

impl SessionContext {
    /// Creates an empty context in the loading state.
    #[must_use]
    pub fn new(auth: Arc<dyn Authenticator>, store: SessionStore) -> Self {
        Self {
            auth,
            store,
            session: Session::default(),
            loading: true,
        }
    }

    /// Hydrates from persisted storage and leaves the loading state.
    ///
    /// The session is restored only when both the access token and the user
    /// are present; the refresh token comes along if it exists.
    pub fn initialize(&mut self) {
        let access_token = self.store.access_token();
        let refresh_token = self.store.refresh_token();
        let user = self.store.user();

        if let (Some(access_token), Some(user)) = (access_token, user) {
            debug!(user_id = user.id, "restored persisted session");
            self.session = Session {
                user: Some(user),
                access_token: Some(access_token),
                refresh_token,
            };
        }
        self.loading = false;
    }

    /// Drops in-memory state and returns to the loading state. Storage is untouched.
    pub fn teardown(&mut self) {
        self.session = Session::default();
        self.loading = true;
    }

    /// Whether [`SessionContext::initialize`] has yet to complete.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Presence of the in-memory access token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The whole in-memory session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The authenticated user.
    #[must_use]
    pub fn user(&self) -> Option<&UserInfo> {
        self.session.user.as_ref()
    }

    /// The in-memory access token.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.session.access_token.as_deref()
    }

    /// The in-memory refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.session.refresh_token.as_deref()
    }

    /// Logs in and, on success, replaces the in-memory session.
    ///
    /// # Errors
    /// Propagates the [`AuthError`]; the session is left unchanged.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let response = self.auth.login(email, password).await?;
        if !response.has_access_token() {
            debug!(user_id = response.user.id, "login response carried no access token");
        }
        self.session = Session::from_login(&response);
        Ok(())
    }

    /// Registers an account. No state changes.
    ///
    /// # Errors
    /// Propagates the [`AuthError`].
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<RegisterSuccessResponse, AuthError> {
        self.auth.register(email, username, password).await
    }

    /// Deletes the persisted session and clears the in-memory one.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.session = Session::default();
    }

    /// Decides what a request for `route` should render right now.
    #[must_use]
    pub fn resolve_route(&self, route: Route) -> RouteDecision {
        RouteDecision::resolve(route, self.loading, self.is_authenticated())
    }
}
