use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use shared::{config::ClientConfig, models::ErrorResponse};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    events::{SessionEvent, SessionEvents},
    storage::SessionStore,
};

const USER_AGENT: &str = "tuhura-cli";

/// Failures surfaced by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    /// The path did not form a valid URL against the base endpoint.
    #[error("invalid request URL {url}: {source}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// Connect failure, timeout, or other transport problem.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The backend answered with a non-2xx status.
    #[error("server responded with {status}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Decoded error body, when it had the expected shape.
        body: Option<ErrorResponse>,
    },
    /// A 2xx body did not match the expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// The response status, for [`ApiError::Status`].
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's `detail` message, when present and non-empty.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Status { body: Some(body), .. } => body.message(),
            _ => None,
        }
    }

    /// Whether the backend rejected the request's credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the request hit the client-side timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

/// HTTP adapter for the auth API.
///
/// Every request carries `Content-Type: application/json` and, when one is
/// persisted, `Authorization: Bearer <access token>`. Any `401` response
/// clears the persisted session and publishes [`SessionEvent::LoginRequired`]
/// before the error is returned, whichever request triggered it.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    store: SessionStore,
    events: SessionEvents,
}

impl ApiClient {
    /// Builds a client for `config.api_base_url` with the configured timeout.
    ///
    /// # Errors
    /// Returns [`ApiError::Build`] if the underlying client cannot be constructed.
    pub fn new(config: &ClientConfig, store: SessionStore) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
            client,
            store,
            events: SessionEvents::new(),
        })
    }

    /// The base endpoint without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session store the interceptors read and clear.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The channel `401` teardowns are announced on.
    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Shorthand for `self.events().subscribe()`.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn api_url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        reqwest::Url::parse(&url).map_err(|source| ApiError::InvalidUrl { url, source })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn intercept(&self, path: &str, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(path, "backend rejected credentials; clearing persisted session");
            self.store.clear();
            self.events.publish(SessionEvent::login_required(path));
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorResponse>(&text).ok();
        debug!(path, %status, "request failed");
        Err(ApiError::Status { status, body })
    }

    /// Sends a request and runs both interceptors, returning the raw response.
    ///
    /// # Errors
    /// Returns an [`ApiError`] for transport failures and non-2xx statuses.
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.api_url(path)?;
        debug!(%method, %url, "sending request");

        let mut request = self.authorize(self.client.request(method, url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Transport)?;
        self.intercept(path, response).await
    }

    /// `POST` a JSON body and decode a JSON response.
    ///
    /// # Errors
    /// See [`ApiClient::send`]; additionally [`ApiError::Decode`] for an
    /// unexpected success body.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// `GET` a JSON response.
    ///
    /// # Errors
    /// See [`ApiClient::post_json`].
    pub async fn get_json<R>(&self, path: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let response = self.send::<()>(Method::GET, path, None).await?;
        response.json().await.map_err(ApiError::Decode)
    }
}
