//! In-process stand-in for the auth API.

#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use client::{ApiClient, AuthService, SessionStore};
use serde_json::json;
use shared::{
    config::ClientConfig,
    models::{LoginRequest, RegisterRequest},
};
use tokio::net::TcpListener;
use url::Url;

/// Headers and bodies the backend has seen.
#[derive(Clone, Default)]
pub struct Recorded {
    pub authorization: Arc<Mutex<Vec<Option<String>>>>,
    pub content_type: Arc<Mutex<Vec<Option<String>>>>,
    pub register_bodies: Arc<Mutex<Vec<RegisterRequest>>>,
}

impl Recorded {
    fn capture(&self, headers: &HeaderMap) {
        let read = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string)
        };
        self.authorization
            .lock()
            .unwrap()
            .push(read(header::AUTHORIZATION));
        self.content_type
            .lock()
            .unwrap()
            .push(read(header::CONTENT_TYPE));
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.authorization.lock().unwrap().last().cloned().flatten()
    }

    pub fn last_content_type(&self) -> Option<String> {
        self.content_type.lock().unwrap().last().cloned().flatten()
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub base_url: Url,
    pub recorded: Recorded,
}

impl MockBackend {
    pub async fn start() -> Self {
        let recorded = Recorded::default();
        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/protected/me", get(me))
            .route("/api/slow", get(slow))
            .with_state(recorded.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            recorded,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: self.base_url.clone(),
            ..ClientConfig::with_defaults()
        }
    }

    pub fn client(&self, store: SessionStore) -> ApiClient {
        ApiClient::new(&self.config(), store).unwrap()
    }

    pub fn service(&self, store: SessionStore) -> AuthService {
        AuthService::new(self.client(store))
    }
}

pub fn scenario_login_body() -> serde_json::Value {
    json!({
        "access_token": "T1",
        "refresh_token": "R1",
        "token_type": "bearer",
        "user": {"id": 1, "email": "a@b.com", "roles": ["student"]}
    })
}

async fn login(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Response {
    recorded.capture(&headers);
    match (body.email.as_str(), body.password.as_str()) {
        ("a@b.com", "secret123") => (StatusCode::OK, Json(scenario_login_body())).into_response(),
        ("empty@b.com", _) => (
            StatusCode::OK,
            Json(json!({
                "access_token": "",
                "refresh_token": "",
                "token_type": "bearer",
                "user": {"id": 3, "email": "empty@b.com", "roles": []}
            })),
        )
            .into_response(),
        ("garbled@b.com", _) => (StatusCode::OK, Json(json!({"unexpected": true}))).into_response(),
        ("boom@b.com", _) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        ("silent@b.com", _) => (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
            .into_response(),
    }
}

async fn register(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Response {
    recorded.capture(&headers);
    recorded.register_bodies.lock().unwrap().push(body.clone());
    match body.email.as_str() {
        "taken@b.com" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Email already registered"})),
        )
            .into_response(),
        "invalid@b.com" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [
                {"loc": ["body", "password"], "msg": "String should have at least 8 characters", "type": "string_too_short"}
            ]})),
        )
            .into_response(),
        "crash@b.com" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "unauthorized@b.com" => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        )
            .into_response(),
        _ => (
            StatusCode::CREATED,
            Json(json!({"status": "success", "message": "User registered successfully"})),
        )
            .into_response(),
    }
}

async fn me(State(recorded): State<Recorded>, headers: HeaderMap) -> Response {
    recorded.capture(&headers);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer T1");
    if authorized {
        (StatusCode::OK, Json(json!({"id": 1, "email": "a@b.com", "roles": ["student"]})))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )
            .into_response()
    }
}

async fn slow(State(recorded): State<Recorded>, headers: HeaderMap) -> Response {
    recorded.capture(&headers);
    tokio::time::sleep(Duration::from_secs(5)).await;
    (StatusCode::OK, Json(json!({"ok": true}))).into_response()
}
