#![cfg_attr(not(test), forbid(unsafe_code))]

//! Client-side session core for the Tuhura auth API.
//!
//! The pieces are wired together by a composition root, leaf-first:
//!
//! 1. a [`storage::KeyValueStorage`] backend wrapped in a [`storage::SessionStore`],
//! 2. an [`http::ApiClient`] that injects the stored bearer token and tears the
//!    session down on `401`,
//! 3. an [`auth::AuthService`] that speaks the register/login endpoints,
//! 4. a [`session::SessionContext`] holding the in-memory session the views read.
//!
//! Subscribers to [`http::ApiClient::subscribe`] are told when the backend
//! rejects the session so they can send the user back to [`routes::Route::Login`].

pub mod auth;
pub mod events;
pub mod http;
pub mod routes;
pub mod session;
pub mod storage;
pub mod validation;

pub use auth::{AuthError, AuthService, Authenticator};
pub use events::{SessionEvent, SessionEvents};
pub use http::{ApiClient, ApiError};
pub use routes::{Route, RouteDecision};
pub use session::{Session, SessionContext};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SessionStore, StorageError};
pub use validation::{RegistrationErrors, RegistrationForm, ValidationError};
