//! Request, response, and error bodies exchanged with the auth API.

pub mod auth;
pub mod errors;
pub mod user;

pub use auth::{LoginRequest, LoginSuccessResponse, RegisterRequest, RegisterSuccessResponse};
pub use errors::{ErrorDetail, ErrorResponse, ValidationIssue};
pub use user::UserInfo;
