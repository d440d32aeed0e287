use serde::{Deserialize, Serialize};

use super::UserInfo;

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Email address to register.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Plain-text password; only ever sent over the wire.
    pub password: String,
}

/// Success body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterSuccessResponse {
    /// Backend status string, e.g. `"success"`.
    pub status: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Success body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginSuccessResponse {
    /// Bearer credential for subsequent requests.
    pub access_token: String,
    /// Renewal credential. Stored, never exchanged.
    pub refresh_token: String,
    /// Token scheme, normally `"bearer"`.
    pub token_type: String,
    /// The user the tokens belong to.
    pub user: UserInfo,
}

impl LoginSuccessResponse {
    /// Whether the response carries a usable access token.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_wire_shape() {
        let request = RegisterRequest {
            email: "a@b.com".to_string(),
            username: "alice".to_string(),
            password: "secret123".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"email": "a@b.com", "username": "alice", "password": "secret123"})
        );
    }

    #[test]
    fn test_login_response_deserialization() {
        let json = r#"{
            "access_token": "T1",
            "refresh_token": "R1",
            "token_type": "bearer",
            "user": {"id": 1, "email": "a@b.com", "roles": ["student"]}
        }"#;
        let response: LoginSuccessResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "T1");
        assert_eq!(response.refresh_token, "R1");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.user.roles, vec!["student"]);
        assert!(response.has_access_token());
    }

    #[test]
    fn test_empty_access_token_is_not_usable() {
        let response = LoginSuccessResponse {
            access_token: String::new(),
            refresh_token: "R1".to_string(),
            token_type: "bearer".to_string(),
            user: UserInfo {
                id: 1,
                email: "a@b.com".to_string(),
                roles: vec![],
            },
        };
        assert!(!response.has_access_token());
    }

    #[test]
    fn test_register_response_deserialization() {
        let json = r#"{"status":"success","message":"User registered"}"#;
        let response: RegisterSuccessResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "success");
        assert_eq!(response.message, "User registered");
    }
}
