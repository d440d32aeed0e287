use serde::{Deserialize, Serialize};

/// The authenticated user as reported by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    /// Backend-assigned user identifier.
    pub id: i64,

    /// The user's email address.
    pub email: String,

    /// Role names in the order the backend returned them.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserInfo {
    /// Comma-separated role list for display.
    #[must_use]
    pub fn roles_display(&self) -> String {
        self.roles.join(", ")
    }
}
