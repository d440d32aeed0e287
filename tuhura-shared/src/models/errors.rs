use serde::{Deserialize, Serialize};

/// Error body returned by the auth API on any non-2xx response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Either a plain message or, for request validation failures, a list of issues.
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

/// The shapes the `detail` field takes in practice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// `{"detail": "Invalid credentials"}`
    Message(String),
    /// `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`
    Validation(Vec<ValidationIssue>),
    /// Anything else the server chose to send.
    Other(serde_json::Value),
}

/// One entry of a request-validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    /// Path of the offending field, e.g. `["body", "email"]`.
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    /// Description of the problem.
    pub msg: String,
    /// Machine-readable error kind.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl ErrorResponse {
    /// Creates an error body with a plain message.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(ErrorDetail::Message(detail.into())),
        }
    }

    /// The display message carried by `detail`, if there is a non-empty one.
    ///
    /// Validation issues are joined with `"; "`.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let message = match self.detail.as_ref()? {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Validation(issues) => issues
                .iter()
                .map(|issue| issue.msg.as_str())
                .filter(|msg| !msg.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
            ErrorDetail::Other(_) => return None,
        };

        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => f.write_str(&message),
            None => f.write_str("unknown error"),
        }
    }
}
