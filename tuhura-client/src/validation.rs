//! Validation logic for the registration form.
//!
//! Validation runs entirely client-side; a form that fails it never reaches
//! the network.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use shared::models::RegisterSuccessResponse;
use tracing::debug;

use crate::session::SessionContext;

/// Minimum username length, in characters.
pub const USERNAME_MIN_LEN: usize = 3;
/// Maximum username length, in characters.
pub const USERNAME_MAX_LEN: usize = 50;
/// Minimum password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is a valid regex"));

/// Validation errors that can occur on the registration form.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValidationError {
    /// Email is empty.
    EmailRequired,
    /// Email does not look like `local@domain.tld`.
    InvalidEmail,
    /// Username is empty.
    UsernameRequired,
    /// Username is shorter than [`USERNAME_MIN_LEN`].
    UsernameTooShort,
    /// Username is longer than [`USERNAME_MAX_LEN`].
    UsernameTooLong,
    /// Password is empty.
    PasswordRequired,
    /// Password is shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort,
    /// Confirmation is empty.
    ConfirmPasswordRequired,
    /// Confirmation differs from the password.
    PasswordsDoNotMatch,
}

impl ValidationError {
    /// The message shown next to the field.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::EmailRequired => "Email is required",
            Self::InvalidEmail => "Please enter a valid email",
            Self::UsernameRequired => "Username is required",
            Self::UsernameTooShort => "Username must be at least 3 characters",
            Self::UsernameTooLong => "Username must be less than 50 characters",
            Self::PasswordRequired => "Password is required",
            Self::PasswordTooShort => "Password must be at least 8 characters",
            Self::ConfirmPasswordRequired => "Please confirm your password",
            Self::PasswordsDoNotMatch => "Passwords do not match",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Validates an email address.
///
/// # Errors
/// [`ValidationError::EmailRequired`] when empty,
/// [`ValidationError::InvalidEmail`] when it does not match `\S+@\S+\.\S+`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validates a username.
///
/// # Errors
/// Required, then too short, then too long.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    let length = username.chars().count();
    if length < USERNAME_MIN_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if length > USERNAME_MAX_LEN {
        return Err(ValidationError::UsernameTooLong);
    }
    Ok(())
}

/// Validates a password.
///
/// # Errors
/// Required, then too short.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validates that the confirmation matches the password.
///
/// # Errors
/// Required, then mismatch.
pub fn validate_confirm_password(
    confirm_password: &str,
    password: &str,
) -> Result<(), ValidationError> {
    if confirm_password.is_empty() {
        return Err(ValidationError::ConfirmPasswordRequired);
    }
    if confirm_password != password {
        return Err(ValidationError::PasswordsDoNotMatch);
    }
    Ok(())
}

/// Per-field errors plus a general message for service failures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationErrors {
    /// Email field error.
    pub email: Option<ValidationError>,
    /// Username field error.
    pub username: Option<ValidationError>,
    /// Password field error.
    pub password: Option<ValidationError>,
    /// Confirmation field error.
    pub confirm_password: Option<ValidationError>,
    /// Error reported by the backend after validation passed.
    pub general: Option<String>,
}

impl RegistrationErrors {
    /// `true` when no field failed validation.
    #[must_use]
    pub fn fields_valid(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }

    /// `(field, message)` pairs for every error present, in form order.
    #[must_use]
    pub fn messages(&self) -> Vec<(&'static str, String)> {
        let fields = [
            ("email", self.email),
            ("username", self.username),
            ("password", self.password),
            ("confirm_password", self.confirm_password),
        ];
        let mut messages: Vec<_> = fields
            .into_iter()
            .filter_map(|(name, error)| error.map(|error| (name, error.to_string())))
            .collect();
        if let Some(general) = &self.general {
            messages.push(("general", general.clone()));
        }
        messages
    }
}

impl fmt::Display for RegistrationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .messages()
            .into_iter()
            .map(|(_, message)| message)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for RegistrationErrors {}

/// The registration form's working state. Never persisted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Email address.
    pub email: String,
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .finish()
    }
}

impl RegistrationForm {
    /// Creates a form from its four fields.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Checks every field; each reports its first failing rule.
    ///
    /// # Errors
    /// Returns [`RegistrationErrors`] when any field is invalid.
    pub fn validate(&self) -> Result<(), RegistrationErrors> {
        let errors = RegistrationErrors {
            email: validate_email(&self.email).err(),
            username: validate_username(&self.username).err(),
            password: validate_password(&self.password).err(),
            confirm_password: validate_confirm_password(&self.confirm_password, &self.password)
                .err(),
            general: None,
        };

        if errors.fields_valid() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validates, then registers through `context` exactly once.
    ///
    /// # Errors
    /// Field errors when validation fails (nothing is sent), otherwise the
    /// service's message in [`RegistrationErrors::general`].
    pub async fn submit(
        &self,
        context: &SessionContext,
    ) -> Result<RegisterSuccessResponse, RegistrationErrors> {
        self.validate()?;
        debug!(email = %self.email, "submitting registration");

        context
            .register(&self.email, &self.username, &self.password)
            .await
            .map_err(|err| RegistrationErrors {
                general: Some(err.message().to_string()),
                ..RegistrationErrors::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, Authenticator};
    use crate::storage::SessionStore;
    use async_trait::async_trait;
    use shared::models::{LoginSuccessResponse, UserInfo};
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Records every register call and answers with a canned result.
    #[derive(Debug)]
    struct RecordingAuthenticator {
        calls: Mutex<Vec<(String, String, String)>>,
        result: Result<RegisterSuccessResponse, AuthError>,
    }

    impl RecordingAuthenticator {
        fn new(result: Result<RegisterSuccessResponse, AuthError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                result,
            }
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Authenticator for RecordingAuthenticator {
        async fn register(
            &self,
            email: &str,
            username: &str,
            password: &str,
        ) -> Result<RegisterSuccessResponse, AuthError> {
            self.calls.lock().unwrap().push((
                email.to_string(),
                username.to_string(),
                password.to_string(),
            ));
            self.result.clone()
        }

        async fn login(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<LoginSuccessResponse, AuthError> {
            unreachable!("the registration form never logs in")
        }

        fn logout(&self) {}

        fn current_user(&self) -> Option<UserInfo> {
            None
        }

        fn is_authenticated(&self) -> bool {
            false
        }
    }

    fn accepted() -> RegisterSuccessResponse {
        RegisterSuccessResponse {
            status: "success".to_string(),
            message: "User registered successfully".to_string(),
        }
    }

    fn context_for(auth: &Arc<RecordingAuthenticator>) -> SessionContext {
        let mut context = SessionContext::new(auth.clone(), SessionStore::in_memory());
        context.initialize();
        context
    }

    fn valid_form() -> RegistrationForm {
        RegistrationForm::new("a@b.com", "alice", "secret123", "secret123")
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
        assert_eq!(validate_email("bad-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a@b"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("a @b.com"), Err(ValidationError::InvalidEmail));
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@school.co.nz").is_ok());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(""), Err(ValidationError::UsernameRequired));
        assert_eq!(validate_username("ab"), Err(ValidationError::UsernameTooShort));
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(ValidationError::UsernameTooLong)
        );
    }

    #[test]
    fn test_validate_username_counts_characters() {
        assert!(validate_username("āēī").is_ok());
        assert_eq!(validate_username("āē"), Err(ValidationError::UsernameTooShort));
    }

    #[test]
    fn test_validate_password() {
        assert_eq!(validate_password(""), Err(ValidationError::PasswordRequired));
        assert_eq!(validate_password("short"), Err(ValidationError::PasswordTooShort));
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_validate_confirm_password() {
        assert_eq!(
            validate_confirm_password("", "secret123"),
            Err(ValidationError::ConfirmPasswordRequired)
        );
        assert_eq!(
            validate_confirm_password("secret124", "secret123"),
            Err(ValidationError::PasswordsDoNotMatch)
        );
        assert!(validate_confirm_password("secret123", "secret123").is_ok());
    }

    #[test]
    fn test_messages_match_form_copy() {
        let form = RegistrationForm::new("bad-email", "ab", "secret123", "secret999");
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.email.unwrap().to_string(), "Please enter a valid email");
        assert_eq!(
            errors.username.unwrap().to_string(),
            "Username must be at least 3 characters"
        );
        assert_eq!(errors.password, None);
        assert_eq!(
            errors.confirm_password.unwrap().to_string(),
            "Passwords do not match"
        );
        assert_eq!(
            errors.messages(),
            vec![
                ("email", "Please enter a valid email".to_string()),
                ("username", "Username must be at least 3 characters".to_string()),
                ("confirm_password", "Passwords do not match".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_form_reports_required_fields() {
        let errors = RegistrationForm::default().validate().unwrap_err();
        assert_eq!(errors.email, Some(ValidationError::EmailRequired));
        assert_eq!(errors.username, Some(ValidationError::UsernameRequired));
        assert_eq!(errors.password, Some(ValidationError::PasswordRequired));
        assert_eq!(
            errors.confirm_password,
            Some(ValidationError::ConfirmPasswordRequired)
        );
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let rendered = format!("{:?}", valid_form());
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("secret123"));
    }

    #[tokio::test]
    async fn test_invalid_submission_never_registers() {
        let auth = Arc::new(RecordingAuthenticator::new(Ok(accepted())));
        let context = context_for(&auth);

        let form = RegistrationForm::new("bad-email", "alice", "secret123", "secret123");
        let errors = form.submit(&context).await.unwrap_err();

        assert_eq!(errors.email, Some(ValidationError::InvalidEmail));
        assert!(auth.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_submission_registers_exactly_once() {
        let auth = Arc::new(RecordingAuthenticator::new(Ok(accepted())));
        let context = context_for(&auth);

        let response = valid_form().submit(&context).await.unwrap();

        assert_eq!(response, accepted());
        assert_eq!(
            auth.calls(),
            vec![(
                "a@b.com".to_string(),
                "alice".to_string(),
                "secret123".to_string()
            )]
        );
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn test_service_failure_becomes_general_error() {
        let auth = Arc::new(RecordingAuthenticator::new(Err(AuthError::RequestFailed(
            "Email already registered".to_string(),
        ))));
        let context = context_for(&auth);

        let errors = valid_form().submit(&context).await.unwrap_err();
        assert!(errors.fields_valid());
        assert_eq!(errors.general.as_deref(), Some("Email already registered"));
        assert_eq!(errors.to_string(), "Email already registered");
        assert_eq!(auth.calls().len(), 1);
    }
}
