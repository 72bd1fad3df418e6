use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("user {0:?} already exists")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("user is disabled")]
    Disabled,
    #[error("registration is not supported by the configured auth provider")]
    ProviderMismatch,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthorized("invalid credentials".into())
    }
}
