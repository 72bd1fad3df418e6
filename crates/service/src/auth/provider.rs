//! Identity providers: decide whether a username/password pair identifies a
//! user.

use std::sync::Arc;

use argon2::{password_hash::PasswordVerifier, Argon2, PasswordHash};
use async_trait::async_trait;
use configs::AuthProviderKind;
use tracing::{info, warn};

use super::domain::AuthUser;
use super::errors::AuthError;
use super::repository::AuthRepository;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn kind(&self) -> AuthProviderKind;

    /// Resolve credentials to an active user.
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthUser, AuthError>;
}

pub(crate) fn validate_username(username: &str) -> Result<(), AuthError> {
    models::user::validate_username(username).map_err(|e| match e {
        models::errors::ModelError::Validation { field, message } => AuthError::Validation { field, message },
        other => AuthError::Repository(other.to_string()),
    })
}

fn ensure_active(user: AuthUser) -> Result<AuthUser, AuthError> {
    if !user.is_active {
        warn!(user_id = %user.id, "login attempt for disabled user");
        return Err(AuthError::Disabled);
    }
    Ok(user)
}

/// Accepts any password and creates unknown users on first login.
/// Meant for development and trusted networks.
pub struct DummyAuthProvider<R: AuthRepository> {
    repo: Arc<R>,
}

impl<R: AuthRepository> DummyAuthProvider<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }
}

#[async_trait]
impl<R: AuthRepository> AuthProvider for DummyAuthProvider<R> {
    fn kind(&self) -> AuthProviderKind { AuthProviderKind::Dummy }

    async fn authenticate(&self, username: &str, _password: &str) -> Result<AuthUser, AuthError> {
        validate_username(username)?;
        if let Some(user) = self.repo.find_user_by_username(username).await? {
            return ensure_active(user);
        }
        match self.repo.create_user(username).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "user_created_on_login");
                Ok(user)
            }
            // a concurrent login created the same user
            Err(AuthError::Conflict(_)) => {
                let user = self
                    .repo
                    .find_user_by_username(username)
                    .await?
                    .ok_or_else(AuthError::invalid_credentials)?;
                ensure_active(user)
            }
            Err(e) => Err(e),
        }
    }
}

/// Verifies argon2 hashes stored by registration.
pub struct PasswordAuthProvider<R: AuthRepository> {
    repo: Arc<R>,
}

impl<R: AuthRepository> PasswordAuthProvider<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }
}

#[async_trait]
impl<R: AuthRepository> AuthProvider for PasswordAuthProvider<R> {
    fn kind(&self) -> AuthProviderKind { AuthProviderKind::Password }

    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        let cred = self
            .repo
            .get_credentials(user.id)
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::invalid_credentials());
        }
        ensure_active(user)
    }
}
