use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, SaltString}, Argon2};
use configs::AuthProviderKind;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthUser, LoginInput, RegisterInput, TokenResponse};
use super::errors::AuthError;
use super::jwt::JwtSettings;
use super::provider::{validate_username, AuthProvider, DummyAuthProvider, PasswordAuthProvider};
use super::repository::AuthRepository;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub provider: AuthProviderKind,
    pub jwt: JwtSettings,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn from_settings(settings: &configs::AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            provider: settings.provider,
            jwt: JwtSettings::new(settings.secret_key.clone(), &settings.algorithm, settings.access_token_expire_seconds)?,
            password_algorithm: "argon2".into(),
        })
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    provider: Box<dyn AuthProvider>,
    cfg: AuthConfig,
}

impl<R: AuthRepository + 'static> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        let provider: Box<dyn AuthProvider> = match cfg.provider {
            AuthProviderKind::Dummy => Box::new(DummyAuthProvider::new(Arc::clone(&repo))),
            AuthProviderKind::Password => Box::new(PasswordAuthProvider::new(Arc::clone(&repo))),
        };
        Self { repo, provider, cfg }
    }

    pub fn provider_kind(&self) -> AuthProviderKind {
        self.provider.kind()
    }

    /// Register a new user with a hashed password. Only available with the
    /// password provider.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::{domain::RegisterInput, jwt::JwtSettings};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig {
    ///     provider: configs::AuthProviderKind::Password,
    ///     jwt: JwtSettings::new("secret", "HS256", 3600).unwrap(),
    ///     password_algorithm: "argon2".into(),
    /// };
    /// let svc = AuthService::new(repo, cfg);
    /// let input = RegisterInput { username: "etl-bot".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "etl-bot");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if self.provider.kind() != AuthProviderKind::Password {
            return Err(AuthError::ProviderMismatch);
        }
        validate_username(&input.username)?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation {
                field: "password",
                message: format!("password too short (>={MIN_PASSWORD_LEN})"),
            });
        }
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict(existing.username));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user_with_password(&input.username, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Authenticate through the configured provider and issue a bearer token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::{domain::LoginInput, jwt::JwtSettings};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig {
    ///     provider: configs::AuthProviderKind::Dummy,
    ///     jwt: JwtSettings::new("secret", "HS256", 3600).unwrap(),
    ///     password_algorithm: "argon2".into(),
    /// };
    /// let svc = AuthService::new(repo, cfg);
    /// let token = tokio_test::block_on(svc.login(LoginInput { username: "u".into(), password: "any".into() })).unwrap();
    /// assert_eq!(token.token_type, "bearer");
    /// let me = tokio_test::block_on(svc.current_user(&token.access_token)).unwrap();
    /// assert_eq!(me.username, "u");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<TokenResponse, AuthError> {
        let user = self.provider.authenticate(&input.username, &input.password).await?;
        let (access_token, expires_at) = self.cfg.jwt.sign(user.id)?;
        info!(user_id = %user.id, "token_issued");
        Ok(TokenResponse { access_token, token_type: "bearer".into(), expires_at })
    }

    /// Resolve a bearer token to an active user.
    pub async fn current_user(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.cfg.jwt.decode(token)?;
        let user = self
            .repo
            .find_user_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("user not found".into()))?;
        if !user.is_active {
            return Err(AuthError::Disabled);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(provider: AuthProviderKind) -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let cfg = AuthConfig {
            provider,
            jwt: JwtSettings::new("unit-secret", "HS256", 600).unwrap(),
            password_algorithm: "argon2".into(),
        };
        (Arc::clone(&repo), AuthService::new(repo, cfg))
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn dummy_creates_user_once() {
        let (repo, svc) = svc(AuthProviderKind::Dummy);
        let first = svc.login(login("alice", "x")).await.unwrap();
        let second = svc.login(login("alice", "y")).await.unwrap();
        assert_eq!(repo.user_count(), 1);
        let a = svc.current_user(&first.access_token).await.unwrap();
        let b = svc.current_user(&second.access_token).await.unwrap();
        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn dummy_rejects_blank_username() {
        let (_, svc) = svc(AuthProviderKind::Dummy);
        let err = svc.login(login(" ", "x")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "username", .. }));
    }

    #[tokio::test]
    async fn disabled_user_cannot_login_or_use_token() {
        let (repo, svc) = svc(AuthProviderKind::Dummy);
        let token = svc.login(login("bob", "x")).await.unwrap();
        repo.set_active("bob", false);
        assert!(matches!(svc.login(login("bob", "x")).await, Err(AuthError::Disabled)));
        assert!(matches!(svc.current_user(&token.access_token).await, Err(AuthError::Disabled)));
    }

    #[tokio::test]
    async fn register_requires_password_provider() {
        let (_, svc) = svc(AuthProviderKind::Dummy);
        let err = svc
            .register(RegisterInput { username: "carol".into(), password: "LongEnough1".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProviderMismatch));
    }

    #[tokio::test]
    async fn password_provider_flow() {
        let (_, svc) = svc(AuthProviderKind::Password);
        assert_eq!(svc.provider_kind(), AuthProviderKind::Password);

        // unknown user
        assert!(matches!(svc.login(login("dave", "Passw0rd!")).await, Err(AuthError::Unauthorized(_))));

        let short = svc.register(RegisterInput { username: "dave".into(), password: "short".into() }).await;
        assert!(matches!(short, Err(AuthError::Validation { field: "password", .. })));

        svc.register(RegisterInput { username: "dave".into(), password: "Passw0rd!".into() }).await.unwrap();
        let dup = svc.register(RegisterInput { username: "dave".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(dup, Err(AuthError::Conflict(_))));

        assert!(matches!(svc.login(login("dave", "wrong-pass")).await, Err(AuthError::Unauthorized(_))));
        let token = svc.login(login("dave", "Passw0rd!")).await.unwrap();
        assert_eq!(svc.current_user(&token.access_token).await.unwrap().username, "dave");
    }

    #[tokio::test]
    async fn token_for_unknown_user_rejected() {
        let (_, svc) = svc(AuthProviderKind::Dummy);
        let (token, _) = svc.cfg.jwt.sign(uuid::Uuid::new_v4()).unwrap();
        assert!(matches!(svc.current_user(&token).await, Err(AuthError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn invalid_token_rejected() {
        let (_, svc) = svc(AuthProviderKind::Dummy);
        assert!(matches!(svc.current_user("abc.def.ghi").await, Err(AuthError::TokenError(_))));
    }
}
