use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

/// Shared router state: the connection pool and the auth service built on it.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, settings: &configs::AuthConfig) -> Result<Self, AuthError> {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let auth = AuthService::new(repo, AuthConfig::from_settings(settings)?);
        Ok(Self { db, auth: Arc::new(auth) })
    }
}
