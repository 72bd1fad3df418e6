use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use uuid::Uuid;

use models::errors::ModelError;
use models::{user, user_credentials};

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn user_write_error(username: &str, e: ModelError) -> AuthError {
    if e.is_unique_violation() {
        return AuthError::Conflict(username.to_string());
    }
    match e {
        ModelError::Validation { field, message } => AuthError::Validation { field, message },
        ModelError::Db(db) => AuthError::Repository(db.to_string()),
    }
}

fn repo_error(e: impl std::fmt::Display) -> AuthError {
    AuthError::Repository(e.to_string())
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id).one(&self.db).await.map_err(repo_error)?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::find_by_username(&self.db, username).await.map_err(repo_error)?;
        Ok(res.map(AuthUser::from))
    }

    async fn create_user(&self, username: &str) -> Result<AuthUser, AuthError> {
        let created = user::create(&self.db, username, false)
            .await
            .map_err(|e| user_write_error(username, e))?;
        Ok(created.into())
    }

    async fn create_user_with_password(
        &self,
        username: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(repo_error)?;
        let created = user::create(&txn, username, false)
            .await
            .map_err(|e| user_write_error(username, e))?;
        user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm)
            .await
            .map_err(repo_error)?;
        txn.commit().await.map_err(repo_error)?;
        Ok(created.into())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(&self.db, user_id).await.map_err(repo_error)?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }
}
