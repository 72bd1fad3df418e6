use std::fmt;

use models::errors::ModelError;
use sea_orm::DbErr;
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::errors::AuthError;

/// Identifies the record an entity error is about.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    pub entity_type: &'static str,
    pub field: &'static str,
    pub value: Value,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {}={}", self.entity_type, self.field, self.value)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    EntityNotFound(EntityRef),
    #[error("{0} already exists")]
    EntityAlreadyExists(EntityRef),
    #[error("invalid {entity_type}.{field}: {message}")]
    EntityInvalid { entity_type: &'static str, field: &'static str, message: String },
    #[error("authorization failed: {0}")]
    Authorization(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity_type: &'static str, field: &'static str, value: impl Into<Value>) -> Self {
        Self::EntityNotFound(EntityRef { entity_type, field, value: value.into() })
    }

    pub fn already_exists(entity_type: &'static str, field: &'static str, value: impl Into<Value>) -> Self {
        Self::EntityAlreadyExists(EntityRef { entity_type, field, value: value.into() })
    }

    pub fn invalid(entity_type: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self::EntityInvalid { entity_type, field, message: message.into() }
    }

    /// Attach the entity type to a model-level error.
    pub fn from_model(entity_type: &'static str, e: ModelError) -> Self {
        match e {
            ModelError::Validation { field, message } => Self::invalid(entity_type, field, message),
            ModelError::Db(db) => Self::Db(db),
        }
    }

    /// Structured payload for the `details` member of error responses.
    pub fn details(&self) -> Value {
        match self {
            ServiceError::EntityNotFound(r) | ServiceError::EntityAlreadyExists(r) => json!({
                "entity_type": r.entity_type,
                "field": r.field,
                "value": r.value,
            }),
            ServiceError::EntityInvalid { entity_type, field, message } => json!({
                "entity_type": entity_type,
                "field": field,
                "message": message,
            }),
            _ => Value::Null,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation { field, message } => Self::invalid("User", field, message),
            AuthError::Conflict(username) => Self::already_exists("User", "username", username),
            AuthError::Unauthorized(msg) => Self::Authorization(msg),
            AuthError::Disabled => Self::Authorization("user is disabled".into()),
            AuthError::TokenError(msg) => Self::Authorization(msg),
            AuthError::ProviderMismatch => {
                Self::invalid("User", "password", "registration is disabled for the configured auth provider")
            }
            AuthError::HashError(msg) | AuthError::Repository(msg) => Self::Internal(msg),
        }
    }
}
