use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl ModelError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { field, message: message.into() }
    }

    /// True when the database rejected the write because of a unique index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ModelError::Db(e) => matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))),
            ModelError::Validation { .. } => false,
        }
    }
}
