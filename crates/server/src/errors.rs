use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Body of every error response.
#[derive(Debug, Serialize, PartialEq, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub details: Value,
}

/// Error returned by handlers, rendered as `{code, message, details}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>, details: Value) -> Self {
        Self { status, code, message: message.into(), details }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message, Value::Null)
    }

    /// Malformed request: bad JSON, query string, form or path segment.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_request",
            "Invalid request",
            Value::String(message),
        )
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody { code: self.code.to_string(), message: self.message.clone(), details: self.details.clone() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let details = e.details();
        match e {
            ServiceError::EntityNotFound(_) => Self::new(StatusCode::NOT_FOUND, "not_found", e.to_string(), details),
            ServiceError::EntityAlreadyExists(_) => {
                Self::new(StatusCode::CONFLICT, "already_exists", e.to_string(), details)
            }
            ServiceError::EntityInvalid { .. } => {
                Self::new(StatusCode::EXPECTATION_FAILED, "invalid_value", e.to_string(), details)
            }
            ServiceError::Authorization(msg) => {
                warn!(event = "auth_rejected", reason = %msg);
                Self::unauthorized(msg)
            }
            ServiceError::PermissionDenied(msg) => Self::new(StatusCode::FORBIDDEN, "forbidden", msg, Value::Null),
            ServiceError::Db(_) | ServiceError::Internal(_) => {
                error!(event = "request_failed", error = %e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "unknown", "Internal server error", Value::Null)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ServiceError::from(e).into()
    }
}

macro_rules! rejection_into_api_error {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(r: $rejection) -> Self {
                    Self::invalid_request(r.body_text())
                }
            }
        )*
    };
}

rejection_into_api_error!(JsonRejection, QueryRejection, FormRejection, PathRejection);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
