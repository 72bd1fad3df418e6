//! Bearer-token authentication for the `/v1` API.
//!
//! [`require_bearer_token`] runs as a route layer on protected routes: it
//! resolves the token to an active user and stores it in the request
//! extensions, where the [`CurrentUser`] extractor picks it up.

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use service::auth::domain::AuthUser;
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

const BEARER: &str = "Bearer ";

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;
    let token = value
        .get(..BEARER.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(BEARER))
        .map(|_| value[BEARER.len()..].trim())
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header (expected Bearer)"))?;
    if token.is_empty() {
        return Err(ApiError::unauthorized("Not authenticated"));
    }
    Ok(token)
}

pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer_token(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(e) => {
            warn!(path = %req.uri().path(), "missing or malformed bearer token");
            return Err(e);
        }
    };
    let user = state.auth.current_user(&token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn parses_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_missing_or_other_schemes() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers("Bearer ")).is_err());
        assert!(bearer_token(&headers("Bear")).is_err());
    }
}
