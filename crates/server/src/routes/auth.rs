use axum::extract::State;
use axum::{Form, Json};
use axum_extra::extract::WithRejection;
use service::auth::domain::{LoginInput, RegisterInput};
use tracing::info;

use crate::auth::CurrentUser;
use crate::errors::{ApiError, ErrorBody};
use crate::schemas::{AuthTokenResponse, RegisterRequest, TokenRequest, UserResponse};
use crate::state::ServerState;

/// Exchange username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth/token",
    tag = "auth",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = AuthTokenResponse),
        (status = 401, description = "Bad credentials or inactive user", body = ErrorBody),
        (status = 422, description = "Malformed form", body = ErrorBody),
    )
)]
pub async fn token(
    State(state): State<ServerState>,
    WithRejection(Form(form), _): WithRejection<Form<TokenRequest>, ApiError>,
) -> Result<Json<AuthTokenResponse>, ApiError> {
    let token = state
        .auth
        .login(LoginInput { username: form.username, password: form.password })
        .await?;
    Ok(Json(token.into()))
}

/// Create a user with a password. Only available with the `password` provider.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 409, description = "Username taken", body = ErrorBody),
        (status = 417, description = "Invalid username or password, or registration disabled", body = ErrorBody),
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .auth
        .register(RegisterInput { username: body.username, password: body.password })
        .await?;
    info!(event = "user_registered", user_id = %user.id);
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
