//! Router tests that never reach the database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use service::auth::jwt::JwtSettings;
use tower::ServiceExt;
use uuid::Uuid;

use server::ServerState;

const SECRET: &str = "router-test-secret";

fn app() -> Router {
    let auth = configs::AuthConfig { secret_key: SECRET.into(), ..Default::default() };
    let state = ServerState::new(DatabaseConnection::default(), &auth).expect("state");
    server::app(state)
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let resp = app().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn ping_returns_ok() {
    let (status, body) = send(get_with_auth("/monitoring/ping", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(get_with_auth("/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/namespaces"].is_object());
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    for uri in ["/v1/users/me", "/v1/namespaces", "/v1/hwm-history?hwm_id=00000000-0000-0000-0000-000000000000"] {
        let (status, body) = send(get_with_auth(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["details"], Value::Null);
    }
}

#[tokio::test]
async fn malformed_token_is_unauthorized() {
    for value in ["Basic dXNlcjpwYXNz", "Bearer not-a-jwt", "Bearer "] {
        let (status, body) = send(get_with_auth("/v1/users/me", Some(value))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(body["code"], "unauthorized");
    }
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() {
    let now = Utc::now().timestamp();
    let claims = json!({"user_id": Uuid::new_v4(), "iat": now, "exp": now + 600});
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"someone-else")).unwrap();
    let (status, body) = send(get_with_auth("/v1/users/me", Some(&format!("Bearer {token}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let jwt = JwtSettings::new(SECRET, "HS256", 60).unwrap();
    let (token, expires_at) = jwt.sign_at(Uuid::new_v4(), Utc::now() - Duration::hours(2)).unwrap();
    assert!(expires_at < Utc::now());
    let (status, body) = send(get_with_auth("/v1/namespaces", Some(&format!("Bearer {token}")))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn token_form_requires_both_fields() {
    let req = Request::builder()
        .method("POST")
        .uri("/v1/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=alice"))
        .unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn register_is_disabled_for_dummy_provider() {
    let req = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"username": "alice", "password": "Secret123"}).to_string()))
        .unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::EXPECTATION_FAILED);
    assert_eq!(body["code"], "invalid_value");
}
