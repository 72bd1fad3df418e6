//! Router assembly: public routes, bearer-protected `/v1` routes, docs.

pub mod auth;
pub mod hwm;
pub mod hwm_history;
pub mod monitoring;
pub mod namespaces;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

/// Build the full application router.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // no token required
    let public = Router::new()
        .route("/monitoring/ping", get(monitoring::ping))
        .route("/v1/auth/token", post(auth::token))
        .route("/v1/auth/register", post(auth::register));

    let protected = Router::new()
        .route("/v1/users/me", get(auth::me))
        .route("/v1/namespaces", get(namespaces::list).post(namespaces::create))
        .route(
            "/v1/namespaces/:id",
            get(namespaces::get).patch(namespaces::update).delete(namespaces::delete),
        )
        .route("/v1/hwm", get(hwm::list).post(hwm::create))
        .route("/v1/hwm/copy", post(hwm::copy))
        .route("/v1/hwm/:id", get(hwm::get).patch(hwm::update).delete(hwm::delete))
        .route("/v1/hwm-history", get(hwm_history::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), crate::auth::require_bearer_token));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
