use axum::Json;
use common::types::Ping;

#[utoipa::path(
    get,
    path = "/monitoring/ping",
    tag = "monitoring",
    responses((status = 200, description = "Service is alive", body = crate::schemas::PingResponse))
)]
pub async fn ping() -> Json<Ping> {
    Json(Ping::ok())
}
