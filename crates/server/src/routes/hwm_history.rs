use axum::extract::{Query, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use service::hwm_history_service;

use crate::errors::{ApiError, ErrorBody};
use crate::schemas::{HwmHistoryPageResponse, HwmHistoryQuery};
use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/v1/hwm-history",
    tag = "hwm-history",
    params(HwmHistoryQuery),
    responses(
        (status = 200, description = "Changes of one HWM, newest first", body = HwmHistoryPageResponse),
        (status = 404, description = "Unknown HWM", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<HwmHistoryQuery>, ApiError>,
) -> Result<Json<HwmHistoryPageResponse>, ApiError> {
    let params = query.page_params();
    params.validate().map_err(ApiError::invalid_request)?;
    let page = hwm_history_service::list_history(&state.db, query.hwm_id, params).await?;
    Ok(Json(HwmHistoryPageResponse::from_page(page)))
}
