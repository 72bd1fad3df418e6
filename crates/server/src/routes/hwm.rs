use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use service::hwm_service;
use service::unit_of_work::UnitOfWork;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::{ApiError, ErrorBody};
use crate::schemas::{
    CopiedHwmsResponse, CopyHwmRequest, CreateHwmRequest, HwmListQuery, HwmPageResponse, HwmResponse,
    UpdateHwmRequest,
};
use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/v1/hwm",
    tag = "hwm",
    params(HwmListQuery),
    responses(
        (status = 200, description = "Page of live HWMs", body = HwmPageResponse),
        (status = 422, description = "Missing namespace_id or invalid pagination", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<HwmListQuery>, ApiError>,
) -> Result<Json<HwmPageResponse>, ApiError> {
    let params = query.page_params();
    params.validate().map_err(ApiError::invalid_request)?;
    let page = hwm_service::list_hwms(&state.db, query.namespace_id, query.name.as_deref(), params).await?;
    Ok(Json(HwmPageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/v1/hwm/{id}",
    tag = "hwm",
    params(("id" = Uuid, Path, description = "HWM id")),
    responses(
        (status = 200, description = "HWM", body = HwmResponse),
        (status = 404, description = "Not found or deleted", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<HwmResponse>, ApiError> {
    let record = hwm_service::get_hwm(&state.db, id).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/v1/hwm",
    tag = "hwm",
    request_body = CreateHwmRequest,
    responses(
        (status = 200, description = "Created HWM", body = HwmResponse),
        (status = 404, description = "Unknown namespace", body = ErrorBody),
        (status = 409, description = "Name already used in the namespace", body = ErrorBody),
        (status = 417, description = "Invalid name or type", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<CreateHwmRequest>, ApiError>,
) -> Result<Json<HwmResponse>, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let record = hwm_service::create_hwm(uow.conn(), &user, body.into()).await?;
    uow.commit().await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    patch,
    path = "/v1/hwm/{id}",
    tag = "hwm",
    params(("id" = Uuid, Path, description = "HWM id")),
    request_body = UpdateHwmRequest,
    responses(
        (status = 200, description = "Updated HWM", body = HwmResponse),
        (status = 404, description = "Not found or deleted", body = ErrorBody),
        (status = 409, description = "Name already used in the namespace", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateHwmRequest>, ApiError>,
) -> Result<Json<HwmResponse>, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let record = hwm_service::update_hwm(uow.conn(), &user, id, body.into()).await?;
    uow.commit().await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/hwm/{id}",
    tag = "hwm",
    params(("id" = Uuid, Path, description = "HWM id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or already deleted", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    hwm_service::delete_hwm(uow.conn(), &user, id).await?;
    uow.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/hwm/copy",
    tag = "hwm",
    request_body = CopyHwmRequest,
    responses(
        (status = 200, description = "Copies in the target namespace", body = CopiedHwmsResponse),
        (status = 404, description = "Unknown namespace or HWM", body = ErrorBody),
        (status = 409, description = "Name collision in the target namespace", body = ErrorBody),
        (status = 417, description = "Source equals target or no ids", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn copy(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<CopyHwmRequest>, ApiError>,
) -> Result<Json<CopiedHwmsResponse>, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let copies = hwm_service::copy_hwms(uow.conn(), &user, body.into()).await?;
    uow.commit().await?;
    Ok(Json(CopiedHwmsResponse { items: copies.into_iter().map(Into::into).collect() }))
}
