use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use service::namespace_service;
use service::unit_of_work::UnitOfWork;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::{ApiError, ErrorBody};
use crate::schemas::{
    CreateNamespaceRequest, NamespaceListQuery, NamespacePageResponse, NamespaceResponse,
    UpdateNamespaceRequest,
};
use crate::state::ServerState;

#[utoipa::path(
    get,
    path = "/v1/namespaces",
    tag = "namespaces",
    params(NamespaceListQuery),
    responses(
        (status = 200, description = "Page of namespaces", body = NamespacePageResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 422, description = "Invalid pagination", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<NamespaceListQuery>, ApiError>,
) -> Result<Json<NamespacePageResponse>, ApiError> {
    let params = query.page_params();
    params.validate().map_err(ApiError::invalid_request)?;
    let page = namespace_service::list_namespaces(&state.db, query.name.as_deref(), params).await?;
    Ok(Json(NamespacePageResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/v1/namespaces/{id}",
    tag = "namespaces",
    params(("id" = Uuid, Path, description = "Namespace id")),
    responses(
        (status = 200, description = "Namespace", body = NamespaceResponse),
        (status = 404, description = "Not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<NamespaceResponse>, ApiError> {
    let record = namespace_service::get_namespace(&state.db, id).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/v1/namespaces",
    tag = "namespaces",
    request_body = CreateNamespaceRequest,
    responses(
        (status = 200, description = "Created namespace", body = NamespaceResponse),
        (status = 409, description = "Name already taken", body = ErrorBody),
        (status = 417, description = "Invalid name", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Json(body), _): WithRejection<Json<CreateNamespaceRequest>, ApiError>,
) -> Result<Json<NamespaceResponse>, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let record = namespace_service::create_namespace(uow.conn(), &user, body.into()).await?;
    uow.commit().await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    patch,
    path = "/v1/namespaces/{id}",
    tag = "namespaces",
    params(("id" = Uuid, Path, description = "Namespace id")),
    request_body = UpdateNamespaceRequest,
    responses(
        (status = 200, description = "Updated namespace", body = NamespaceResponse),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateNamespaceRequest>, ApiError>,
) -> Result<Json<NamespaceResponse>, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let record = namespace_service::update_namespace(uow.conn(), &user, id, body.into()).await?;
    uow.commit().await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/v1/namespaces/{id}",
    tag = "namespaces",
    params(("id" = Uuid, Path, description = "Namespace id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody),
        (status = 417, description = "Namespace still holds HWMs", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    namespace_service::delete_namespace(uow.conn(), &user, id).await?;
    uow.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
