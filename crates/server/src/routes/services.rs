use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::info;

use common::types::{NewService, ServiceUpdate, ServiceView};
use service::catalog;

use crate::{errors::{ApiJson, ApiPath, ApiQuery, JsonApiError}, state::ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NameQuery { pub name: String }

#[utoipa::path(get, path = "/api/services", tag = "services", responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    Ok(Json(catalog::list_all(&state.db).await?))
}

#[utoipa::path(get, path = "/api/services/active", tag = "services", responses((status = 200, description = "Active services")))]
pub async fn list_active(State(state): State<ServerState>) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    let list = catalog::list_active(&state.db).await?;
    info!(count = list.len(), "list active services");
    Ok(Json(list))
}

#[utoipa::path(get, path = "/api/services/search", tag = "services", params(NameQuery), responses((status = 200, description = "Matches")))]
pub async fn search(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<NameQuery>) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    Ok(Json(catalog::search_by_name(&state.db, &q.name).await?))
}

#[utoipa::path(
    get, path = "/api/services/provider/{provider_id}", tag = "services",
    params(("provider_id" = i32, Path, description = "Provider ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Provider Not Found"))
)]
pub async fn list_by_provider(State(state): State<ServerState>, WithRejection(Path(provider_id), _): ApiPath<i32>) -> Result<Json<Vec<ServiceView>>, JsonApiError> {
    Ok(Json(catalog::list_by_provider(&state.db, provider_id).await?))
}

#[utoipa::path(
    get, path = "/api/services/{id}", tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(catalog::get(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/services", tag = "services",
    request_body = crate::openapi::NewServiceDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Provider Not Found")
    )
)]
pub async fn create(State(state): State<ServerState>, WithRejection(Json(input), _): ApiJson<NewService>) -> Result<(StatusCode, Json<ServiceView>), JsonApiError> {
    let created = catalog::create(&state.db, input).await?;
    info!(service_id = created.id, provider_id = created.provider.id, "service created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/api/services/{id}", tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = crate::openapi::ServiceUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>, WithRejection(Json(input), _): ApiJson<ServiceUpdate>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(catalog::update(&state.db, id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/services/{id}", tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    catalog::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put, path = "/api/services/{id}/activate", tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Activated"), (status = 404, description = "Not Found"))
)]
pub async fn activate(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(catalog::set_active(&state.db, id, true).await?))
}

#[utoipa::path(
    put, path = "/api/services/{id}/deactivate", tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not Found"))
)]
pub async fn deactivate(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(catalog::set_active(&state.db, id, false).await?))
}
