use axum::{extract::{Path, State}, http::StatusCode, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use tracing::info;

use common::types::{LoginRequest, ProviderRegistration, ProviderSession, ProviderUpdate, ProviderView};
use service::auth::domain::{LoginInput, Role};
use service::errors::ServiceError;
use service::provider_service;

use crate::{errors::{ApiJson, ApiPath, JsonApiError}, routes::session_cookie, state::ServerState};

#[utoipa::path(
    post, path = "/api/providers/register", tag = "providers",
    request_body = crate::openapi::ProviderRegistrationDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn register(State(state): State<ServerState>, WithRejection(Json(input), _): ApiJson<ProviderRegistration>) -> Result<(StatusCode, Json<ProviderView>), JsonApiError> {
    let created = provider_service::register(&state.db, input).await?;
    info!(provider_id = created.id, "provider registered");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post, path = "/api/providers/login", tag = "providers",
    request_body = crate::openapi::LoginRequestDoc,
    responses((status = 200, description = "Logged In"), (status = 401, description = "Invalid email or password."))
)]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, WithRejection(Json(input), _): ApiJson<LoginRequest>) -> Result<(CookieJar, Json<ProviderSession>), JsonApiError> {
    let session = state.auth
        .login(LoginInput { role: Role::Provider, email: input.email, password: input.password })
        .await
        .map_err(ServiceError::from)?;
    let provider = provider_service::get(&state.db, session.account_id).await?;
    let jar = match &session.token {
        Some(token) => jar.add(session_cookie(token.clone())),
        None => jar,
    };
    info!(provider_id = provider.id, "provider logged in");
    Ok((jar, Json(ProviderSession { provider, token: session.token })))
}

#[utoipa::path(get, path = "/api/providers", tag = "providers", responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ProviderView>>, JsonApiError> {
    Ok(Json(provider_service::list(&state.db).await?))
}

#[utoipa::path(get, path = "/api/providers/active", tag = "providers", responses((status = 200, description = "Active providers")))]
pub async fn list_active(State(state): State<ServerState>) -> Result<Json<Vec<ProviderView>>, JsonApiError> {
    Ok(Json(provider_service::list_active(&state.db).await?))
}

#[utoipa::path(
    get, path = "/api/providers/{id}", tag = "providers",
    params(("id" = i32, Path, description = "Provider ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<ProviderView>, JsonApiError> {
    Ok(Json(provider_service::get(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/providers/{id}", tag = "providers",
    params(("id" = i32, Path, description = "Provider ID")),
    request_body = crate::openapi::ProviderUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 409, description = "Email already exists"))
)]
pub async fn update(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>, WithRejection(Json(input), _): ApiJson<ProviderUpdate>) -> Result<Json<ProviderView>, JsonApiError> {
    Ok(Json(provider_service::update(&state.db, id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/providers/{id}", tag = "providers",
    params(("id" = i32, Path, description = "Provider ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    provider_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
