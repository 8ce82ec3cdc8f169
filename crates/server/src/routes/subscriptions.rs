use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use common::types::{NewSubscription, SubscriptionView};
use service::subscription_service;

use crate::{errors::{ApiJson, ApiPath, ApiQuery, JsonApiError}, state::ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    pub customer_id: i32,
    pub service_id: i32,
}

#[utoipa::path(
    post, path = "/api/subscriptions", tag = "subscriptions",
    request_body = crate::openapi::NewSubscriptionDoc,
    responses(
        (status = 201, description = "Subscribed"),
        (status = 404, description = "Customer or service not found"),
        (status = 409, description = "Already subscribed")
    )
)]
pub async fn create(State(state): State<ServerState>, WithRejection(Json(input), _): ApiJson<NewSubscription>) -> Result<(StatusCode, Json<SubscriptionView>), JsonApiError> {
    let created = subscription_service::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/subscriptions", tag = "subscriptions", responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<SubscriptionView>>, JsonApiError> {
    Ok(Json(subscription_service::list_all(&state.db).await?))
}

#[utoipa::path(
    get, path = "/api/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<SubscriptionView>, JsonApiError> {
    Ok(Json(subscription_service::get(&state.db, id).await?))
}

#[utoipa::path(
    get, path = "/api/subscriptions/customer/{customer_id}", tag = "subscriptions",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Customer Not Found"))
)]
pub async fn list_by_customer(State(state): State<ServerState>, WithRejection(Path(customer_id), _): ApiPath<i32>) -> Result<Json<Vec<SubscriptionView>>, JsonApiError> {
    Ok(Json(subscription_service::list_by_customer(&state.db, customer_id).await?))
}

#[utoipa::path(
    get, path = "/api/subscriptions/service/{service_id}", tag = "subscriptions",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Service Not Found"))
)]
pub async fn list_by_service(State(state): State<ServerState>, WithRejection(Path(service_id), _): ApiPath<i32>) -> Result<Json<Vec<SubscriptionView>>, JsonApiError> {
    Ok(Json(subscription_service::list_by_service(&state.db, service_id).await?))
}

#[utoipa::path(
    get, path = "/api/subscriptions/provider/{provider_id}", tag = "subscriptions",
    params(("provider_id" = i32, Path, description = "Provider ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Provider Not Found"))
)]
pub async fn list_by_provider(State(state): State<ServerState>, WithRejection(Path(provider_id), _): ApiPath<i32>) -> Result<Json<Vec<SubscriptionView>>, JsonApiError> {
    Ok(Json(subscription_service::list_by_provider(&state.db, provider_id).await?))
}

#[utoipa::path(
    delete, path = "/api/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    subscription_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/subscriptions/customer/{customer_id}/service/{service_id}", tag = "subscriptions",
    params(("customer_id" = i32, Path, description = "Customer ID"), ("service_id" = i32, Path, description = "Service ID")),
    responses((status = 204, description = "Unsubscribed"), (status = 404, description = "Not Found"))
)]
pub async fn delete_pair(State(state): State<ServerState>, WithRejection(Path((customer_id, service_id)), _): ApiPath<(i32, i32)>) -> Result<StatusCode, JsonApiError> {
    subscription_service::delete_pair(&state.db, customer_id, service_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/subscriptions/check", tag = "subscriptions", params(CheckQuery), responses((status = 200, description = "true when subscribed")))]
pub async fn check(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<CheckQuery>) -> Result<Json<bool>, JsonApiError> {
    Ok(Json(subscription_service::is_subscribed(&state.db, q.customer_id, q.service_id).await?))
}

#[utoipa::path(
    get, path = "/api/subscriptions/customer/{customer_id}/count", tag = "subscriptions",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "Count"))
)]
pub async fn count_by_customer(State(state): State<ServerState>, WithRejection(Path(customer_id), _): ApiPath<i32>) -> Result<Json<u64>, JsonApiError> {
    Ok(Json(subscription_service::count_by_customer(&state.db, customer_id).await?))
}

#[utoipa::path(
    get, path = "/api/subscriptions/service/{service_id}/count", tag = "subscriptions",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Count"))
)]
pub async fn count_by_service(State(state): State<ServerState>, WithRejection(Path(service_id), _): ApiPath<i32>) -> Result<Json<u64>, JsonApiError> {
    Ok(Json(subscription_service::count_by_service(&state.db, service_id).await?))
}
