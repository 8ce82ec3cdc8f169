use std::collections::BTreeMap;

use axum::{extract::{Path, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use tracing::info;

use common::types::{NewReview, ProviderRatingStatistics, ProviderReply, RatingSummary, ReviewUpdate, ReviewView};
use service::review_service;

use crate::{errors::{ApiJson, ApiPath, JsonApiError}, state::ServerState};

#[utoipa::path(
    post, path = "/api/reviews", tag = "reviews",
    request_body = crate::openapi::NewReviewDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Not subscribed or rating out of range"),
        (status = 404, description = "Customer or service not found"),
        (status = 409, description = "Already reviewed")
    )
)]
pub async fn create(State(state): State<ServerState>, WithRejection(Json(input), _): ApiJson<NewReview>) -> Result<(StatusCode, Json<ReviewView>), JsonApiError> {
    let created = review_service::create(&state.db, input).await?;
    info!(review_id = created.id, service_id = created.service_id, rating = created.rating, "review created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/reviews", tag = "reviews", responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ReviewView>>, JsonApiError> {
    Ok(Json(review_service::list_all(&state.db).await?))
}

#[utoipa::path(
    get, path = "/api/reviews/{id}", tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<ReviewView>, JsonApiError> {
    Ok(Json(review_service::get(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/reviews/{id}", tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = crate::openapi::ReviewUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>, WithRejection(Json(input), _): ApiJson<ReviewUpdate>) -> Result<Json<ReviewView>, JsonApiError> {
    Ok(Json(review_service::update(&state.db, id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/reviews/{id}", tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    review_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/reviews/service/{service_id}", tag = "reviews",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Newest first"), (status = 404, description = "Service Not Found"))
)]
pub async fn list_by_service(State(state): State<ServerState>, WithRejection(Path(service_id), _): ApiPath<i32>) -> Result<Json<Vec<ReviewView>>, JsonApiError> {
    Ok(Json(review_service::list_by_service(&state.db, service_id).await?))
}

#[utoipa::path(
    get, path = "/api/reviews/customer/{customer_id}", tag = "reviews",
    params(("customer_id" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "Newest first"), (status = 404, description = "Customer Not Found"))
)]
pub async fn list_by_customer(State(state): State<ServerState>, WithRejection(Path(customer_id), _): ApiPath<i32>) -> Result<Json<Vec<ReviewView>>, JsonApiError> {
    Ok(Json(review_service::list_by_customer(&state.db, customer_id).await?))
}

#[utoipa::path(
    get, path = "/api/reviews/provider/{provider_id}", tag = "reviews",
    params(("provider_id" = i32, Path, description = "Provider ID")),
    responses((status = 200, description = "Newest first"), (status = 404, description = "Provider Not Found"))
)]
pub async fn list_by_provider(State(state): State<ServerState>, WithRejection(Path(provider_id), _): ApiPath<i32>) -> Result<Json<Vec<ReviewView>>, JsonApiError> {
    Ok(Json(review_service::list_by_provider(&state.db, provider_id).await?))
}

#[utoipa::path(
    get, path = "/api/reviews/service/{service_id}/average-rating", tag = "reviews",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Average and count"), (status = 404, description = "Service Not Found"))
)]
pub async fn average_rating(State(state): State<ServerState>, WithRejection(Path(service_id), _): ApiPath<i32>) -> Result<Json<RatingSummary>, JsonApiError> {
    Ok(Json(review_service::average_rating(&state.db, service_id).await?))
}

#[utoipa::path(
    get, path = "/api/reviews/service/{service_id}/rating-distribution", tag = "reviews",
    params(("service_id" = i32, Path, description = "Service ID")),
    responses((status = 200, description = "Counts for ratings 1 through 5"), (status = 404, description = "Service Not Found"))
)]
pub async fn rating_distribution(State(state): State<ServerState>, WithRejection(Path(service_id), _): ApiPath<i32>) -> Result<Json<BTreeMap<i32, u64>>, JsonApiError> {
    Ok(Json(review_service::rating_distribution(&state.db, service_id).await?))
}

#[utoipa::path(
    get, path = "/api/reviews/provider/{provider_id}/statistics", tag = "reviews",
    params(("provider_id" = i32, Path, description = "Provider ID")),
    responses((status = 200, description = "Aggregate statistics"), (status = 404, description = "Provider Not Found"))
)]
pub async fn provider_statistics(State(state): State<ServerState>, WithRejection(Path(provider_id), _): ApiPath<i32>) -> Result<Json<ProviderRatingStatistics>, JsonApiError> {
    Ok(Json(review_service::provider_statistics(&state.db, provider_id).await?))
}

#[utoipa::path(
    put, path = "/api/reviews/{id}/response", tag = "reviews",
    params(("id" = i32, Path, description = "Review ID")),
    request_body = crate::openapi::ProviderReplyDoc,
    responses((status = 200, description = "Response recorded"), (status = 400, description = "Empty response"), (status = 404, description = "Not Found"))
)]
pub async fn respond(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>, WithRejection(Json(input), _): ApiJson<ProviderReply>) -> Result<Json<ReviewView>, JsonApiError> {
    let updated = review_service::respond(&state.db, id, &input.response).await?;
    info!(review_id = id, "provider responded to review");
    Ok(Json(updated))
}
