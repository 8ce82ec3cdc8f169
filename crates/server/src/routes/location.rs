use axum::{extract::{Query, State}, Json};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use common::types::{DistanceResult, DistanceSummary, GeocodeResult, ServiceWithDistance};

use crate::{errors::{ApiQuery, JsonApiError}, state::ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub customer_id: i32,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub customer_id: i32,
    /// Miles; the configured default applies when absent.
    pub max_distance: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DistanceQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct GeocodeQuery {
    pub address: String,
}

#[utoipa::path(
    get, path = "/api/location/services/with-distance", tag = "location", params(CustomerQuery),
    responses((status = 200, description = "Active services sorted by distance"), (status = 404, description = "Customer Not Found"))
)]
pub async fn with_distance(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<CustomerQuery>) -> Result<Json<Vec<ServiceWithDistance>>, JsonApiError> {
    Ok(Json(state.location.services_with_distance(&state.db, q.customer_id).await?))
}

#[utoipa::path(
    get, path = "/api/location/services/nearby", tag = "location", params(NearbyQuery),
    responses((status = 200, description = "Services within range"), (status = 404, description = "Customer Not Found"))
)]
pub async fn nearby(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<NearbyQuery>) -> Result<Json<Vec<ServiceWithDistance>>, JsonApiError> {
    Ok(Json(state.location.nearby_services(&state.db, q.customer_id, q.max_distance).await?))
}

#[utoipa::path(
    get, path = "/api/location/distance", tag = "location", params(DistanceQuery),
    responses((status = 200, description = "Distance in miles and km"), (status = 400, description = "Blank address"))
)]
pub async fn distance(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<DistanceQuery>) -> Result<Json<DistanceResult>, JsonApiError> {
    Ok(Json(state.location.distance(&q.from, &q.to).await?))
}

#[utoipa::path(
    get, path = "/api/location/geocode", tag = "location", params(GeocodeQuery),
    responses((status = 200, description = "Coordinates"), (status = 404, description = "Could not geocode address"))
)]
pub async fn geocode(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<GeocodeQuery>) -> Result<Json<GeocodeResult>, JsonApiError> {
    Ok(Json(state.location.geocode_address(&q.address).await?))
}

#[utoipa::path(
    get, path = "/api/location/services/distance-summary", tag = "location", params(CustomerQuery),
    responses((status = 200, description = "Bucket counts"), (status = 404, description = "Customer Not Found"))
)]
pub async fn distance_summary(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<CustomerQuery>) -> Result<Json<DistanceSummary>, JsonApiError> {
    Ok(Json(state.location.distance_summary(&state.db, q.customer_id).await?))
}
