pub mod customers;
pub mod location;
pub mod providers;
pub mod reviews;
pub mod services;
pub mod subscriptions;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::{metrics::encode_metrics, types::Health};

use crate::{
    middleware::{require_bearer_token, track_metrics, AUTH_COOKIE},
    openapi::ApiDoc,
    state::ServerState,
};

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> impl IntoResponse {
    encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Login cookie mirroring the bearer token returned in the body.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn customer_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/customers", get(customers::list).post(customers::register))
        .route("/api/customers/login", post(customers::login))
        .route("/api/customers/search", get(customers::search))
        .route("/api/customers/search/firstname", get(customers::search_first_name))
        .route("/api/customers/search/lastname", get(customers::search_last_name))
        .route("/api/customers/search/address", get(customers::search_address))
        .route("/api/customers/search/phone", get(customers::search_phone))
        .route("/api/customers/email/:email", get(customers::get_by_email))
        .route(
            "/api/customers/:id",
            get(customers::get).put(customers::update).delete(customers::delete),
        )
}

fn provider_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/providers", get(providers::list).post(providers::register))
        .route("/api/providers/register", post(providers::register))
        .route("/api/providers/login", post(providers::login))
        .route("/providers/register", post(providers::register))
        .route("/providers/login", post(providers::login))
        .route("/api/providers/active", get(providers::list_active))
        .route(
            "/api/providers/:id",
            get(providers::get).put(providers::update).delete(providers::delete),
        )
}

fn service_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/services", get(services::list).post(services::create))
        .route("/api/services/active", get(services::list_active))
        .route("/api/services/search", get(services::search))
        .route("/api/services/provider/:provider_id", get(services::list_by_provider))
        .route(
            "/api/services/:id",
            get(services::get).put(services::update).delete(services::delete),
        )
        .route("/api/services/:id/activate", put(services::activate))
        .route("/api/services/:id/deactivate", put(services::deactivate))
}

fn subscription_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/subscriptions", get(subscriptions::list).post(subscriptions::create))
        .route("/api/subscriptions/check", get(subscriptions::check))
        .route("/api/subscriptions/customer/:customer_id", get(subscriptions::list_by_customer))
        .route("/api/subscriptions/customer/:customer_id/count", get(subscriptions::count_by_customer))
        .route(
            "/api/subscriptions/customer/:customer_id/service/:service_id",
            axum::routing::delete(subscriptions::delete_pair),
        )
        .route("/api/subscriptions/service/:service_id", get(subscriptions::list_by_service))
        .route("/api/subscriptions/service/:service_id/count", get(subscriptions::count_by_service))
        .route("/api/subscriptions/provider/:provider_id", get(subscriptions::list_by_provider))
        .route(
            "/api/subscriptions/:id",
            get(subscriptions::get).delete(subscriptions::delete),
        )
}

fn review_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/reviews", get(reviews::list).post(reviews::create))
        .route("/api/reviews/service/:service_id", get(reviews::list_by_service))
        .route("/api/reviews/service/:service_id/average-rating", get(reviews::average_rating))
        .route("/api/reviews/service/:service_id/rating-distribution", get(reviews::rating_distribution))
        .route("/api/reviews/customer/:customer_id", get(reviews::list_by_customer))
        .route("/api/reviews/provider/:provider_id", get(reviews::list_by_provider))
        .route("/api/reviews/provider/:provider_id/statistics", get(reviews::provider_statistics))
        .route(
            "/api/reviews/:id",
            get(reviews::get).put(reviews::update).delete(reviews::delete),
        )
        .route("/api/reviews/:id/response", put(reviews::respond))
}

fn location_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/location/services/with-distance", get(location::with_distance))
        .route("/api/location/services/nearby", get(location::nearby))
        .route("/api/location/services/distance-summary", get(location::distance_summary))
        .route("/api/location/distance", get(location::distance))
        .route("/api/location/geocode", get(location::geocode))
}

/// Build the full application router: ops endpoints plus every resource group.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    let api = Router::new()
        .merge(customer_routes())
        .merge(provider_routes())
        .merge(service_routes())
        .merge(subscription_routes())
        .merge(review_routes())
        .merge(location_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token));

    Router::new()
        .merge(public)
        .merge(api)
        .with_state(state)
        .route_layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时记录状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
