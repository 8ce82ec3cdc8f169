use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::{AppConfig, DatabaseConfig};
use serde_json::{json, Value};
use tower::Service;

async fn build_app(require_token: bool) -> anyhow::Result<Router> {
    let mut cfg = AppConfig::default();
    // 单连接内存库：所有请求共享同一个 SQLite 实例
    cfg.database = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        idle_timeout_secs: 3600,
        ..Default::default()
    };
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.auth.require_token = require_token;
    Ok(server::build_app(&cfg).await?)
}

async fn send(app: &mut Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.call(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn customer_body(email: &str) -> Value {
    json!({
        "firstName": "Dana",
        "lastName": "Reyes",
        "email": email,
        "phoneNumber": "336-555-0101",
        "address": "12 Elm St, Greensboro, NC",
        "password": "S3curePass!"
    })
}

fn provider_body(email: &str) -> Value {
    json!({
        "firstName": "Sam",
        "lastName": "Ortiz",
        "businessName": "Ortiz Cleaning",
        "email": email,
        "phone": "336-555-0199",
        "address": "40 Main St, High Point, NC",
        "password": "Pr0viderPass"
    })
}

/// Registers a customer and a provider with one service; returns their ids.
async fn seed(app: &mut Router) -> anyhow::Result<(i64, i64, i64)> {
    let (status, customer) = send(app, "POST", "/api/customers", Some(customer_body("dana@example.com"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, provider) = send(app, "POST", "/api/providers/register", Some(provider_body("sam@example.com"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let provider_id = provider["id"].as_i64().unwrap();
    let (status, svc) = send(
        app,
        "POST",
        "/api/services",
        Some(json!({"providerId": provider_id, "name": "Deep Clean", "price": 120.0, "serviceType": "Cleaning"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok((customer["id"].as_i64().unwrap(), provider_id, svc["id"].as_i64().unwrap()))
}

#[tokio::test]
async fn health_and_openapi_are_served() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (status, body) = send(&mut app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, doc) = send(&mut app, "GET", "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/subscriptions/check"].is_object());
    Ok(())
}

#[tokio::test]
async fn register_then_login_returns_same_customer() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (status, created) = send(&mut app, "POST", "/api/customers", Some(customer_body("lee@example.com"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("password").is_none());
    assert!(created.get("passwordHash").is_none());

    let req = Request::builder()
        .method("POST")
        .uri("/api/customers/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": "lee@example.com", "password": "S3curePass!"}))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("set-cookie").is_some());
    let session: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await?)?;
    assert_eq!(session["customer"]["id"], created["id"]);
    assert!(session["token"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_failures() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    send(&mut app, "POST", "/api/customers", Some(customer_body("kim@example.com"))).await?;

    let (status, body) = send(&mut app, "POST", "/api/customers/login", Some(json!({"email": "kim@example.com", "password": "wrong"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");

    let (status, _) = send(&mut app, "POST", "/api/customers/login", Some(json!({"email": "", "password": ""}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_conflict_with_field() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    send(&mut app, "POST", "/api/customers", Some(customer_body("dup@example.com"))).await?;
    let (status, body) = send(&mut app, "POST", "/api/customers", Some(customer_body("dup@example.com"))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["field"], "email");
    assert_eq!(body["message"], "Email already exists. Please use a different email or login.");
    Ok(())
}

#[tokio::test]
async fn malformed_requests_get_json_400() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let mut body = customer_body("nopass@example.com");
    body.as_object_mut().unwrap().remove("password");
    let (status, err) = send(&mut app, "POST", "/api/customers", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");
    assert!(err["message"].as_str().unwrap().contains("password"));

    let (status, err) = send(&mut app, "GET", "/api/customers/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Validation Error");

    let (status, err) = send(&mut app, "GET", "/api/subscriptions/check?customerId=1", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().unwrap().contains("serviceId"));
    Ok(())
}

#[tokio::test]
async fn missing_customer_is_404_with_message() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (status, body) = send(&mut app, "GET", "/api/customers/999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Customer not found with id: 999");
    Ok(())
}

#[tokio::test]
async fn subscription_lifecycle() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (customer_id, provider_id, service_id) = seed(&mut app).await?;
    let pair = json!({"customerId": customer_id, "serviceId": service_id});

    let (status, sub) = send(&mut app, "POST", "/api/subscriptions", Some(pair.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["service"]["provider"]["businessName"], "Ortiz Cleaning");

    let (status, _) = send(&mut app, "POST", "/api/subscriptions", Some(pair)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/subscriptions/check?customerId={customer_id}&serviceId={service_id}");
    let (_, subscribed) = send(&mut app, "GET", &uri, None).await?;
    assert_eq!(subscribed, json!(true));

    let (_, by_provider) = send(&mut app, "GET", &format!("/api/subscriptions/provider/{provider_id}"), None).await?;
    assert_eq!(by_provider.as_array().map(Vec::len), Some(1));

    let (_, count) = send(&mut app, "GET", &format!("/api/subscriptions/customer/{customer_id}/count"), None).await?;
    assert_eq!(count, json!(1));

    let pair_uri = format!("/api/subscriptions/customer/{customer_id}/service/{service_id}");
    let (status, _) = send(&mut app, "DELETE", &pair_uri, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&mut app, "DELETE", &pair_uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, subscribed) = send(&mut app, "GET", &uri, None).await?;
    assert_eq!(subscribed, json!(false));
    Ok(())
}

#[tokio::test]
async fn reviews_require_subscription_and_aggregate() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (customer_id, provider_id, service_id) = seed(&mut app).await?;
    let review = json!({"customerId": customer_id, "serviceId": service_id, "rating": 4, "comment": "Spotless kitchen"});

    let (status, body) = send(&mut app, "POST", "/api/reviews", Some(review.clone())).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Customer must be subscribed to the service to write a review");

    send(&mut app, "POST", "/api/subscriptions", Some(json!({"customerId": customer_id, "serviceId": service_id}))).await?;
    let (status, created) = send(&mut app, "POST", "/api/reviews", Some(review.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["customerName"], "Dana Reyes");
    let (status, _) = send(&mut app, "POST", "/api/reviews", Some(review)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, avg) = send(&mut app, "GET", &format!("/api/reviews/service/{service_id}/average-rating"), None).await?;
    assert_eq!(avg["averageRating"], json!(4.0));
    assert_eq!(avg["reviewCount"], json!(1));

    let (_, dist) = send(&mut app, "GET", &format!("/api/reviews/service/{service_id}/rating-distribution"), None).await?;
    assert_eq!(dist, json!({"1": 0, "2": 0, "3": 0, "4": 1, "5": 0}));

    let review_id = created["id"].as_i64().unwrap();
    let (status, replied) = send(&mut app, "PUT", &format!("/api/reviews/{review_id}/response"), Some(json!({"response": "Thanks!"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replied["providerResponse"], "Thanks!");
    assert!(replied["responseDate"].is_string());

    let (_, stats) = send(&mut app, "GET", &format!("/api/reviews/provider/{provider_id}/statistics"), None).await?;
    assert_eq!(stats["totalReviews"], json!(1));
    assert_eq!(stats["serviceRatings"]["Deep Clean"], json!(4.0));
    Ok(())
}

#[tokio::test]
async fn service_activation_and_search() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (_, _, service_id) = seed(&mut app).await?;

    let (_, found) = send(&mut app, "GET", "/api/services/search?name=deep", None).await?;
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let (status, svc) = send(&mut app, "PUT", &format!("/api/services/{service_id}/deactivate"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(svc["active"], json!(false));
    let (_, active) = send(&mut app, "GET", "/api/services/active", None).await?;
    assert_eq!(active, json!([]));

    let (status, _) = send(
        &mut app,
        "POST",
        "/api/services",
        Some(json!({"providerId": 4242, "name": "Ghost", "price": 10.0})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_customer_cascades() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (customer_id, _, service_id) = seed(&mut app).await?;
    send(&mut app, "POST", "/api/subscriptions", Some(json!({"customerId": customer_id, "serviceId": service_id}))).await?;
    send(
        &mut app,
        "POST",
        "/api/reviews",
        Some(json!({"customerId": customer_id, "serviceId": service_id, "rating": 5, "comment": "Great"})),
    )
    .await?;

    let (status, body) = send(&mut app, "DELETE", &format!("/api/customers/{customer_id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Customer deleted successfully.");

    let (_, subs) = send(&mut app, "GET", &format!("/api/subscriptions/service/{service_id}"), None).await?;
    assert_eq!(subs, json!([]));
    let (_, reviews) = send(&mut app, "GET", &format!("/api/reviews/service/{service_id}"), None).await?;
    assert_eq!(reviews, json!([]));
    Ok(())
}

#[tokio::test]
async fn location_endpoints_use_city_table() -> anyhow::Result<()> {
    let mut app = build_app(false).await?;
    let (customer_id, _, _) = seed(&mut app).await?;

    let (_, listed) = send(&mut app, "GET", &format!("/api/location/services/with-distance?customerId={customer_id}"), None).await?;
    let first = &listed[0];
    assert!(first["distance"].as_f64().unwrap() > 0.0);
    assert!(first["distanceFormatted"].as_str().unwrap().ends_with("miles away"));

    let (_, summary) = send(&mut app, "GET", &format!("/api/location/services/distance-summary?customerId={customer_id}"), None).await?;
    assert_eq!(summary["totalServices"], json!(1));
    assert_eq!(summary["within25Miles"], json!(1));

    let (status, _) = send(&mut app, "GET", "/api/location/geocode?address=Nowhere%20Town", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn token_required_when_enabled() -> anyhow::Result<()> {
    let mut app = build_app(true).await?;
    let (status, _) = send(&mut app, "POST", "/api/customers", Some(customer_body("tok@example.com"))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&mut app, "GET", "/api/customers", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, session) = send(&mut app, "POST", "/api/customers/login", Some(json!({"email": "tok@example.com", "password": "S3curePass!"}))).await?;
    let token = session["token"].as_str().unwrap().to_string();
    let req = Request::builder()
        .uri("/api/customers")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}
