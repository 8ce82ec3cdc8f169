use std::collections::BTreeMap;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use common::types::{
    CustomerRegistration, CustomerSession, CustomerUpdate, CustomerView, DistanceResult, DistanceSummary, ErrorBody,
    GeocodeResult, Health, LoginRequest, MessageResponse, NewReview, NewService, NewSubscription, ProviderRatingStatistics,
    ProviderRegistration, ProviderReply, ProviderSession, ProviderUpdate, ProviderView, RatingSummary, ReviewUpdate,
    ReviewView, ServiceUpdate, ServiceView, ServiceWithDistance, SubscriptionView,
};

use crate::errors::{ClientError, LOGIN_FAILED};

/// HTTP client for every HomeConnect resource.
///
/// Cloning is cheap; clones share the connection pool and carry the token
/// held at the time of cloning.
#[derive(Debug, Clone)]
pub struct HomeConnectClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HomeConnectClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, token: None }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `prefix` followed by one percent-encoded path segment.
    fn segment_url(&self, prefix: &str, segment: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.url(prefix)).map_err(|e| ClientError::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Network(format!("base url cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(self.http.request(method, self.url(path)))
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .map(|b| b.message.unwrap_or(b.error))
            .filter(|m| !m.is_empty())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        debug!(status = status.as_u16(), %message, "request rejected");
        Err(ClientError::Status { status: status.as_u16(), message })
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ClientError> {
        let resp = Self::check(rb.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send_empty(&self, rb: RequestBuilder) -> Result<(), ClientError> {
        Self::check(rb.send().await?).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send_empty(self.request(Method::DELETE, path)).await
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        self.get("/health").await
    }

    // ---- customers ----

    pub async fn register_customer(&self, input: &CustomerRegistration) -> Result<CustomerView, ClientError> {
        self.post("/api/customers", input).await
    }

    /// Log in and keep the returned token for later calls.
    pub async fn login_customer(&mut self, email: &str, password: &str) -> Result<CustomerSession, ClientError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let session: CustomerSession = self.post("/api/customers/login", &body).await.map_err(login_error)?;
        self.token = session.token.clone();
        Ok(session)
    }

    pub async fn list_customers(&self) -> Result<Vec<CustomerView>, ClientError> {
        self.get("/api/customers").await
    }

    pub async fn get_customer(&self, id: i32) -> Result<CustomerView, ClientError> {
        self.get(&format!("/api/customers/{id}")).await
    }

    pub async fn get_customer_by_email(&self, email: &str) -> Result<CustomerView, ClientError> {
        let url = self.segment_url("/api/customers/email/", email)?;
        self.send(self.authorize(self.http.get(url))).await
    }

    /// Case-insensitive contains search; `None` filters are ignored.
    pub async fn search_customers(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        address: Option<&str>,
    ) -> Result<Vec<CustomerView>, ClientError> {
        let params: Vec<(&str, &str)> = [("firstName", first_name), ("lastName", last_name), ("address", address)]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        self.send(self.request(Method::GET, "/api/customers/search").query(&params)).await
    }

    pub async fn find_customer_by_phone(&self, phone_number: &str) -> Result<CustomerView, ClientError> {
        let rb = self.request(Method::GET, "/api/customers/search/phone").query(&[("phoneNumber", phone_number)]);
        self.send(rb).await
    }

    pub async fn update_customer(&self, id: i32, changes: &CustomerUpdate) -> Result<CustomerView, ClientError> {
        self.put(&format!("/api/customers/{id}"), changes).await
    }

    pub async fn delete_customer(&self, id: i32) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/api/customers/{id}"))).await
    }

    // ---- providers ----

    pub async fn register_provider(&self, input: &ProviderRegistration) -> Result<ProviderView, ClientError> {
        self.post("/providers/register", input).await
    }

    pub async fn login_provider(&mut self, email: &str, password: &str) -> Result<ProviderSession, ClientError> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let session: ProviderSession = self.post("/providers/login", &body).await.map_err(login_error)?;
        self.token = session.token.clone();
        Ok(session)
    }

    pub async fn list_providers(&self) -> Result<Vec<ProviderView>, ClientError> {
        self.get("/api/providers").await
    }

    pub async fn list_active_providers(&self) -> Result<Vec<ProviderView>, ClientError> {
        self.get("/api/providers/active").await
    }

    pub async fn get_provider(&self, id: i32) -> Result<ProviderView, ClientError> {
        self.get(&format!("/api/providers/{id}")).await
    }

    pub async fn update_provider(&self, id: i32, changes: &ProviderUpdate) -> Result<ProviderView, ClientError> {
        self.put(&format!("/api/providers/{id}"), changes).await
    }

    pub async fn delete_provider(&self, id: i32) -> Result<(), ClientError> {
        self.delete(&format!("/api/providers/{id}")).await
    }

    // ---- services ----

    pub async fn list_services(&self) -> Result<Vec<ServiceView>, ClientError> {
        self.get("/api/services").await
    }

    pub async fn list_active_services(&self) -> Result<Vec<ServiceView>, ClientError> {
        self.get("/api/services/active").await
    }

    pub async fn search_services(&self, name: &str) -> Result<Vec<ServiceView>, ClientError> {
        self.send(self.request(Method::GET, "/api/services/search").query(&[("name", name)])).await
    }

    pub async fn list_provider_services(&self, provider_id: i32) -> Result<Vec<ServiceView>, ClientError> {
        self.get(&format!("/api/services/provider/{provider_id}")).await
    }

    pub async fn get_service(&self, id: i32) -> Result<ServiceView, ClientError> {
        self.get(&format!("/api/services/{id}")).await
    }

    pub async fn create_service(&self, input: &NewService) -> Result<ServiceView, ClientError> {
        self.post("/api/services", input).await
    }

    pub async fn update_service(&self, id: i32, changes: &ServiceUpdate) -> Result<ServiceView, ClientError> {
        self.put(&format!("/api/services/{id}"), changes).await
    }

    pub async fn delete_service(&self, id: i32) -> Result<(), ClientError> {
        self.delete(&format!("/api/services/{id}")).await
    }

    pub async fn activate_service(&self, id: i32) -> Result<ServiceView, ClientError> {
        self.send(self.request(Method::PUT, &format!("/api/services/{id}/activate"))).await
    }

    pub async fn deactivate_service(&self, id: i32) -> Result<ServiceView, ClientError> {
        self.send(self.request(Method::PUT, &format!("/api/services/{id}/deactivate"))).await
    }

    // ---- subscriptions ----

    pub async fn subscribe(&self, customer_id: i32, service_id: i32) -> Result<SubscriptionView, ClientError> {
        self.post("/api/subscriptions", &NewSubscription { customer_id, service_id }).await
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<SubscriptionView>, ClientError> {
        self.get("/api/subscriptions").await
    }

    pub async fn get_subscription(&self, id: i32) -> Result<SubscriptionView, ClientError> {
        self.get(&format!("/api/subscriptions/{id}")).await
    }

    pub async fn customer_subscriptions(&self, customer_id: i32) -> Result<Vec<SubscriptionView>, ClientError> {
        self.get(&format!("/api/subscriptions/customer/{customer_id}")).await
    }

    pub async fn service_subscriptions(&self, service_id: i32) -> Result<Vec<SubscriptionView>, ClientError> {
        self.get(&format!("/api/subscriptions/service/{service_id}")).await
    }

    pub async fn provider_subscriptions(&self, provider_id: i32) -> Result<Vec<SubscriptionView>, ClientError> {
        self.get(&format!("/api/subscriptions/provider/{provider_id}")).await
    }

    pub async fn delete_subscription(&self, id: i32) -> Result<(), ClientError> {
        self.delete(&format!("/api/subscriptions/{id}")).await
    }

    pub async fn unsubscribe(&self, customer_id: i32, service_id: i32) -> Result<(), ClientError> {
        self.delete(&format!("/api/subscriptions/customer/{customer_id}/service/{service_id}")).await
    }

    pub async fn is_subscribed(&self, customer_id: i32, service_id: i32) -> Result<bool, ClientError> {
        let rb = self
            .request(Method::GET, "/api/subscriptions/check")
            .query(&[("customerId", customer_id), ("serviceId", service_id)]);
        self.send(rb).await
    }

    pub async fn customer_subscription_count(&self, customer_id: i32) -> Result<u64, ClientError> {
        self.get(&format!("/api/subscriptions/customer/{customer_id}/count")).await
    }

    pub async fn service_subscription_count(&self, service_id: i32) -> Result<u64, ClientError> {
        self.get(&format!("/api/subscriptions/service/{service_id}/count")).await
    }

    // ---- reviews ----

    pub async fn create_review(&self, input: &NewReview) -> Result<ReviewView, ClientError> {
        self.post("/api/reviews", input).await
    }

    pub async fn list_reviews(&self) -> Result<Vec<ReviewView>, ClientError> {
        self.get("/api/reviews").await
    }

    pub async fn get_review(&self, id: i32) -> Result<ReviewView, ClientError> {
        self.get(&format!("/api/reviews/{id}")).await
    }

    pub async fn update_review(&self, id: i32, changes: &ReviewUpdate) -> Result<ReviewView, ClientError> {
        self.put(&format!("/api/reviews/{id}"), changes).await
    }

    pub async fn delete_review(&self, id: i32) -> Result<(), ClientError> {
        self.delete(&format!("/api/reviews/{id}")).await
    }

    pub async fn service_reviews(&self, service_id: i32) -> Result<Vec<ReviewView>, ClientError> {
        self.get(&format!("/api/reviews/service/{service_id}")).await
    }

    pub async fn customer_reviews(&self, customer_id: i32) -> Result<Vec<ReviewView>, ClientError> {
        self.get(&format!("/api/reviews/customer/{customer_id}")).await
    }

    pub async fn provider_reviews(&self, provider_id: i32) -> Result<Vec<ReviewView>, ClientError> {
        self.get(&format!("/api/reviews/provider/{provider_id}")).await
    }

    pub async fn average_rating(&self, service_id: i32) -> Result<RatingSummary, ClientError> {
        self.get(&format!("/api/reviews/service/{service_id}/average-rating")).await
    }

    pub async fn rating_distribution(&self, service_id: i32) -> Result<BTreeMap<i32, u64>, ClientError> {
        self.get(&format!("/api/reviews/service/{service_id}/rating-distribution")).await
    }

    pub async fn provider_statistics(&self, provider_id: i32) -> Result<ProviderRatingStatistics, ClientError> {
        self.get(&format!("/api/reviews/provider/{provider_id}/statistics")).await
    }

    pub async fn respond_to_review(&self, id: i32, response: &str) -> Result<ReviewView, ClientError> {
        let body = ProviderReply { response: response.to_string() };
        self.put(&format!("/api/reviews/{id}/response"), &body).await
    }

    // ---- location ----

    pub async fn services_with_distance(&self, customer_id: i32) -> Result<Vec<ServiceWithDistance>, ClientError> {
        let rb = self
            .request(Method::GET, "/api/location/services/with-distance")
            .query(&[("customerId", customer_id)]);
        self.send(rb).await
    }

    /// `max_miles` of `None` uses the server's default radius.
    pub async fn nearby_services(&self, customer_id: i32, max_miles: Option<f64>) -> Result<Vec<ServiceWithDistance>, ClientError> {
        let mut rb = self
            .request(Method::GET, "/api/location/services/nearby")
            .query(&[("customerId", customer_id)]);
        if let Some(m) = max_miles {
            rb = rb.query(&[("maxDistance", m)]);
        }
        self.send(rb).await
    }

    pub async fn distance(&self, from: &str, to: &str) -> Result<DistanceResult, ClientError> {
        self.send(self.request(Method::GET, "/api/location/distance").query(&[("from", from), ("to", to)])).await
    }

    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, ClientError> {
        self.send(self.request(Method::GET, "/api/location/geocode").query(&[("address", address)])).await
    }

    pub async fn distance_summary(&self, customer_id: i32) -> Result<DistanceSummary, ClientError> {
        let rb = self
            .request(Method::GET, "/api/location/services/distance-summary")
            .query(&[("customerId", customer_id)]);
        self.send(rb).await
    }
}

fn login_error(e: ClientError) -> ClientError {
    match e {
        ClientError::Status { status: 401, .. } => ClientError::Status { status: 401, message: LOGIN_FAILED.into() },
        other => other,
    }
}
