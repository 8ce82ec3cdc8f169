//! JSON wire types shared by the HTTP server and the resource client.
//!
//! Field names are camelCase on the wire.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<FixedOffset>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Health {
    pub status: String,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok".into() }
    }
}

/// Generic `{"message": ...}` body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ---- customers ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CustomerView {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub password: String,
}

/// Partial profile update; absent fields are left unchanged and an empty
/// password keeps the current one.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CustomerSession {
    pub customer: CustomerView,
    #[serde(default)]
    pub token: Option<String>,
}

// ---- providers ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub license_number: Option<String>,
    pub years_experience: Option<i32>,
    pub primary_service: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRegistration {
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub years_experience: Option<i32>,
    #[serde(default)]
    pub primary_service: Option<String>,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProviderSession {
    pub provider: ProviderView,
    #[serde(default)]
    pub token: Option<String>,
}

/// Provider fields embedded in service listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub id: i32,
    pub business_name: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

// ---- services ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub service_type: Option<String>,
    pub active: bool,
    pub provider: ProviderSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub provider_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ---- subscriptions ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: i32,
    pub customer_id: i32,
    pub service: ServiceView,
    pub subscribed_at: Timestamp,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub customer_id: i32,
    pub service_id: i32,
}

// ---- reviews ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub service_id: i32,
    pub service_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: Timestamp,
    pub provider_response: Option<String>,
    pub response_date: Option<Timestamp>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub customer_id: i32,
    pub service_id: i32,
    pub rating: i32,
    pub comment: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReviewUpdate {
    pub rating: i32,
    pub comment: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProviderReply {
    pub response: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub service_id: i32,
    pub service_name: String,
    pub average_rating: f64,
    pub review_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRatingStatistics {
    pub provider_id: i32,
    pub total_reviews: u64,
    pub average_rating: f64,
    pub rating_distribution: BTreeMap<i32, u64>,
    pub service_ratings: BTreeMap<String, f64>,
}

// ---- location ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWithDistance {
    pub service: ServiceView,
    /// Miles, one decimal; `None` when either address could not be located.
    pub distance: Option<f64>,
    pub distance_formatted: String,
}

/// Ascending miles with unknown distances last; pair with a stable sort.
pub fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResult {
    pub from: String,
    pub to: String,
    pub distance_miles: Option<f64>,
    pub distance_km: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DistanceSummary {
    pub customer_address: String,
    pub total_services: u64,
    pub within_5_miles: u64,
    pub within_10_miles: u64,
    pub within_25_miles: u64,
    pub beyond_25_miles: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_update_skips_absent_fields() {
        let upd = CustomerUpdate { address: Some("1 Elm St, Greensboro".into()), ..Default::default() };
        let v = serde_json::to_value(&upd).unwrap();
        assert_eq!(v, serde_json::json!({"address": "1 Elm St, Greensboro"}));
    }

    #[test]
    fn unknown_distances_sort_last() {
        let mut v = vec![None, Some(3.0), None, Some(1.0)];
        v.sort_by(|a, b| compare_distance(*a, *b));
        assert_eq!(v, vec![Some(1.0), Some(3.0), None, None]);
    }

    #[test]
    fn distance_summary_uses_camel_case_buckets() {
        let v = serde_json::to_value(DistanceSummary::default()).unwrap();
        assert!(v.get("within5Miles").is_some());
        assert!(v.get("beyond25Miles").is_some());
    }

    #[test]
    fn rating_distribution_round_trips_integer_keys() {
        let mut dist = BTreeMap::new();
        dist.insert(5, 2u64);
        let stats = ProviderRatingStatistics {
            provider_id: 1,
            total_reviews: 2,
            average_rating: 5.0,
            rating_distribution: dist,
            service_ratings: BTreeMap::new(),
        };
        let text = serde_json::to_string(&stats).unwrap();
        let back: ProviderRatingStatistics = serde_json::from_str(&text).unwrap();
        assert_eq!(back.rating_distribution.get(&5), Some(&2));
    }
}
