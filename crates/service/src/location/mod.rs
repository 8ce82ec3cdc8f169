//! Geocoding and provider proximity.
//!
//! Addresses are resolved through a [`Geocoder`] and memoised in a moka
//! cache, unknown addresses included. Distances are haversine miles rounded
//! to one decimal.

pub mod geo;
pub mod geocoder;

use std::sync::Arc;

use moka::future::Cache;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

use common::metrics::GEOCODE_LOOKUPS_TOTAL;
use common::types::{compare_distance, DistanceResult, DistanceSummary, GeocodeResult, ServiceView, ServiceWithDistance};
use configs::LocationConfig;

use crate::errors::ServiceError;
use crate::query::round1;
use crate::{catalog, customer_service};

pub use geo::{format_distance, haversine_miles, GeoPoint, KM_PER_MILE};
pub use geocoder::{CityTableGeocoder, Geocoder, GoogleGeocoder};

pub struct LocationService {
    geocoder: Arc<dyn Geocoder>,
    cache: Cache<String, Option<GeoPoint>>,
    default_max_miles: f64,
}

impl LocationService {
    pub fn new(geocoder: Arc<dyn Geocoder>, cache_capacity: u64, default_max_miles: f64) -> Self {
        Self { geocoder, cache: Cache::new(cache_capacity), default_max_miles }
    }

    /// Google geocoding when an API key is configured, city table otherwise.
    pub fn from_config(cfg: &LocationConfig) -> Self {
        let geocoder: Arc<dyn Geocoder> = if cfg.google_api_key.trim().is_empty() {
            info!("geocoding with built-in city table");
            Arc::new(CityTableGeocoder)
        } else {
            info!(url = %cfg.geocode_url, "geocoding with google api");
            Arc::new(GoogleGeocoder::new(cfg.geocode_url.clone(), cfg.google_api_key.clone()))
        };
        Self::new(geocoder, cfg.cache_capacity, cfg.default_max_distance_miles)
    }

    pub fn default_max_miles(&self) -> f64 {
        self.default_max_miles
    }

    pub async fn geocode(&self, address: &str) -> Option<GeoPoint> {
        let key = address.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(hit) = self.cache.get(&key).await {
            GEOCODE_LOOKUPS_TOTAL.with_label_values(&["cache"]).inc();
            return hit;
        }
        let found = self.geocoder.locate(address.trim()).await;
        if found.is_none() {
            debug!(address, "address could not be located");
        }
        self.cache.insert(key, found.clone()).await;
        found
    }

    /// Raw miles between two addresses, `None` if either is unknown.
    pub async fn distance_miles(&self, from: &str, to: &str) -> Option<f64> {
        let a = self.geocode(from).await?;
        let b = self.geocode(to).await?;
        Some(haversine_miles(&a, &b))
    }

    pub async fn distance(&self, from: &str, to: &str) -> Result<DistanceResult, ServiceError> {
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(ServiceError::Validation("Both 'from' and 'to' addresses are required".into()));
        }
        let miles = self.distance_miles(from, to).await;
        Ok(DistanceResult {
            from: from.to_string(),
            to: to.to_string(),
            distance_miles: miles.map(round1),
            distance_km: miles.map(|m| round1(m * KM_PER_MILE)),
        })
    }

    pub async fn geocode_address(&self, address: &str) -> Result<GeocodeResult, ServiceError> {
        if address.trim().is_empty() {
            return Err(ServiceError::Validation("Address is required".into()));
        }
        let point = self.geocode(address).await
            .ok_or_else(|| ServiceError::NotFound("Could not geocode address".into()))?;
        Ok(GeocodeResult {
            address: address.to_string(),
            latitude: point.latitude,
            longitude: point.longitude,
            formatted_address: point.formatted_address,
        })
    }

    async fn customer_address(&self, db: &DatabaseConnection, customer_id: i32) -> Result<String, ServiceError> {
        let customer = customer_service::get(db, customer_id).await?;
        if customer.address.trim().is_empty() {
            return Err(ServiceError::Validation("Customer address not found".into()));
        }
        Ok(customer.address)
    }

    /// Active services paired with their unrounded miles from `origin_address`.
    async fn measure(&self, db: &DatabaseConnection, origin_address: &str) -> Result<Vec<(ServiceView, Option<f64>)>, ServiceError> {
        let origin = self.geocode(origin_address).await;
        let services = catalog::list_active(db).await?;
        let mut out = Vec::with_capacity(services.len());
        for service in services {
            let miles = match &origin {
                Some(o) => self.geocode(&service.provider.address).await.map(|p| haversine_miles(o, &p)),
                None => None,
            };
            out.push((service, miles));
        }
        Ok(out)
    }

    /// Every active service with its distance from the customer, nearest
    /// first and unknown distances last.
    #[instrument(skip(self, db))]
    pub async fn services_with_distance(&self, db: &DatabaseConnection, customer_id: i32) -> Result<Vec<ServiceWithDistance>, ServiceError> {
        let origin_address = self.customer_address(db, customer_id).await?;
        let mut out: Vec<ServiceWithDistance> = self
            .measure(db, &origin_address)
            .await?
            .into_iter()
            .map(|(service, miles)| {
                let distance = miles.map(round1);
                ServiceWithDistance { service, distance, distance_formatted: format_distance(distance) }
            })
            .collect();
        out.sort_by(|a, b| compare_distance(a.distance, b.distance));
        Ok(out)
    }

    /// Services within `max_miles` (inclusive); unknown distances excluded.
    pub async fn nearby_services(&self, db: &DatabaseConnection, customer_id: i32, max_miles: Option<f64>) -> Result<Vec<ServiceWithDistance>, ServiceError> {
        let max = max_miles.unwrap_or(self.default_max_miles);
        if max.is_nan() || max < 0.0 {
            return Err(ServiceError::Validation("maxDistance must be a non-negative number".into()));
        }
        let all = self.services_with_distance(db, customer_id).await?;
        Ok(all.into_iter().filter(|s| s.distance.is_some_and(|d| d <= max)).collect())
    }

    pub async fn distance_summary(&self, db: &DatabaseConnection, customer_id: i32) -> Result<DistanceSummary, ServiceError> {
        let customer_address = self.customer_address(db, customer_id).await?;
        // 按未取整的距离分桶
        let all = self.measure(db, &customer_address).await?;
        let mut counts = [0u64; 4];
        for (_, miles) in &all {
            counts[geo::bucket(*miles)] += 1;
        }
        Ok(DistanceSummary {
            customer_address,
            total_services: all.len() as u64,
            within_5_miles: counts[0],
            within_10_miles: counts[1],
            within_25_miles: counts[2],
            beyond_25_miles: counts[3],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use async_trait::async_trait;
    use common::types::CustomerRegistration;

    use crate::test_support::{get_db, new_service, provider_registration, registration};
    use crate::{customer_service, provider_service};

    #[derive(Default)]
    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn locate(&self, address: &str) -> Option<GeoPoint> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            CityTableGeocoder::lookup(address)
        }
    }

    fn service() -> LocationService {
        LocationService::new(Arc::new(CityTableGeocoder), 100, 25.0)
    }

    #[tokio::test]
    async fn geocode_is_cached_including_misses() {
        let counting = Arc::new(CountingGeocoder::default());
        let svc = LocationService::new(counting.clone(), 100, 25.0);
        assert!(svc.geocode("Greensboro, NC").await.is_some());
        assert!(svc.geocode("  greensboro, nc ").await.is_some());
        assert!(svc.geocode("Nowhere").await.is_none());
        assert!(svc.geocode("nowhere").await.is_none());
        assert_eq!(counting.calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distance_rounds_and_converts() -> Result<(), anyhow::Error> {
        let d = service().distance("Greensboro, NC", "Raleigh, NC").await?;
        let miles = d.distance_miles.unwrap();
        assert_eq!(miles, (miles * 10.0).round() / 10.0);
        assert!(d.distance_km.unwrap() > miles);

        let unknown = service().distance("Greensboro, NC", "Atlantis").await?;
        assert!(unknown.distance_miles.is_none() && unknown.distance_km.is_none());
        assert!(service().distance("", "Raleigh").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn geocode_unknown_is_not_found() {
        let res = service().geocode_address("Atlantis").await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn services_sorted_by_distance_and_summarised() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let customer = customer_service::register(&db, CustomerRegistration {
            address: "10 Elm St, Greensboro, NC".into(),
            ..registration("geo@example.com")
        }).await?;

        let mut far = provider_registration("far@pro.com");
        far.address = "1 Trade St, Charlotte, NC".into();
        let far = provider_service::register(&db, far).await?;
        let mut near = provider_registration("near@pro.com");
        near.address = "2 Main St, High Point, NC".into();
        let near = provider_service::register(&db, near).await?;
        let mut lost = provider_registration("lost@pro.com");
        lost.address = "Somewhere remote".into();
        let lost = provider_service::register(&db, lost).await?;

        for (pid, name) in [(lost.id, "Mystery"), (far.id, "Far Fix"), (near.id, "Near Fix")] {
            catalog::create(&db, new_service(pid, name, 10.0)).await?;
        }

        let svc = service();
        let listed = svc.services_with_distance(&db, customer.id).await?;
        let names: Vec<&str> = listed.iter().map(|s| s.service.name.as_str()).collect();
        assert_eq!(names, vec!["Near Fix", "Far Fix", "Mystery"]);
        assert_eq!(listed[2].distance_formatted, "Distance unavailable");

        let nearby = svc.nearby_services(&db, customer.id, None).await?;
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].service.name, "Near Fix");

        let summary = svc.distance_summary(&db, customer.id).await?;
        assert_eq!(summary.total_services, 3);
        assert_eq!(summary.within_25_miles + summary.within_10_miles + summary.within_5_miles, 1);
        assert_eq!(summary.beyond_25_miles, 2);
        Ok(())
    }

    /// Two fixed points about 5.04 miles apart on the same meridian.
    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn locate(&self, address: &str) -> Option<GeoPoint> {
            let latitude = match address {
                "Home" => 36.0,
                "Shop" => 36.0729,
                _ => return None,
            };
            Some(GeoPoint { latitude, longitude: -80.0, formatted_address: address.to_string() })
        }
    }

    #[tokio::test]
    async fn summary_buckets_unrounded_miles() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let customer = customer_service::register(&db, CustomerRegistration {
            address: "Home".into(),
            ..registration("edge@example.com")
        }).await?;
        let mut shop = provider_registration("edge@pro.com");
        shop.address = "Shop".into();
        let shop = provider_service::register(&db, shop).await?;
        catalog::create(&db, new_service(shop.id, "Edge Fix", 10.0)).await?;

        let svc = LocationService::new(Arc::new(FixedGeocoder), 100, 25.0);
        let listed = svc.services_with_distance(&db, customer.id).await?;
        assert_eq!(listed[0].distance, Some(5.0));

        let summary = svc.distance_summary(&db, customer.id).await?;
        assert_eq!(summary.within_5_miles, 0);
        assert_eq!(summary.within_10_miles, 1);
        Ok(())
    }
}
