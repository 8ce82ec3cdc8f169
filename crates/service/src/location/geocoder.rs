//! Address to coordinate lookups.
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use common::metrics::GEOCODE_LOOKUPS_TOTAL;

use super::geo::GeoPoint;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `None` when the address cannot be located.
    async fn locate(&self, address: &str) -> Option<GeoPoint>;
}

/// Approximate centres of North Carolina cities, matched by substring.
const NC_CITIES: &[(&[&str], f64, f64)] = &[
    (&["greensboro"], 36.0726, -79.7920),
    (&["high point"], 35.9557, -80.0053),
    (&["winston", "salem"], 36.0999, -80.2442),
    (&["burlington"], 36.0957, -79.4378),
    (&["raleigh"], 35.7796, -78.6382),
    (&["durham"], 35.9940, -78.8986),
    (&["charlotte"], 35.2271, -80.8431),
];

/// Offline geocoder backed by a fixed city table.
#[derive(Debug, Default, Clone, Copy)]
pub struct CityTableGeocoder;

impl CityTableGeocoder {
    pub fn lookup(address: &str) -> Option<GeoPoint> {
        let lower = address.to_lowercase();
        NC_CITIES
            .iter()
            .find(|(needles, _, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, lat, lng)| GeoPoint { latitude: *lat, longitude: *lng, formatted_address: address.to_string() })
    }
}

#[async_trait]
impl Geocoder for CityTableGeocoder {
    async fn locate(&self, address: &str) -> Option<GeoPoint> {
        GEOCODE_LOOKUPS_TOTAL.with_label_values(&["city_table"]).inc();
        Self::lookup(address)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: String,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Debug, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

/// Google Geocoding API client; falls back to the city table on any
/// transport error or non-OK status.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into(), api_key: api_key.into() }
    }

    async fn fetch(&self, address: &str) -> Result<GoogleResponse, reqwest::Error> {
        self.client
            .get(&self.url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleResponse>()
            .await
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn locate(&self, address: &str) -> Option<GeoPoint> {
        GEOCODE_LOOKUPS_TOTAL.with_label_values(&["google"]).inc();
        match self.fetch(address).await {
            Ok(resp) if resp.status == "OK" => {
                if let Some(first) = resp.results.into_iter().next() {
                    debug!(address, "geocoded via google");
                    return Some(GeoPoint {
                        latitude: first.geometry.location.lat,
                        longitude: first.geometry.location.lng,
                        formatted_address: first.formatted_address,
                    });
                }
                warn!(address, "google geocoder returned no results");
            }
            Ok(resp) => warn!(address, status = %resp.status, "google geocoder status not OK"),
            Err(e) => warn!(address, error = %e, "google geocoder request failed"),
        }
        CityTableGeocoder.locate(address).await
    }
}
