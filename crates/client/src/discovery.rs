//! Service discovery: load the active catalogue, enrich it with ratings and
//! distances, then filter and sort in memory.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use common::types::{compare_distance, ServiceView};

use crate::api::HomeConnectClient;
use crate::errors::ClientError;

pub const EMPTY_MESSAGE: &str = "No services found matching your criteria. Try adjusting your filters.";
pub const OTHER_CATEGORY: &str = "Other";
pub const DISTANCE_UNAVAILABLE: &str = "Distance unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
    Rating,
    Provider,
    Distance,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(SortKey::Name),
            "price-low" => Ok(SortKey::PriceLow),
            "price-high" => Ok(SortKey::PriceHigh),
            "rating" => Ok(SortKey::Rating),
            "provider" => Ok(SortKey::Provider),
            "distance" => Ok(SortKey::Distance),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

/// A service with the figures gathered during enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredService {
    pub service: ServiceView,
    pub average_rating: f64,
    pub review_count: u64,
    /// Miles from the customer; `None` when unknown.
    pub distance: Option<f64>,
    pub distance_label: String,
}

impl DiscoveredService {
    pub fn new(service: ServiceView) -> Self {
        Self { service, average_rating: 0.0, review_count: 0, distance: None, distance_label: DISTANCE_UNAVAILABLE.into() }
    }

    /// Service type, or "Other" when missing.
    pub fn category(&self) -> &str {
        match self.service.service_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => OTHER_CATEGORY,
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        let s = &self.service;
        s.name.to_lowercase().contains(needle)
            || s.description.as_deref().is_some_and(|d| d.to_lowercase().contains(needle))
            || s.provider.business_name.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryFilter {
    pub search: String,
    /// Exact category; `None`, empty or "all" disables the filter.
    pub category: Option<String>,
    pub max_price: Option<f64>,
    /// Inclusive; when set, services with unknown distance are dropped.
    pub max_distance: Option<f64>,
    pub sort: SortKey,
}

impl DiscoveryFilter {
    pub fn matches(&self, item: &DiscoveredService) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !item.matches_search(&needle) {
            return false;
        }
        if let Some(cat) = self.category.as_deref().map(str::trim) {
            if !cat.is_empty() && !cat.eq_ignore_ascii_case("all") && item.category() != cat {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if item.service.price > max {
                return false;
            }
        }
        if let Some(max) = self.max_distance {
            if !item.distance.is_some_and(|d| d <= max) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryResult {
    /// Size of the list before filtering.
    pub total: usize,
    pub services: Vec<DiscoveredService>,
}

impl DiscoveryResult {
    pub fn shown(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_MESSAGE)
    }
}

/// Stable in-place sort by `key`.
pub fn sort_services(items: &mut [DiscoveredService], key: SortKey) {
    match key {
        SortKey::Name => items.sort_by(|a, b| a.service.name.to_lowercase().cmp(&b.service.name.to_lowercase())),
        SortKey::PriceLow => items.sort_by(|a, b| a.service.price.total_cmp(&b.service.price)),
        SortKey::PriceHigh => items.sort_by(|a, b| b.service.price.total_cmp(&a.service.price)),
        SortKey::Rating => items.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating)),
        SortKey::Provider => items.sort_by(|a, b| {
            a.service.provider.business_name.to_lowercase().cmp(&b.service.provider.business_name.to_lowercase())
        }),
        SortKey::Distance => items.sort_by(|a, b| compare_distance(a.distance, b.distance)),
    }
}

pub fn apply(items: &[DiscoveredService], filter: &DiscoveryFilter) -> DiscoveryResult {
    let mut services: Vec<DiscoveredService> = items.iter().filter(|s| filter.matches(s)).cloned().collect();
    sort_services(&mut services, filter.sort);
    DiscoveryResult { total: items.len(), services }
}

/// Distinct categories for the filter picker, sorted.
pub fn categories(items: &[DiscoveredService]) -> Vec<String> {
    items.iter().map(|s| s.category().to_string()).collect::<BTreeSet<_>>().into_iter().collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub with_ratings: bool,
    /// Fetch distances relative to this customer's address.
    pub distance_from: Option<i32>,
}

/// One rating call per service, run concurrently. Failed calls are left out.
async fn fetch_ratings(client: &HomeConnectClient, ids: &[i32]) -> HashMap<i32, (f64, u64)> {
    let mut set = JoinSet::new();
    for &id in ids {
        let c = client.clone();
        set.spawn(async move { (id, c.average_rating(id).await) });
    }
    let mut out = HashMap::with_capacity(ids.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((id, Ok(summary))) => {
                out.insert(id, (summary.average_rating, summary.review_count));
            }
            Ok((id, Err(e))) => warn!(service_id = id, error = %e, "rating enrichment failed"),
            Err(e) => warn!(error = %e, "rating task aborted"),
        }
    }
    out
}

async fn fetch_distances(client: &HomeConnectClient, customer_id: i32) -> HashMap<i32, (Option<f64>, String)> {
    match client.services_with_distance(customer_id).await {
        Ok(list) => list.into_iter().map(|s| (s.service.id, (s.distance, s.distance_formatted))).collect(),
        Err(e) => {
            warn!(customer_id, error = %e, "location lookup unavailable");
            HashMap::new()
        }
    }
}

/// Fetch active services and enrich them per `opts`.
///
/// Only the service list itself is fatal; rating or distance failures leave
/// the defaults (0 / unavailable) in place.
pub async fn load(client: &HomeConnectClient, opts: LoadOptions) -> Result<Vec<DiscoveredService>, ClientError> {
    let services = client.list_active_services().await?;
    let ids: Vec<i32> = services.iter().map(|s| s.id).collect();

    let ratings_fut = async {
        if opts.with_ratings { fetch_ratings(client, &ids).await } else { HashMap::new() }
    };
    let distances_fut = async {
        match opts.distance_from {
            Some(cid) => fetch_distances(client, cid).await,
            None => HashMap::new(),
        }
    };
    let (mut ratings, mut distances) = tokio::join!(ratings_fut, distances_fut);

    let items: Vec<DiscoveredService> = services
        .into_iter()
        .map(|service| {
            let mut item = DiscoveredService::new(service);
            if let Some((avg, count)) = ratings.remove(&item.service.id) {
                item.average_rating = avg;
                item.review_count = count;
            }
            if let Some((distance, label)) = distances.remove(&item.service.id) {
                item.distance = distance;
                item.distance_label = label;
            }
            item
        })
        .collect();
    debug!(count = items.len(), "services loaded for discovery");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::ProviderSummary;

    fn item(id: i32, name: &str, price: f64, category: Option<&str>, provider: &str) -> DiscoveredService {
        DiscoveredService::new(ServiceView {
            id,
            name: name.into(),
            description: Some(format!("{name} by {provider}")),
            price,
            service_type: category.map(str::to_string),
            active: true,
            provider: ProviderSummary {
                id: 1,
                business_name: provider.into(),
                first_name: "Pat".into(),
                last_name: "Lee".into(),
                address: "Greensboro, NC".into(),
            },
        })
    }

    fn catalogue() -> Vec<DiscoveredService> {
        vec![
            item(1, "Lawn Mowing", 50.0, Some("Landscaping"), "Green Thumb"),
            item(2, "Deep Clean", 75.0, Some("Cleaning"), "Sparkle Co"),
            item(3, "Gutter Check", 40.0, None, "Acme Home"),
        ]
    }

    fn prices(r: &DiscoveryResult) -> Vec<f64> {
        r.services.iter().map(|s| s.service.price).collect()
    }

    #[test]
    fn price_low_orders_ascending() {
        let filter = DiscoveryFilter { sort: SortKey::PriceLow, ..Default::default() };
        let r = apply(&catalogue(), &filter);
        assert_eq!(prices(&r), vec![40.0, 50.0, 75.0]);
        assert_eq!(r.total, 3);
        assert_eq!(r.shown(), 3);
    }

    #[test]
    fn price_high_and_name() {
        let r = apply(&catalogue(), &DiscoveryFilter { sort: SortKey::PriceHigh, ..Default::default() });
        assert_eq!(prices(&r), vec![75.0, 50.0, 40.0]);
        let r = apply(&catalogue(), &DiscoveryFilter::default());
        let names: Vec<_> = r.services.iter().map(|s| s.service.name.as_str()).collect();
        assert_eq!(names, vec!["Deep Clean", "Gutter Check", "Lawn Mowing"]);
    }

    #[test]
    fn unknown_category_yields_empty_message() {
        let filter = DiscoveryFilter { category: Some("Plumbing".into()), ..Default::default() };
        let r = apply(&catalogue(), &filter);
        assert!(r.is_empty());
        assert_eq!(r.empty_message(), Some(EMPTY_MESSAGE));
        assert_eq!(r.total, 3);
    }

    #[test]
    fn missing_category_is_other() {
        assert_eq!(categories(&catalogue()), vec!["Cleaning", "Landscaping", "Other"]);
        let r = apply(&catalogue(), &DiscoveryFilter { category: Some("Other".into()), ..Default::default() });
        assert_eq!(r.shown(), 1);
        let r = apply(&catalogue(), &DiscoveryFilter { category: Some("all".into()), ..Default::default() });
        assert_eq!(r.shown(), 3);
    }

    #[test]
    fn search_covers_provider_name_and_price_ceiling_is_inclusive() {
        let r = apply(&catalogue(), &DiscoveryFilter { search: "SPARKLE".into(), ..Default::default() });
        assert_eq!(r.shown(), 1);
        let r = apply(&catalogue(), &DiscoveryFilter { max_price: Some(50.0), ..Default::default() });
        assert_eq!(r.shown(), 2);
    }

    #[test]
    fn distance_sort_puts_unknown_last() {
        let mut items = catalogue();
        items[0].distance = Some(12.5);
        items[2].distance = Some(3.0);
        let r = apply(&items, &DiscoveryFilter { sort: SortKey::Distance, ..Default::default() });
        let ids: Vec<_> = r.services.iter().map(|s| s.service.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        // 设置距离上限时才排除未知距离
        let r = apply(&items, &DiscoveryFilter { max_distance: Some(12.5), ..Default::default() });
        assert_eq!(r.shown(), 2);
    }

    #[test]
    fn rating_sort_is_stable() {
        let mut items = catalogue();
        items[1].average_rating = 4.5;
        let r = apply(&items, &DiscoveryFilter { sort: SortKey::Rating, ..Default::default() });
        let ids: Vec<_> = r.services.iter().map(|s| s.service.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn parse_sort_keys() {
        assert_eq!("price-low".parse::<SortKey>(), Ok(SortKey::PriceLow));
        assert_eq!("distance".parse::<SortKey>(), Ok(SortKey::Distance));
        assert!("cheapest".parse::<SortKey>().is_err());
    }
}
