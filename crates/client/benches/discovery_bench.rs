use criterion::{criterion_group, criterion_main, Criterion};

use client::discovery::{apply, DiscoveredService, DiscoveryFilter, SortKey};
use common::types::{ProviderSummary, ServiceView};

fn catalogue(n: i32) -> Vec<DiscoveredService> {
    let categories = ["Cleaning", "Landscaping", "Plumbing", "Electrical"];
    (0..n)
        .map(|i| {
            let mut item = DiscoveredService::new(ServiceView {
                id: i,
                name: format!("Service {i}"),
                description: Some(format!("Description for service {i}")),
                price: f64::from((i * 37) % 500),
                service_type: (i % 5 != 0).then(|| categories[(i % 4) as usize].to_string()),
                active: true,
                provider: ProviderSummary {
                    id: i % 20,
                    business_name: format!("Provider {}", i % 20),
                    first_name: "Pat".into(),
                    last_name: "Lee".into(),
                    address: "Greensboro, NC".into(),
                },
            });
            item.average_rating = f64::from(i % 5) + 0.5;
            item.distance = (i % 7 != 0).then(|| f64::from(i % 40));
            item
        })
        .collect()
}

fn bench_discovery(c: &mut Criterion) {
    let items = catalogue(2_000);
    let filter = DiscoveryFilter {
        search: "service 1".into(),
        category: Some("Cleaning".into()),
        max_price: Some(400.0),
        max_distance: None,
        sort: SortKey::PriceLow,
    };
    c.bench_function("discovery_filter_price_low", |b| b.iter(|| apply(&items, &filter)));

    let by_distance = DiscoveryFilter { sort: SortKey::Distance, ..Default::default() };
    c.bench_function("discovery_sort_distance", |b| b.iter(|| apply(&items, &by_distance)));
}

criterion_group!(benches, bench_discovery);
criterion_main!(benches);
