use prometheus::{Gauge, IntCounter, IntGauge, IntGaugeVec, Opts, Registry};

use crate::views::DerivedViews;

/// Prometheus handles for the monitor. Counters are bumped by the fetch
/// loop's page callback; gauges are overwritten after each successful
/// derivation.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub pages_fetched: IntCounter,
    pub listings_fetched: IntCounter,
    pub refresh_failures: IntCounter,
    pub active_listings: IntGauge,
    pub ended_listings: IntGauge,
    pub tag_group_sizes: IntGaugeVec,
    pub last_refresh: Gauge,
}

impl Metrics {
    pub fn new(registry: &Registry) -> Self {
        let pages_fetched = IntCounter::new(
            "goldenbid_pages_fetched_total",
            "Listing pages fetched from the auction API",
        )
        .unwrap();
        registry.register(Box::new(pages_fetched.clone())).unwrap();

        let listings_fetched = IntCounter::new(
            "goldenbid_listings_fetched_total",
            "Individual listings fetched from the auction API",
        )
        .unwrap();
        registry
            .register(Box::new(listings_fetched.clone()))
            .unwrap();

        let refresh_failures = IntCounter::new(
            "goldenbid_refresh_failures_total",
            "Refresh cycles that failed before completing",
        )
        .unwrap();
        registry
            .register(Box::new(refresh_failures.clone()))
            .unwrap();

        let active_listings = IntGauge::new(
            "goldenbid_active_listings",
            "Listings still open for bidding after the last refresh",
        )
        .unwrap();
        registry
            .register(Box::new(active_listings.clone()))
            .unwrap();

        let ended_listings = IntGauge::new(
            "goldenbid_ended_listings",
            "Listings whose end date has passed, after the last refresh",
        )
        .unwrap();
        registry
            .register(Box::new(ended_listings.clone()))
            .unwrap();

        let tag_group_sizes = IntGaugeVec::new(
            Opts::new(
                "goldenbid_tag_group_listings",
                "Active listings per top tag group",
            ),
            &["tag"],
        )
        .unwrap();
        registry
            .register(Box::new(tag_group_sizes.clone()))
            .unwrap();

        let last_refresh = Gauge::new(
            "goldenbid_last_refresh_timestamp",
            "Unix timestamp of the last successful refresh",
        )
        .unwrap();
        registry.register(Box::new(last_refresh.clone())).unwrap();

        Self {
            pages_fetched,
            listings_fetched,
            refresh_failures,
            active_listings,
            ended_listings,
            tag_group_sizes,
            last_refresh,
        }
    }

    pub fn record_views(&self, views: &DerivedViews) {
        self.active_listings.set(views.active.len() as i64);
        self.ended_listings.set(views.ended.len() as i64);

        // Stale tags would otherwise linger from earlier refreshes.
        self.tag_group_sizes.reset();
        for group in &views.tag_groups {
            self.tag_group_sizes
                .with_label_values(&[group.tag.as_str()])
                .set(group.listings.len() as i64);
        }

        self.last_refresh.set(chrono::Utc::now().timestamp() as f64);
    }
}
