use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

use goldenbid_client::api::{AuctionClient, Listing};
use goldenbid_client::core::{self, Config, HealthChecker};
use goldenbid_client::fetcher::{fetch_all_pages, FetchOptions};
use goldenbid_client::monitoring::Metrics;
use goldenbid_client::views::{derive_views, RefreshTracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    core::logging::init_logging(&config.monitor.log_level);

    tracing::info!("GoldenBid listings monitor starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Auction API: {}", config.api.base_url);

    let health_checker = Arc::new(HealthChecker::new());
    let registry = prometheus::Registry::new();
    let metrics = Metrics::new(&registry);

    // Start health and metrics endpoints
    let health_clone = health_checker.clone();
    let registry_clone = registry.clone();
    let port = config.monitor.port;
    tokio::spawn(async move { start_monitor_server(health_clone, registry_clone, port).await });
    tracing::info!("Health and metrics endpoints running on port {}", port);

    let client = AuctionClient::from_config(&config);
    let options = FetchOptions::from_config(&config.fetch);
    let tracker = RefreshTracker::new();

    // The aggregate collection lives here; each refresh generation either
    // replaces it wholesale or is discarded as stale.
    let mut aggregate: Vec<Listing> = Vec::new();

    loop {
        let generation = tracker.begin();
        tracing::info!(generation = generation.id(), "refreshing listings");

        let mut on_page = |items: &[Listing], page: u32| -> anyhow::Result<()> {
            if !generation.is_current() {
                return Ok(());
            }
            metrics.pages_fetched.inc();
            metrics.listings_fetched.inc_by(items.len() as u64);
            tracing::debug!(page, count = items.len(), "page received");
            Ok(())
        };

        match fetch_all_pages(&client, &options, Some(&mut on_page)).await {
            Ok(listings) if generation.is_current() => {
                aggregate = listings;
                let views = derive_views(&aggregate, Utc::now());
                metrics.record_views(&views);
                health_checker.update_component("auction_api", true).await;
                health_checker.update_component("last_refresh", true).await;

                let top_tags: Vec<&str> =
                    views.tag_groups.iter().map(|g| g.tag.as_str()).collect();
                tracing::info!(
                    "refresh complete: {} listings ({} active, {} ended), top tags: [{}]",
                    aggregate.len(),
                    views.active.len(),
                    views.ended.len(),
                    top_tags.join(", ")
                );
            }
            Ok(_) => {
                tracing::info!(
                    generation = generation.id(),
                    "discarding result of superseded refresh"
                );
            }
            Err(e) => {
                tracing::error!("refresh failed: {}", e);
                metrics.refresh_failures.inc();
                health_checker.update_component("last_refresh", false).await;
            }
        }

        tokio::time::sleep(tokio::time::Duration::from_secs(
            config.monitor.refresh_interval_secs,
        ))
        .await;
    }
}

async fn start_monitor_server(
    health_checker: Arc<HealthChecker>,
    registry: prometheus::Registry,
    port: u16,
) {
    use warp::Filter;

    let health = warp::path("health")
        .and(warp::any().map(move || health_checker.clone()))
        .and_then(|checker: Arc<HealthChecker>| async move {
            let status = checker.get_status().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&status))
        });

    let metrics = warp::path("metrics")
        .and(warp::any().map(move || registry.clone()))
        .map(|registry: prometheus::Registry| {
            let encoder = prometheus::TextEncoder::new();
            match encoder.encode_to_string(&registry.gather()) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Encoding metrics {:?}", e);
                    String::new()
                }
            }
        });

    warp::serve(health.or(metrics)).run(([0, 0, 0, 0], port)).await;
}
