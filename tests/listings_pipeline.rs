use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;

use goldenbid_client::api::{ApiError, Listing, PageBody};
use goldenbid_client::fetcher::{fetch_all_pages, FetchOptions, PageSource};
use goldenbid_client::views::{derive_views, RefreshTracker, TOP_LISTINGS};

/// Plays back a fixed script of page responses, one per call.
struct ScriptedSource {
    responses: Mutex<Vec<Result<Vec<Listing>, ApiError>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Vec<Listing>, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, _page: u32, _limit: u32) -> Result<Vec<Listing>, ApiError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(Vec::new());
        }
        responses.remove(0)
    }
}

/// Builds `len` listings through the same deserialization path real
/// responses take, with a spread of end dates, tags, and bid counts.
fn page_of(start: usize, len: usize) -> Vec<Listing> {
    let items: Vec<serde_json::Value> = (start..start + len)
        .map(|i| {
            json!({
                "id": format!("listing-{i}"),
                "title": format!("Listing {i}"),
                "created": format!("2025-01-{:02}T00:00:00Z", (i % 28) + 1),
                "endsAt": if i % 3 == 0 {
                    "2099-01-01T00:00:00Z"
                } else {
                    "2020-01-01T00:00:00Z"
                },
                "tags": if i % 2 == 0 { json!(["Vintage"]) } else { json!("gold ") },
                "media": [{ "url": "https://img.example/item.jpg", "alt": "item" }],
                "_count": { "bids": i % 7 },
            })
        })
        .collect();

    let body: PageBody = serde_json::from_value(json!({ "data": items })).unwrap();
    body.into_items()
}

fn fast_options() -> FetchOptions {
    FetchOptions {
        base_delay: Duration::ZERO,
        page_delay: Duration::ZERO,
        ..FetchOptions::default()
    }
}

#[tokio::test]
async fn full_pipeline_with_a_rate_limited_page() {
    // Page 1 is full, page 2 gets throttled once, then arrives short.
    let source = ScriptedSource::new(vec![
        Ok(page_of(0, 100)),
        Err(ApiError::RateLimited {
            body: "throttled".into(),
        }),
        Ok(page_of(100, 47)),
    ]);

    let mut seen: Vec<(u32, usize)> = Vec::new();
    let mut on_page = |items: &[Listing], page: u32| -> anyhow::Result<()> {
        seen.push((page, items.len()));
        Ok(())
    };

    let aggregate = fetch_all_pages(&source, &fast_options(), Some(&mut on_page))
        .await
        .unwrap();

    assert_eq!(seen, vec![(1, 100), (2, 47)]);
    assert_eq!(aggregate.len(), 147);
    assert_eq!(aggregate[0].id, "listing-0");
    assert_eq!(aggregate[146].id, "listing-146");

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let views = derive_views(&aggregate, now);

    // Every third listing ends in 2099; the rest ended in 2020.
    assert_eq!(views.active.len(), 49);
    assert_eq!(views.active.len() + views.ended.len(), aggregate.len());

    assert_eq!(views.top_by_bids.len(), TOP_LISTINGS);
    let counts: Vec<u64> = views.top_by_bids.iter().map(|l| l.bid_count()).collect();
    assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));

    // Tags normalize to trimmed lowercase.
    let tags: Vec<&str> = views.tag_groups.iter().map(|g| g.tag.as_str()).collect();
    assert!(tags.contains(&"vintage"));
    assert!(tags.contains(&"gold"));
    for group in &views.tag_groups {
        assert_eq!(group.count, group.listings.len());
    }
}

#[tokio::test]
async fn failed_fetch_returns_no_partial_aggregate() {
    let source = ScriptedSource::new(vec![
        Ok(page_of(0, 100)),
        Err(ApiError::Status {
            status: 500,
            body: "server fell over".into(),
        }),
    ]);

    let err = fetch_all_pages(&source, &fast_options(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn stale_refresh_generations_are_discarded() {
    let tracker = RefreshTracker::new();

    // An old refresh is still in flight when a new one starts.
    let stale = tracker.begin();
    let fresh = tracker.begin();

    let source = ScriptedSource::new(vec![Ok(page_of(0, 10))]);
    let listings = fetch_all_pages(&source, &fast_options(), None)
        .await
        .unwrap();

    // The owner of the aggregate applies results only from the newest
    // generation, exactly like the monitor's refresh loop does.
    let mut aggregate: Vec<Listing> = Vec::new();
    if stale.is_current() {
        aggregate = listings.clone();
    }
    assert!(aggregate.is_empty());

    if fresh.is_current() {
        aggregate = listings;
    }
    assert_eq!(aggregate.len(), 10);
}
