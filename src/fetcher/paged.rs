use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, AuctionClient, Listing};

use super::normalize::sanitize_page;

/// Anything that can produce one page of listings. The HTTP client is the
/// real source; tests script their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Listing>, ApiError>;
}

#[async_trait]
impl PageSource for AuctionClient {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Listing>, ApiError> {
        Ok(self.listings_page(page, limit).await?.into_items())
    }
}

/// Knobs for a paged fetch. Defaults mirror the upstream API's sweet spot:
/// 100-item pages, unbounded page count, a 200ms breather between pages, and
/// up to 3 attempts per page with linear backoff when rate limited.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub page_size: u32,
    pub max_pages: Option<u32>,
    pub retry_budget: u32,
    pub base_delay: Duration,
    pub page_delay: Duration,
    pub sanitize: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: None,
            retry_budget: 3,
            base_delay: Duration::from_millis(1000),
            page_delay: Duration::from_millis(200),
            sanitize: false,
        }
    }
}

impl FetchOptions {
    pub fn from_config(config: &crate::core::config::FetchConfig) -> Self {
        Self {
            page_size: config.page_size,
            max_pages: config.max_pages,
            retry_budget: config.retry_budget,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            page_delay: Duration::from_millis(config.page_delay_ms),
            sanitize: config.sanitize,
        }
    }
}

/// Per-page callback. Failures are logged and never abort the fetch.
pub type PageCallback<'a> = dyn FnMut(&[Listing], u32) -> anyhow::Result<()> + Send + 'a;

/// Fetch every page of the listings collection and return the aggregate.
///
/// Pages are requested strictly one at a time, starting at 1. After each
/// page the loop stops on the first matching condition: the page was empty
/// (excluded), the page was shorter than `page_size` (included), or
/// `max_pages` was reached (included). A 429 from the source is retried up
/// to `retry_budget` attempts with `attempt * base_delay` backoff; any other
/// error aborts the whole call, so a partial aggregate is never returned.
pub async fn fetch_all_pages<S>(
    source: &S,
    options: &FetchOptions,
    mut on_page: Option<&mut PageCallback<'_>>,
) -> Result<Vec<Listing>, ApiError>
where
    S: PageSource + ?Sized,
{
    let mut aggregated = Vec::new();
    let mut page: u32 = 1;

    loop {
        let items = fetch_page_with_retry(source, page, options).await?;
        let raw_len = items.len();

        if raw_len == 0 {
            break;
        }

        let items = if options.sanitize {
            sanitize_page(items)
        } else {
            items
        };

        tracing::debug!(page, count = items.len(), "fetched listings page");

        if let Some(callback) = on_page.as_deref_mut() {
            if let Err(e) = callback(&items, page) {
                tracing::warn!("page callback failed on page {}: {:#}", page, e);
            }
        }

        aggregated.extend(items);

        // Short page means the server ran out of data.
        if (raw_len as u32) < options.page_size {
            break;
        }
        if options.max_pages.map(|max| page >= max).unwrap_or(false) {
            break;
        }

        tokio::time::sleep(options.page_delay).await;
        page += 1;
    }

    Ok(aggregated)
}

async fn fetch_page_with_retry<S>(
    source: &S,
    page: u32,
    options: &FetchOptions,
) -> Result<Vec<Listing>, ApiError>
where
    S: PageSource + ?Sized,
{
    let mut attempt: u32 = 1;
    loop {
        match source.fetch_page(page, options.page_size).await {
            Err(err) if err.is_rate_limited() && attempt < options.retry_budget => {
                let backoff = options.base_delay * attempt;
                tracing::warn!(
                    page,
                    attempt,
                    "rate limited, backing off for {:?} before retrying",
                    backoff
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
