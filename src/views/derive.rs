use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::api::Listing;

/// How many listings the "most bids" rail shows.
pub const TOP_LISTINGS: usize = 10;
/// How many tag groups get their own rail.
pub const TOP_TAGS: usize = 5;

/// Presentation-ready groupings derived from the aggregate collection.
/// Recomputed from scratch on every refresh; the active/ended split depends
/// on `now`, so caching it would go stale between renders.
#[derive(Debug, Clone, Default)]
pub struct DerivedViews {
    pub active: Vec<Listing>,
    pub ended: Vec<Listing>,
    pub top_by_bids: Vec<Listing>,
    pub tag_groups: Vec<TagGroup>,
}

/// Active listings sharing one normalized tag, in their original relative
/// order.
#[derive(Debug, Clone)]
pub struct TagGroup {
    pub tag: String,
    pub count: usize,
    pub listings: Vec<Listing>,
}

/// Pure derivation of every grouping the listing views need.
///
/// Listings are first ordered newest-first by creation time so all the
/// groupings inherit a newest-first tie-break. All sorts are stable.
pub fn derive_views(listings: &[Listing], now: DateTime<Utc>) -> DerivedViews {
    let mut ordered: Vec<Listing> = listings.to_vec();
    sort_newest_first(&mut ordered);

    let (active, ended): (Vec<Listing>, Vec<Listing>) =
        ordered.into_iter().partition(|l| l.is_active(now));

    let top_by_bids = top_by_bids(&active, TOP_LISTINGS);
    let tag_groups = tag_groups(&active, TOP_TAGS);

    DerivedViews {
        active,
        ended,
        top_by_bids,
        tag_groups,
    }
}

/// Newest first; listings without a creation date sink to the end.
pub fn sort_newest_first(listings: &mut [Listing]) {
    listings.sort_by_key(|l| Reverse(l.created));
}

/// Active listings ranked by bid count, descending, truncated to `top`.
/// Stable, so equal counts keep their newest-first order.
fn top_by_bids(active: &[Listing], top: usize) -> Vec<Listing> {
    let mut ranked = active.to_vec();
    ranked.sort_by_key(|l| Reverse(l.bid_count()));
    ranked.truncate(top);
    ranked
}

/// Tags are compared after trimming and lowercasing, so "Gold" and "gold "
/// land in the same group and a listing carrying both variants counts once.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn tag_groups(active: &[Listing], top: usize) -> Vec<TagGroup> {
    // Occurrence counts in first-encountered order, so the later stable sort
    // breaks count ties the same way every refresh.
    let mut counts: Vec<(String, usize)> = Vec::new();

    for listing in active {
        let mut seen_on_listing: HashSet<String> = HashSet::new();
        for tag in &listing.tags {
            let normalized = normalize_tag(tag);
            if normalized.is_empty() || !seen_on_listing.insert(normalized.clone()) {
                continue;
            }
            match counts.iter_mut().find(|(known, _)| *known == normalized) {
                Some((_, count)) => *count += 1,
                None => counts.push((normalized, 1)),
            }
        }
    }

    counts.sort_by_key(|&(_, count)| Reverse(count));
    counts.truncate(top);

    counts
        .into_iter()
        .map(|(tag, count)| TagGroup {
            listings: active
                .iter()
                .filter(|l| l.tags.iter().any(|t| normalize_tag(t) == tag))
                .cloned()
                .collect(),
            tag,
            count,
        })
        .collect()
}
