use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope used by single-resource endpoints, e.g. `{ "data": { .. } }`.
/// Collection endpoints go through [`PageBody`] instead because older
/// deployments return a bare array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
    #[serde(default, rename = "_count")]
    pub count: Option<ProfileCounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCounts {
    #[serde(default)]
    pub listings: u64,
    #[serde(default)]
    pub wins: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(default)]
    pub id: Option<String>,
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bidder: Option<Profile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingCounts {
    #[serde(default)]
    pub bids: u64,
}

/// One auction listing as returned with `_bids=true&_seller=true&_media=true`.
///
/// The API is loose about shapes: `media`/`tags`/`bids` may arrive as a
/// single value instead of a list, and `endsAt`/`created` occasionally carry
/// garbage. Both are absorbed at deserialization so the rest of the crate can
/// rely on plain vectors and `Option<DateTime>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub media: Vec<Media>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seller: Option<Profile>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub bids: Vec<Bid>,
    #[serde(default, rename = "_count")]
    pub count: Option<ListingCounts>,
}

impl Listing {
    /// Active means the listing ends in the future. A missing or unparseable
    /// end date never counts as active.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.map(|ends| ends > now).unwrap_or(false)
    }

    /// Bid count from the `_count` summary, falling back to the embedded bid
    /// list when the summary is absent.
    pub fn bid_count(&self) -> u64 {
        self.count
            .as_ref()
            .map(|c| c.bids)
            .unwrap_or(self.bids.len() as u64)
    }

    /// Winning bid so far: highest amount, most recent on equal amounts.
    pub fn top_bid(&self) -> Option<&Bid> {
        self.bids.iter().max_by(|a, b| {
            a.amount
                .partial_cmp(&b.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.created.cmp(&b.created))
        })
    }
}

/// Body of a listings collection response. Current deployments wrap the items
/// in `{ "data": [...] }`, older ones return the bare array. Anything else is
/// treated as an empty page, which the fetch loop reads as "no more data".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageBody {
    Bare(Vec<Listing>),
    Wrapped {
        data: Vec<Listing>,
        #[serde(default)]
        meta: Option<PageMeta>,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub is_last_page: Option<bool>,
}

impl PageBody {
    pub fn into_items(self) -> Vec<Listing> {
        match self {
            PageBody::Bare(items) => items,
            PageBody::Wrapped { data, .. } => data,
            PageBody::Other(value) => {
                tracing::warn!(
                    "unexpected listings page shape, treating as end of data: {}",
                    value
                );
                Vec::new()
            }
        }
    }
}

/// Payload for creating or replacing a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ends_at: DateTime<Utc>,
    pub media: Vec<Media>,
    pub tags: Vec<String>,
}

/// Payload for updating the logged-in profile (avatar, banner, bio).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse::<DateTime<Utc>>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_accepts_single_media_and_tag_values() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Pocket watch",
            "media": { "url": "https://img.example/watch.jpg", "alt": "watch" },
            "tags": "vintage",
            "endsAt": "2099-01-01T00:00:00Z",
        }))
        .unwrap();

        assert_eq!(listing.media.len(), 1);
        assert_eq!(listing.tags, vec!["vintage"]);
        assert!(listing.ends_at.is_some());
    }

    #[test]
    fn listing_tolerates_garbage_end_date() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Broken clock",
            "endsAt": "not-a-date",
        }))
        .unwrap();

        assert!(listing.ends_at.is_none());
        assert!(!listing.is_active(Utc::now()));
    }

    #[test]
    fn page_body_accepts_bare_array_and_data_wrapper() {
        let bare: PageBody = serde_json::from_value(json!([
            { "id": "1", "title": "a" },
            { "id": "2", "title": "b" },
        ]))
        .unwrap();
        assert_eq!(bare.into_items().len(), 2);

        let wrapped: PageBody = serde_json::from_value(json!({
            "data": [{ "id": "3", "title": "c" }],
            "meta": { "currentPage": 1, "isLastPage": true },
        }))
        .unwrap();
        assert_eq!(wrapped.into_items().len(), 1);
    }

    #[test]
    fn page_body_treats_unknown_shape_as_empty() {
        let odd: PageBody = serde_json::from_value(json!({ "error": "nope" })).unwrap();
        assert!(odd.into_items().is_empty());
    }

    #[test]
    fn bid_count_prefers_summary_field() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Vase",
            "bids": [{ "amount": 5.0 }],
            "_count": { "bids": 12 },
        }))
        .unwrap();
        assert_eq!(listing.bid_count(), 12);
    }

    #[test]
    fn top_bid_breaks_amount_ties_by_recency() {
        let listing: Listing = serde_json::from_value(json!({
            "id": "abc",
            "title": "Painting",
            "bids": [
                { "id": "old", "amount": 50.0, "created": "2024-01-01T00:00:00Z" },
                { "id": "new", "amount": 50.0, "created": "2024-06-01T00:00:00Z" },
                { "id": "low", "amount": 10.0, "created": "2024-07-01T00:00:00Z" },
            ],
        }))
        .unwrap();

        let top = listing.top_bid().unwrap();
        assert_eq!(top.id.as_deref(), Some("new"));
    }
}
