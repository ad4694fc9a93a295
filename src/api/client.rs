use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::session::Session;
use super::types::{Bid, Envelope, Listing, ListingPayload, PageBody, Profile, ProfilePayload};
use crate::core::Config;

pub const DEFAULT_BASE_URL: &str = "https://v2.api.noroff.dev";

const LISTINGS_PATH: &str = "/auction-house/listings";
const PROFILES_PATH: &str = "/auction-house/profiles";

/// Typed client for the GoldenBid auction-house API.
///
/// Every request carries the API key header; the bearer token is attached
/// whenever the session holds one. Methods that the API only accepts from a
/// logged-in profile check the session up front and fail with
/// [`ApiError::NotLoggedIn`] before touching the network.
pub struct AuctionClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl AuctionClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut session = Session::new(config.api.api_key.clone());
        if let (Some(token), Some(name)) = (&config.api.token, &config.api.profile_name) {
            session.store_credentials(token.clone(), name.clone());
        }
        Self::new(config.api.base_url.clone(), session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn listings_url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, LISTINGS_PATH, suffix)
    }

    fn profiles_url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, PROFILES_PATH, suffix)
    }

    fn attach_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Content-Type", "application/json")
            .header("X-Noroff-API-Key", self.session.api_key());

        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.attach_headers(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("auction API error: {} - {}", status, body);
            return Err(ApiError::from_status(status, body));
        }

        Ok(response.json().await?)
    }

    async fn send_expect_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = self.attach_headers(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("auction API error: {} - {}", status, body);
            return Err(ApiError::from_status(status, body));
        }

        Ok(())
    }

    // ---- listings ----

    /// One page of the listings collection, with bids, seller, and media
    /// included. The body shape varies by deployment, hence [`PageBody`].
    pub async fn listings_page(&self, page: u32, limit: u32) -> Result<PageBody, ApiError> {
        let request = self
            .http
            .get(self.listings_url(""))
            .query(&[("_bids", "true"), ("_seller", "true"), ("_media", "true")])
            .query(&[("page", page), ("limit", limit)]);

        self.send(request).await
    }

    pub async fn listing_by_id(&self, id: &str) -> Result<Listing, ApiError> {
        let request = self
            .http
            .get(self.listings_url(&format!("/{id}")))
            .query(&[("_bids", "true"), ("_seller", "true")]);

        Ok(self.send::<Envelope<Listing>>(request).await?.data)
    }

    pub async fn create_listing(&self, listing: &ListingPayload) -> Result<Listing, ApiError> {
        self.session.require_token()?;
        let request = self.http.post(self.listings_url("")).json(listing);

        Ok(self.send::<Envelope<Listing>>(request).await?.data)
    }

    pub async fn update_listing(
        &self,
        id: &str,
        listing: &ListingPayload,
    ) -> Result<Listing, ApiError> {
        self.session.require_token()?;
        let request = self
            .http
            .put(self.listings_url(&format!("/{id}")))
            .json(listing);

        Ok(self.send::<Envelope<Listing>>(request).await?.data)
    }

    pub async fn delete_listing(&self, id: &str) -> Result<(), ApiError> {
        self.session.require_token()?;
        let request = self.http.delete(self.listings_url(&format!("/{id}")));

        self.send_expect_empty(request).await
    }

    pub async fn place_bid(&self, id: &str, amount: f64) -> Result<Listing, ApiError> {
        self.session.require_token()?;
        let request = self
            .http
            .post(self.listings_url(&format!("/{id}/bids")))
            .json(&serde_json::json!({ "amount": amount }));

        Ok(self.send::<Envelope<Listing>>(request).await?.data)
    }

    // ---- profiles ----

    pub async fn profile_by_name(&self, name: &str) -> Result<Profile, ApiError> {
        let request = self
            .http
            .get(self.profiles_url(&format!("/{name}")))
            .query(&[("_listings", "true")]);

        Ok(self.send::<Envelope<Profile>>(request).await?.data)
    }

    pub async fn search_profiles(&self, query: &str) -> Result<Vec<Profile>, ApiError> {
        let request = self
            .http
            .get(self.profiles_url("/search"))
            .query(&[("q", query)]);

        Ok(self.send::<Envelope<Vec<Profile>>>(request).await?.data)
    }

    pub async fn profile_listings(&self, name: &str) -> Result<Vec<Listing>, ApiError> {
        let request = self
            .http
            .get(self.profiles_url(&format!("/{name}/listings")))
            .query(&[("_bids", "true"), ("_media", "true"), ("_tags", "true")]);

        Ok(self.send::<PageBody>(request).await?.into_items())
    }

    /// Listings the named profile has won. Requires a logged-in session.
    pub async fn profile_wins(&self, name: &str) -> Result<Vec<Listing>, ApiError> {
        self.session.require_token()?;
        let request = self
            .http
            .get(self.profiles_url(&format!("/{name}/wins")))
            .query(&[("_bids", "true"), ("_seller", "true"), ("_media", "true")]);

        Ok(self.send::<PageBody>(request).await?.into_items())
    }

    /// Bids the named profile has placed, with their listings included.
    /// Requires a logged-in session.
    pub async fn profile_bids(&self, name: &str) -> Result<Vec<Bid>, ApiError> {
        self.session.require_token()?;
        let request = self
            .http
            .get(self.profiles_url(&format!("/{name}/bids")))
            .query(&[("_listings", "true")]);

        Ok(self.send::<Envelope<Vec<Bid>>>(request).await?.data)
    }

    /// Update the logged-in profile's avatar, banner, or bio.
    pub async fn update_profile(&self, update: &ProfilePayload) -> Result<Profile, ApiError> {
        self.session.require_token()?;
        let name = self.session.require_name()?;
        let request = self
            .http
            .put(self.profiles_url(&format!("/{name}")))
            .json(update);

        Ok(self.send::<Envelope<Profile>>(request).await?.data)
    }
}
