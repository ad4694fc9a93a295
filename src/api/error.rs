use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the auction API client.
///
/// Rate limiting gets its own variant so the paged fetcher can match on it
/// instead of sniffing status codes out of a message string.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited by the auction API: {body}")]
    RateLimited { body: String },

    #[error("auction API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not logged in: this call requires an access token")]
    NotLoggedIn,
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            ApiError::RateLimited { body }
        } else {
            ApiError::Status {
                status: status.as_u16(),
                body,
            }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }
}
