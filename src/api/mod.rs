pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{AuctionClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use session::Session;
pub use types::*;
