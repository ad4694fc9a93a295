use anyhow::Result;
use std::env;

use crate::api::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Opaque access token for authenticated endpoints, if the operator has
    /// one. This crate never issues tokens.
    pub token: Option<String>,
    pub profile_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub page_size: u32,
    pub max_pages: Option<u32>,
    pub page_delay_ms: u64,
    pub retry_budget: u32,
    pub retry_base_delay_ms: u64,
    pub sanitize: bool,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub refresh_interval_secs: u64,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            api: ApiConfig {
                base_url: env::var("AUCTION_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                api_key: env::var("AUCTION_API_KEY").unwrap_or_default(),
                token: env::var("AUCTION_API_TOKEN").ok().filter(|t| !t.is_empty()),
                profile_name: env::var("AUCTION_PROFILE_NAME")
                    .ok()
                    .filter(|n| !n.is_empty()),
            },
            fetch: FetchConfig {
                page_size: env::var("PAGE_SIZE")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .unwrap_or(100),
                max_pages: env::var("MAX_PAGES").ok().and_then(|v| v.parse().ok()),
                page_delay_ms: env::var("PAGE_DELAY_MS")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()
                    .unwrap_or(200),
                retry_budget: env::var("RETRY_BUDGET")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
                retry_base_delay_ms: env::var("RETRY_BASE_DELAY_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .unwrap_or(1000),
                sanitize: env::var("SANITIZE_LISTINGS")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            monitor: MonitorConfig {
                refresh_interval_secs: env::var("REFRESH_INTERVAL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
                port: env::var("MONITOR_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}
