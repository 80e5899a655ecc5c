use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use url::Url;

use crate::error::{ListingError, Result};

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    /// Bound on a single page request
    pub request_timeout: Duration,
    /// Bound on a single per-row enrichment lookup
    pub lookup_timeout: Duration,
    pub default_page_size: u32,
}

impl ClientConfig {
    /// Create a config for the given API base URL with default timeouts.
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| ListingError::Config(format!("invalid API URL {}: {}", api_url, e)))?;

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(30),
            lookup_timeout: Duration::from_secs(10),
            default_page_size: 10,
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let api_url = env::var("STOREFRONT_API_URL")
            .map_err(|_| ListingError::Config("STOREFRONT_API_URL must be set".into()))?;

        let mut config = Self::new(&api_url)?;
        if let Some(secs) = parse_var::<u64>("STOREFRONT_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>("STOREFRONT_LOOKUP_TIMEOUT_SECS")? {
            config.lookup_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<u32>("STOREFRONT_DEFAULT_PAGE_SIZE")? {
            if size == 0 {
                return Err(ListingError::Config(
                    "STOREFRONT_DEFAULT_PAGE_SIZE must be at least 1".into(),
                ));
            }
            config.default_page_size = size;
        }

        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ListingError::Config(format!("{} must be a valid number", name))),
        Err(_) => Ok(None),
    }
}
