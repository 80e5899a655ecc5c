//! REST client for the construction marketplace storefront.
//!
//! Reads shop and product listings, classifies the response shape once at
//! the boundary and normalizes it into a [`PageEnvelope`].
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_client::{ClientConfig, ListingQueryEngine, ListingSource, QuerySpec, StorefrontClient};
//!
//! let client = StorefrontClient::new(&ClientConfig::from_env()?)?;
//! let engine = ListingQueryEngine::shops(client);
//!
//! let page = engine
//!     .fetch_page(&QuerySpec::page(1, 10).with_search("cement"))
//!     .await?;
//! println!("{} of {} shops", page.items.len(), page.total);
//! ```

pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod page;
pub mod query;
pub mod types;

pub use config::ClientConfig;
pub use credentials::{
    Anonymous, AuthToken, CredentialStore, MemoryCredentialStore, SessionCredentials, TokenSource,
};
pub use endpoint::Endpoint;
pub use engine::{ListingQueryEngine, ListingSource};
pub use error::{ListingError, Result};
pub use page::{total_pages_for, Envelope, ListPayload, PageEnvelope, PayloadMeta};
pub use query::{ListingFilter, QuerySpec, SortOrder};
pub use types::{Identified, Product, Seller, Shop, ShopStatus};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// Storefront REST client.
#[derive(Clone)]
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Single-record responses come bare or wrapped in `{data}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Single<T> {
    Wrapped { data: T },
    Bare(T),
}

impl Single<serde_json::Value> {
    fn into_inner(self) -> serde_json::Value {
        match self {
            Single::Wrapped { data } => data,
            Single::Bare(value) => value,
        }
    }
}

impl StorefrontClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ListingError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_http_client(http, config.api_url.clone()))
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(http: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one page from a listing endpoint.
    ///
    /// Fails with `AuthRequired` without touching the network when the
    /// endpoint needs a token and `spec` carries none.
    pub async fn list<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        spec: &QuerySpec,
    ) -> Result<PageEnvelope<T>> {
        let payload = self.fetch_payload(endpoint, spec).await?;
        Ok(PageEnvelope::from_payload(payload, spec.page, spec.page_size))
    }

    async fn fetch_payload<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        spec: &QuerySpec,
    ) -> Result<ListPayload<T>> {
        spec.validate()?;

        if endpoint.requires_auth() && spec.auth_token.is_none() {
            debug!(path = %endpoint.path(), "No session token for restricted endpoint");
            return Err(ListingError::AuthRequired);
        }

        let mut query = endpoint.scope_pairs();
        query.extend(spec.query_pairs());

        let body = self
            .get_json(&endpoint.path(), &query, spec.auth_token.as_ref())
            .await?;
        ListPayload::classify(body)
    }

    /// Fetch a shop by id.
    pub async fn shop_by_id(&self, id: &str) -> Result<Shop> {
        self.get_single(&Endpoint::shop_by_id(id)).await
    }

    /// Fetch a shop by its URL slug.
    pub async fn shop_by_slug(&self, slug: &str) -> Result<Shop> {
        self.get_single(&Endpoint::shop_by_slug(slug)).await
    }

    /// The logged-in seller's shop, if they have one.
    pub async fn my_shop(&self, token: &AuthToken) -> Result<Option<Shop>> {
        let spec = QuerySpec::default()
            .with_filter(ListingFilter::active(true))
            .with_auth_token(Some(token.clone()));

        let page: PageEnvelope<Shop> = self.list(&Endpoint::MyShops, &spec).await?;
        Ok(page.items.into_iter().next())
    }

    /// Number of products listed by a shop.
    ///
    /// Read from `meta.total`; an envelope without it counts as 0. A response
    /// without `meta` is the full product list and is counted directly.
    pub async fn shop_product_count(&self, shop_id: &str) -> Result<u64> {
        let endpoint = Endpoint::Products {
            shop_id: Some(shop_id.to_string()),
        };
        let spec = QuerySpec::page(1, 1).with_sort(None, SortOrder::Desc);

        let payload: ListPayload<serde_json::Value> = self.fetch_payload(&endpoint, &spec).await?;
        Ok(match payload {
            ListPayload::Envelope(Envelope {
                meta: Some(meta), ..
            }) => meta.total.unwrap_or(0),
            ListPayload::Envelope(Envelope { data, meta: None }) | ListPayload::Bare(data) => {
                data.len() as u64
            }
        })
    }

    async fn get_single<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_json(path, &[], None).await?;
        let single: Single<serde_json::Value> = serde_json::from_value(body)
            .map_err(|e| ListingError::malformed(format!("invalid record payload: {}", e)))?;

        serde_json::from_value(single.into_inner())
            .map_err(|e| ListingError::malformed(format!("invalid record payload: {}", e)))
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        token: Option<&AuthToken>,
    ) -> Result<serde_json::Value> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ListingError::Config(format!("invalid endpoint path {}: {}", path, e)))?;

        debug!(url = %url, params = query.len(), authenticated = token.is_some(), "GET listing");

        let mut request = self.http.get(url.clone()).query(query);
        if let Some(token) = token {
            request = request.bearer_auth(token.expose());
        }

        let resp = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Storefront request failed");
            ListingError::from(e)
        })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(if token.is_some() {
                ListingError::Unauthorized
            } else {
                ListingError::AuthRequired
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ListingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
