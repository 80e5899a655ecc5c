//! Listing query engine.
//!
//! [`ListingSource`] is the seam the listing pipeline depends on;
//! [`ListingQueryEngine`] is the HTTP implementation bound to one endpoint.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::page::PageEnvelope;
use crate::query::QuerySpec;
use crate::types::{Product, Shop};
use crate::StorefrontClient;

/// Produces one normalized page per query.
///
/// Implementations must not write shared state; the only side effect is the
/// remote read itself.
#[async_trait]
pub trait ListingSource<T>: Send + Sync {
    async fn fetch_page(&self, spec: &QuerySpec) -> Result<PageEnvelope<T>>;
}

/// HTTP listing engine for one endpoint.
pub struct ListingQueryEngine<T> {
    client: StorefrontClient,
    endpoint: Endpoint,
    _rows: PhantomData<fn() -> T>,
}

impl<T> ListingQueryEngine<T> {
    pub fn new(client: StorefrontClient, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            _rows: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl ListingQueryEngine<Shop> {
    /// Public shop directory.
    pub fn shops(client: StorefrontClient) -> Self {
        Self::new(client, Endpoint::Shops)
    }

    /// Admin shop table; requires a session token.
    pub fn admin_shops(client: StorefrontClient) -> Self {
        Self::new(client, Endpoint::AdminShops)
    }
}

impl ListingQueryEngine<Product> {
    /// Products of one seller, as shown on their shop page.
    pub fn seller_products(client: StorefrontClient, seller_id: impl Into<String>) -> Self {
        Self::new(
            client,
            Endpoint::SellerProducts {
                seller_id: seller_id.into(),
            },
        )
    }

    /// Products of one shop.
    pub fn shop_products(client: StorefrontClient, shop_id: impl Into<String>) -> Self {
        Self::new(
            client,
            Endpoint::Products {
                shop_id: Some(shop_id.into()),
            },
        )
    }
}

impl<T> Clone for ListingQueryEngine<T> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone(), self.endpoint.clone())
    }
}

#[async_trait]
impl<T> ListingSource<T> for ListingQueryEngine<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, spec: &QuerySpec) -> Result<PageEnvelope<T>> {
        self.client.list(&self.endpoint, spec).await
    }
}
