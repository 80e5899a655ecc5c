//! Paginated listings for the storefront admin and seller screens.
//!
//! A [`ListingViewModel`] owns the query parameters of one screen, fetches a
//! page through a [`ListingSource`], enriches every row concurrently with a
//! [`RowLookup`] and publishes the result only if no newer request was issued
//! in the meantime.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_client::{ClientConfig, SessionCredentials, StorefrontClient};
//! use storefront_listing::shop_list_view_model;
//!
//! let config = ClientConfig::from_env()?;
//! let client = StorefrontClient::new(&config)?;
//! let credentials = Arc::new(SessionCredentials::new(store, session_id));
//!
//! let shops = shop_list_view_model(client, &config, credentials);
//! shops.set_search_term("cement").wait().await;
//!
//! let state = shops.state();
//! for row in state.rows.iter() {
//!     println!("{} ({} products)", row.item.name, row.derived.value_or_default());
//! }
//! ```

pub mod enrich;
pub mod pagination;
pub mod testing;
pub mod view_model;

use std::sync::Arc;

use storefront_client::{
    ClientConfig, ListingQueryEngine, Product, QuerySpec, Shop, StorefrontClient, TokenSource,
};

pub use enrich::{
    Enrichment, EnrichmentReport, ListingRow, ProductCountLookup, RowEnricher,
    RowEnrichmentFailure, RowLookup, Unenriched,
};
pub use pagination::{StatusTab, PAGE_SIZE_OPTIONS};
pub use storefront_client::ListingSource;
pub use view_model::{
    CycleHandle, CycleOutcome, FetchState, FetchStatus, ListingState, ListingViewModel,
};

/// Admin shop table: every shop with its product count.
pub type ShopListViewModel = ListingViewModel<Shop, ListingQueryEngine<Shop>, ProductCountLookup>;

/// Product table of one seller or shop, without enrichment.
pub type ProductListViewModel = ListingViewModel<Product, ListingQueryEngine<Product>, Unenriched>;

/// Admin shop listing with per-shop product counts.
pub fn shop_list_view_model(
    client: StorefrontClient,
    config: &ClientConfig,
    credentials: Arc<dyn TokenSource>,
) -> ShopListViewModel {
    let enricher =
        RowEnricher::new(ProductCountLookup::new(client.clone())).with_timeout(config.lookup_timeout);

    ListingViewModel::new(
        ListingQueryEngine::admin_shops(client),
        enricher,
        credentials,
        QuerySpec::default().with_page_size(config.default_page_size),
    )
}

/// Products of one seller.
pub fn seller_product_view_model(
    client: StorefrontClient,
    config: &ClientConfig,
    credentials: Arc<dyn TokenSource>,
    seller_id: impl Into<String>,
) -> ProductListViewModel {
    ListingViewModel::new(
        ListingQueryEngine::seller_products(client, seller_id),
        RowEnricher::new(Unenriched),
        credentials,
        QuerySpec::default().with_page_size(config.default_page_size),
    )
}

/// Products of one shop.
pub fn shop_product_view_model(
    client: StorefrontClient,
    config: &ClientConfig,
    credentials: Arc<dyn TokenSource>,
    shop_id: impl Into<String>,
) -> ProductListViewModel {
    ListingViewModel::new(
        ListingQueryEngine::shop_products(client, shop_id),
        RowEnricher::new(Unenriched),
        credentials,
        QuerySpec::default().with_page_size(config.default_page_size),
    )
}
