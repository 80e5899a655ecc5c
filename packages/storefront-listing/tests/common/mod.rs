// Common test utilities

use std::sync::Arc;

use storefront_client::{Anonymous, QuerySpec, Shop, TokenSource};
use storefront_listing::testing::{test_shop, MockListingSource, MockLookup};
use storefront_listing::{ListingViewModel, RowEnricher};

pub type MockShopViewModel = ListingViewModel<Shop, MockListingSource<Shop>, MockLookup>;

/// Initialize tracing once; respects RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `count` shops with ids `{prefix}-1..`.
pub fn shops(prefix: &str, count: usize) -> Vec<Shop> {
    (1..=count)
        .map(|i| test_shop(&format!("{}-{}", prefix, i)))
        .collect()
}

pub fn view_model(
    source: &MockListingSource<Shop>,
    lookup: &MockLookup,
    initial: QuerySpec,
) -> MockShopViewModel {
    view_model_with_credentials(source, lookup, Arc::new(Anonymous), initial)
}

pub fn view_model_with_credentials(
    source: &MockListingSource<Shop>,
    lookup: &MockLookup,
    credentials: Arc<dyn TokenSource>,
    initial: QuerySpec,
) -> MockShopViewModel {
    init_tracing();
    ListingViewModel::new(
        source.clone(),
        RowEnricher::new(lookup.clone()),
        credentials,
        initial,
    )
}

/// Yield until the source has seen `count` requests.
pub async fn wait_for_calls(source: &MockListingSource<Shop>, count: usize) {
    while source.call_count() < count {
        tokio::task::yield_now().await;
    }
}
