//! Per-row enrichment.
//!
//! After a page is fetched, every row gets one secondary lookup (for shops,
//! the product count). Lookups run as a single concurrent batch and the batch
//! completes when all of them have settled. A failed or timed-out lookup marks
//! that row's derived value as unavailable; it never fails the page.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use storefront_client::{Identified, Result, Shop, StorefrontClient};

/// Secondary lookup keyed by a row.
#[async_trait]
pub trait RowLookup<R>: Send + Sync {
    type Value: Clone + Send + Sync;

    async fn lookup(&self, row: &R) -> Result<Self::Value>;
}

/// Derived value of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment<V> {
    Resolved(V),
    /// The lookup failed or timed out.
    Unavailable,
}

impl<V> Enrichment<V> {
    pub fn value(&self) -> Option<&V> {
        match self {
            Enrichment::Resolved(v) => Some(v),
            Enrichment::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Enrichment::Unavailable)
    }
}

impl<V: Clone + Default> Enrichment<V> {
    /// The value to display; unavailable reads as the default (a count of 0).
    pub fn value_or_default(&self) -> V {
        self.value().cloned().unwrap_or_default()
    }
}

/// A listed record plus its derived value. Built once per cycle, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow<R, V> {
    pub item: R,
    pub derived: Enrichment<V>,
}

/// A lookup that failed for one row. Counted, never raised to the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enrichment failed for row {row_id}: {reason}")]
pub struct RowEnrichmentFailure {
    pub row_id: String,
    pub reason: String,
}

/// Output of one enrichment batch, in input order.
#[derive(Debug, Clone)]
pub struct EnrichmentReport<R, V> {
    pub rows: Vec<ListingRow<R, V>>,
    pub failures: Vec<RowEnrichmentFailure>,
}

pub struct RowEnricher<L> {
    lookup: L,
    timeout: Duration,
}

impl<L> RowEnricher<L> {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Bound each lookup; expiry counts as that row's failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Enrich all rows concurrently, preserving input order.
    pub async fn enrich<R>(&self, rows: Vec<R>) -> EnrichmentReport<R, L::Value>
    where
        R: Identified + Send + Sync,
        L: RowLookup<R>,
    {
        let timeout = self.timeout;
        let lookups = rows.iter().map(|row| async move {
            match tokio::time::timeout(timeout, self.lookup.lookup(row)).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {:?}", timeout)),
            }
        });

        // join_all yields results in input order regardless of completion order
        let results = join_all(lookups).await;

        let mut failures = Vec::new();
        let rows = rows
            .into_iter()
            .zip(results)
            .map(|(item, result)| {
                let derived = match result {
                    Ok(value) => Enrichment::Resolved(value),
                    Err(reason) => {
                        warn!(row_id = %item.id(), error = %reason, "Row enrichment failed, using default");
                        failures.push(RowEnrichmentFailure {
                            row_id: item.id().to_string(),
                            reason,
                        });
                        Enrichment::Unavailable
                    }
                };
                ListingRow { item, derived }
            })
            .collect::<Vec<_>>();

        debug!(
            rows = rows.len(),
            failures = failures.len(),
            "Enrichment batch settled"
        );

        EnrichmentReport { rows, failures }
    }
}

/// Product count per shop, from `meta.total` of the shop's product listing.
#[derive(Debug, Clone)]
pub struct ProductCountLookup {
    client: StorefrontClient,
}

impl ProductCountLookup {
    pub fn new(client: StorefrontClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RowLookup<Shop> for ProductCountLookup {
    type Value = u64;

    async fn lookup(&self, shop: &Shop) -> Result<u64> {
        self.client.shop_product_count(&shop.id).await
    }
}

/// No secondary lookup; every row resolves to `()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unenriched;

#[async_trait]
impl<R: Sync> RowLookup<R> for Unenriched {
    type Value = ();

    async fn lookup(&self, _row: &R) -> Result<()> {
        Ok(())
    }
}
