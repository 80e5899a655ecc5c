//! Testing utilities including mock implementations.
//!
//! These let applications exercise listing view models without a storefront
//! server. Responses are keyed by search term so tests can decide which cycle
//! resolves first, independent of task scheduling.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::oneshot;

use storefront_client::{
    Identified, ListPayload, ListingError, ListingSource, PageEnvelope, QuerySpec, Result, Shop,
    SortOrder,
};

use crate::enrich::RowLookup;

/// Minimal active shop with the given id.
pub fn test_shop(id: &str) -> Shop {
    Shop {
        id: id.to_string(),
        name: format!("Shop {}", id),
        slug: None,
        description: None,
        phone: None,
        email: None,
        address: None,
        logo_url: None,
        is_active: true,
        created_at: None,
        seller: None,
    }
}

/// Record of a call made to the mock source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub page: u32,
    pub page_size: u32,
    pub search_term: Option<String>,
    pub active_only: Option<bool>,
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
    pub had_token: bool,
}

type Key = Option<String>;

/// Mock listing source.
///
/// Serves a full result set per search term and slices the requested page
/// out of it. Per-term gates hold a response until the test releases it;
/// per-term failures are returned once, in order.
pub struct MockListingSource<T> {
    catalogue: Arc<RwLock<HashMap<Key, Vec<T>>>>,
    failures: Arc<Mutex<HashMap<Key, VecDeque<ListingError>>>>,
    gates: Arc<Mutex<HashMap<Key, VecDeque<oneshot::Receiver<()>>>>>,
    calls: Arc<RwLock<Vec<RecordedQuery>>>,
}

impl<T> Default for MockListingSource<T> {
    fn default() -> Self {
        Self {
            catalogue: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            gates: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> Clone for MockListingSource<T> {
    fn clone(&self) -> Self {
        Self {
            catalogue: Arc::clone(&self.catalogue),
            failures: Arc::clone(&self.failures),
            gates: Arc::clone(&self.gates),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> MockListingSource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned when the search term matches (`None` = no search).
    pub fn with_rows(self, search: Option<&str>, rows: Vec<T>) -> Self {
        self.set_rows(search, rows);
        self
    }

    /// Replace the rows for a search term.
    pub fn set_rows(&self, search: Option<&str>, rows: Vec<T>) {
        self.catalogue
            .write()
            .unwrap()
            .insert(search.map(String::from), rows);
    }

    /// Fail the next request for this search term.
    pub fn fail_next(&self, search: Option<&str>, error: ListingError) {
        self.failures
            .lock()
            .unwrap()
            .entry(search.map(String::from))
            .or_default()
            .push_back(error);
    }

    /// Hold the next request for this search term until the returned sender fires.
    pub fn hold_next(&self, search: Option<&str>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(search.map(String::from))
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl<T> ListingSource<T> for MockListingSource<T>
where
    T: Clone + Send + Sync,
{
    async fn fetch_page(&self, spec: &QuerySpec) -> Result<PageEnvelope<T>> {
        let key = spec.search_term.clone();

        self.calls.write().unwrap().push(RecordedQuery {
            page: spec.page,
            page_size: spec.page_size,
            search_term: key.clone(),
            active_only: spec.filter.active_only,
            sort_field: spec.sort_field.clone(),
            sort_order: spec.sort_order,
            had_token: spec.auth_token.is_some(),
        });

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|q| q.pop_front());
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|q| q.pop_front());
        if let Some(error) = failure {
            return Err(error);
        }

        let rows = self
            .catalogue
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default();

        Ok(PageEnvelope::from_payload(
            ListPayload::Bare(rows),
            spec.page,
            spec.page_size,
        ))
    }
}

/// Mock per-row lookup returning counts by row id.
///
/// Rows without a configured value resolve to 0.
#[derive(Default, Clone)]
pub struct MockLookup {
    values: Arc<RwLock<HashMap<String, std::result::Result<u64, ListingError>>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    calls: Arc<RwLock<Vec<String>>>,
    completed: Arc<RwLock<Vec<String>>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, row_id: &str, value: u64) -> Self {
        self.values
            .write()
            .unwrap()
            .insert(row_id.to_string(), Ok(value));
        self
    }

    pub fn with_error(self, row_id: &str, error: ListingError) -> Self {
        self.values
            .write()
            .unwrap()
            .insert(row_id.to_string(), Err(error));
        self
    }

    /// Sleep before answering for this row.
    pub fn with_delay(self, row_id: &str, delay: Duration) -> Self {
        self.delays
            .write()
            .unwrap()
            .insert(row_id.to_string(), delay);
        self
    }

    /// Row ids in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Row ids in the order their lookups finished.
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.read().unwrap().clone()
    }
}

#[async_trait]
impl<R: Identified + Sync> RowLookup<R> for MockLookup {
    type Value = u64;

    async fn lookup(&self, row: &R) -> Result<u64> {
        let id = row.id().to_string();
        self.calls.write().unwrap().push(id.clone());

        let delay = self.delays.read().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.completed.write().unwrap().push(id.clone());
        self.values
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or(Ok(0))
    }
}
