//! Listing view model.
//!
//! Owns the query parameters of one listing screen and drives fetch cycles:
//!
//! ```text
//! Idle ──► Loading ──► Success | Error ──► Loading ──► ...
//!            ▲  │
//!            └──┘ parameter change while loading starts a new cycle
//! ```
//!
//! Every cycle is stamped with the generation current when it started. A
//! finished cycle is applied only if its generation is still the latest one,
//! so a slow response can never overwrite a page the user has moved past.
//! Superseded cycles are not aborted; their results are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use storefront_client::{
    Identified, ListingError, ListingFilter, ListingSource, PageEnvelope, QuerySpec, Result,
    SortOrder, TokenSource,
};

use crate::enrich::{ListingRow, RowEnricher, RowLookup};
use crate::pagination::PAGE_SIZE_OPTIONS;

/// Status of the latest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Status plus the generation of the most recently issued cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchState {
    pub status: FetchStatus,
    pub generation: u64,
}

/// What the view renders.
#[derive(Debug, Clone)]
pub struct ListingState<R, V> {
    pub status: FetchStatus,
    pub generation: u64,
    pub rows: Arc<Vec<ListingRow<R, V>>>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub error: Option<ListingError>,
    /// Rows of the current page whose enrichment failed
    pub enrichment_failures: usize,
}

impl<R, V> ListingState<R, V> {
    fn idle(spec: &QuerySpec) -> Self {
        Self {
            status: FetchStatus::Idle,
            generation: 0,
            rows: Arc::new(Vec::new()),
            page: spec.page,
            page_size: spec.page_size,
            total: 0,
            total_pages: 0,
            error: None,
            enrichment_failures: 0,
        }
    }

    pub fn loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn fetch_state(&self) -> FetchState {
        FetchState {
            status: self.status,
            generation: self.generation,
        }
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The result became the visible state.
    Applied(FetchStatus),
    /// A newer cycle superseded this one; its result was dropped.
    Discarded,
}

/// Handle to a spawned cycle. Dropping it does not cancel the cycle.
#[derive(Debug)]
pub struct CycleHandle {
    generation: u64,
    task: JoinHandle<CycleOutcome>,
}

impl CycleHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the cycle, including a clamp re-issue, to settle.
    pub async fn wait(self) -> CycleOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(generation = self.generation, error = %e, "Listing cycle task failed");
                CycleOutcome::Discarded
            }
        }
    }
}

struct Inner {
    spec: QuerySpec,
    generation: u64,
}

struct Shared<R, S, L>
where
    L: RowLookup<R>,
{
    source: S,
    enricher: RowEnricher<L>,
    credentials: Arc<dyn TokenSource>,
    inner: Mutex<Inner>,
    state: watch::Sender<ListingState<R, L::Value>>,
}

/// View model for one paginated listing.
pub struct ListingViewModel<R, S, L>
where
    L: RowLookup<R>,
{
    shared: Arc<Shared<R, S, L>>,
}

impl<R, S, L> Clone for ListingViewModel<R, S, L>
where
    L: RowLookup<R>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R, S, L> ListingViewModel<R, S, L>
where
    R: Identified + Clone + Send + Sync + 'static,
    S: ListingSource<R> + 'static,
    L: RowLookup<R> + 'static,
    L::Value: 'static,
{
    /// Create an idle view model. Nothing is fetched until a setter,
    /// `refresh()` or `retry()` is called.
    pub fn new(
        source: S,
        enricher: RowEnricher<L>,
        credentials: Arc<dyn TokenSource>,
        initial: QuerySpec,
    ) -> Self {
        // The token is read per cycle, never kept in the owned spec.
        let initial = initial.with_auth_token(None);
        let (state, _) = watch::channel(ListingState::idle(&initial));

        Self {
            shared: Arc::new(Shared {
                source,
                enricher,
                credentials,
                inner: Mutex::new(Inner {
                    spec: initial,
                    generation: 0,
                }),
                state,
            }),
        }
    }

    /// Snapshot of the visible state.
    pub fn state(&self) -> ListingState<R, L::Value> {
        self.shared.state.borrow().clone()
    }

    /// Receive every visible state change.
    pub fn subscribe(&self) -> watch::Receiver<ListingState<R, L::Value>> {
        self.shared.state.subscribe()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.shared.state.borrow().fetch_state()
    }

    /// The current query parameters (without the auth token).
    pub fn spec(&self) -> QuerySpec {
        self.shared.lock().spec.clone()
    }

    /// Load or reload the current spec.
    pub fn refresh(&self) -> CycleHandle {
        self.issue(|spec| spec)
    }

    pub fn set_search_term(&self, term: impl Into<String>) -> CycleHandle {
        let term = term.into();
        self.issue(move |spec| spec.with_search(term))
    }

    pub fn set_filter(&self, filter: ListingFilter) -> CycleHandle {
        self.issue(move |spec| spec.with_filter(filter))
    }

    pub fn set_page(&self, page: u32) -> Result<CycleHandle> {
        if page == 0 {
            return Err(ListingError::InvalidQuery {
                reason: "page must be at least 1".into(),
            });
        }
        Ok(self.issue(move |spec| spec.with_page(page)))
    }

    /// Change the page size; only [`PAGE_SIZE_OPTIONS`] are accepted.
    pub fn set_page_size(&self, page_size: u32) -> Result<CycleHandle> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(ListingError::InvalidQuery {
                reason: format!(
                    "page size {} is not one of {:?}",
                    page_size, PAGE_SIZE_OPTIONS
                ),
            });
        }
        Ok(self.issue(move |spec| spec.with_page_size(page_size)))
    }

    pub fn set_sort(&self, field: Option<String>, order: SortOrder) -> CycleHandle {
        self.issue(move |spec| spec.with_sort(field, order))
    }

    /// Re-issue the current spec after an error. `None` when not in the error state.
    pub fn retry(&self) -> Option<CycleHandle> {
        if self.fetch_state().status != FetchStatus::Error {
            return None;
        }
        Some(self.issue(|spec| spec))
    }

    fn issue(&self, update: impl FnOnce(QuerySpec) -> QuerySpec) -> CycleHandle {
        let (generation, spec) = self.shared.begin(update);
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move { shared.run_cycle(generation, spec).await });

        CycleHandle { generation, task }
    }
}

impl<R, S, L> Shared<R, S, L>
where
    R: Identified + Clone + Send + Sync + 'static,
    S: ListingSource<R> + 'static,
    L: RowLookup<R> + 'static,
    L::Value: 'static,
{
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panic elsewhere; the data is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Rebuild the spec, start a new generation and mark it loading.
    fn begin(&self, update: impl FnOnce(QuerySpec) -> QuerySpec) -> (u64, QuerySpec) {
        let mut inner = self.lock();
        inner.spec = update(inner.spec.clone());
        inner.generation += 1;

        let generation = inner.generation;
        let spec = inner.spec.clone();
        self.state.send_modify(|state| {
            state.status = FetchStatus::Loading;
            state.generation = generation;
            state.error = None;
        });

        debug!(
            generation,
            page = spec.page,
            page_size = spec.page_size,
            search = spec.search_term.as_deref().unwrap_or(""),
            "Listing cycle started"
        );
        (generation, spec)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Fetch, clamp at most once, enrich and apply.
    ///
    /// If the result set shrinks again while the clamped request is in flight,
    /// its page is applied as is, even past the last page; the next trigger
    /// clamps it.
    async fn run_cycle(self: Arc<Self>, mut generation: u64, mut spec: QuerySpec) -> CycleOutcome {
        let mut clamped = false;

        loop {
            let request = spec.clone().with_auth_token(self.credentials.auth_token());

            let mut page = match self.source.fetch_page(&request).await {
                Ok(page) => page,
                Err(e) => return self.apply_error(generation, e),
            };

            if !self.is_current(generation) {
                debug!(generation, "Listing cycle superseded before enrichment");
                return CycleOutcome::Discarded;
            }

            // Requested page is past the end: clamp once instead of rendering "page N of M".
            if !clamped && page.page_out_of_range() {
                let last_page = page.total_pages.max(1);
                match self.clamp(generation, last_page) {
                    Some((next_generation, next_spec)) => {
                        info!(
                            requested = spec.page,
                            clamped_to = last_page,
                            total_pages = page.total_pages,
                            "Requested page out of range, re-issuing"
                        );
                        generation = next_generation;
                        spec = next_spec;
                        clamped = true;
                        continue;
                    }
                    None => return CycleOutcome::Discarded,
                }
            }

            let report = self.enricher.enrich(std::mem::take(&mut page.items)).await;
            let failures = report.failures.len();
            let enriched = page.map(|_| report.rows);

            return self.apply_page(generation, enriched, failures);
        }
    }

    /// Move the current spec to `page` under a new generation, unless superseded.
    fn clamp(&self, generation: u64, page: u32) -> Option<(u64, QuerySpec)> {
        let mut inner = self.lock();
        if inner.generation != generation {
            return None;
        }

        inner.spec = inner.spec.clone().with_page(page);
        inner.generation += 1;

        let next_generation = inner.generation;
        self.state.send_modify(|state| {
            state.status = FetchStatus::Loading;
            state.generation = next_generation;
        });
        Some((next_generation, inner.spec.clone()))
    }

    fn apply_error(&self, generation: u64, error: ListingError) -> CycleOutcome {
        // Hold the lock across check and publish so a newer cycle cannot interleave.
        let inner = self.lock();
        if inner.generation != generation {
            debug!(generation, latest = inner.generation, error = %error, "Discarding stale listing error");
            return CycleOutcome::Discarded;
        }

        info!(generation, error = %error, "Listing cycle failed");
        let spec = &inner.spec;
        self.state.send_modify(|state| {
            state.status = FetchStatus::Error;
            state.rows = Arc::new(Vec::new());
            state.page = spec.page;
            state.page_size = spec.page_size;
            state.total = 0;
            state.total_pages = 0;
            state.error = Some(error);
            state.enrichment_failures = 0;
        });
        CycleOutcome::Applied(FetchStatus::Error)
    }

    fn apply_page(
        &self,
        generation: u64,
        page: PageEnvelope<ListingRow<R, L::Value>>,
        failures: usize,
    ) -> CycleOutcome {
        let inner = self.lock();
        if inner.generation != generation {
            debug!(generation, latest = inner.generation, "Discarding stale listing page");
            return CycleOutcome::Discarded;
        }

        info!(
            generation,
            page = page.page,
            rows = page.items.len(),
            total = page.total,
            enrichment_failures = failures,
            "Listing page applied"
        );
        self.state.send_modify(|state| {
            state.status = FetchStatus::Success;
            state.rows = Arc::new(page.items);
            state.page = page.page;
            state.page_size = page.page_size;
            state.total = page.total;
            state.total_pages = page.total_pages;
            state.error = None;
            state.enrichment_failures = failures;
        });
        CycleOutcome::Applied(FetchStatus::Success)
    }
}
