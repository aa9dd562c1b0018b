//! The page-facing controller of one faceted listing.
//!
//! Text input settles through [`DebouncedInput`]; facet, page and clear
//! actions compose and issue a request immediately. Every request goes
//! through the shared [`FetchCoordinator`], so only the latest one lands.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use common::{
    listing_schema::ListingSchema,
    pagination::clamp_page,
    search_query::{FacetSelections, QueryDescriptor, SearchTerm},
};
use futures_util::{StreamExt, stream::Stream};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    api::search_api::QueryService,
    data_definitions::listing_url_state::ListingUrlState,
    listing::{
        debounced_input::DebouncedInput,
        fetch_coordinator::{FetchCoordinator, FetchOutcome},
        lock,
        paged_result_store::ListingView,
    },
};

#[derive(Debug, Clone, Default)]
struct ListingInputs {
    /// What is in the text box right now, settled or not.
    raw_text: String,
    search_term: SearchTerm,
    selections: FacetSelections,
}

struct ListingInner<S: QueryService> {
    schema: ListingSchema,
    coordinator: Arc<FetchCoordinator<S>>,
    inputs: Mutex<ListingInputs>,
    debouncer: DebouncedInput,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl<S: QueryService> ListingInner<S> {
    fn compose(&self, page_index: u64) -> QueryDescriptor {
        let inputs = lock(&self.inputs);
        self.schema.compose(&inputs.search_term, &inputs.selections, page_index)
    }

    fn spawn_fetch(&self, descriptor: QueryDescriptor) -> JoinHandle<FetchOutcome> {
        // issued here, synchronously, so request order follows event order
        tokio::spawn(self.coordinator.clone().execute(descriptor))
    }

    /// Re-queries from page 1 with the current inputs.
    fn restart(&self) -> JoinHandle<FetchOutcome> {
        self.spawn_fetch(self.compose(1))
    }

    fn settle_search(&self, term: SearchTerm) -> JoinHandle<FetchOutcome> {
        debug!("{}: search settled on {:?}", self.schema.name, term.as_str());
        lock(&self.inputs).search_term = term;
        self.restart()
    }

    fn stop_watching(&self) {
        if let Some(watcher) = lock(&self.watcher).take() {
            watcher.abort();
        }
    }
}

impl<S: QueryService> Drop for ListingInner<S> {
    fn drop(&mut self) {
        self.debouncer.cancel();
        self.stop_watching();
    }
}

/// Cheap to clone; all clones drive the same listing. The pending debounce
/// timer and change watcher stop when the last clone is dropped or on
/// [`DirectoryListing::teardown`].
pub struct DirectoryListing<S: QueryService> {
    inner: Arc<ListingInner<S>>,
}

impl<S: QueryService> Clone for DirectoryListing<S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<S: QueryService> DirectoryListing<S> {
    pub fn new(schema: ListingSchema, service: Arc<S>, debounce_window: Duration) -> Self {
        let coordinator = Arc::new(FetchCoordinator::new(service, schema.page_size));
        let inner = Arc::new_cyclic(|weak: &Weak<ListingInner<S>>| {
            let weak = weak.clone();
            ListingInner {
                schema,
                coordinator,
                inputs: Mutex::new(ListingInputs::default()),
                debouncer: DebouncedInput::new(debounce_window, move |term| {
                    if let Some(inner) = weak.upgrade() {
                        let _ = inner.settle_search(term);
                    }
                }),
                watcher: Mutex::new(None),
            }
        });
        Self { inner }
    }

    pub fn schema(&self) -> &ListingSchema {
        &self.inner.schema
    }

    /// Fetches the first page with the current inputs.
    pub fn load(&self) -> JoinHandle<FetchOutcome> {
        self.inner.restart()
    }

    pub fn on_search_text_change(&self, raw: &str) {
        lock(&self.inner.inputs).raw_text = raw.to_string();
        self.inner.debouncer.input(raw);
    }

    /// Immediate, no debounce. An empty selection removes the facet's constraint.
    pub fn on_facet_change(&self, facet: &str, selection: BTreeSet<String>) -> JoinHandle<FetchOutcome> {
        {
            let mut inputs = lock(&self.inner.inputs);
            if selection.is_empty() {
                inputs.selections.remove(facet);
            } else {
                inputs.selections.insert(facet.to_string(), selection);
            }
        }
        self.inner.restart()
    }

    /// Clamps `page` against the current total. Returns `None` when the
    /// clamped page is already shown and nothing newer is in flight.
    pub fn on_page_change(&self, page: u64) -> Option<JoinHandle<FetchOutcome>> {
        let (shown, effective, loading) = self.inner.coordinator.with_store(|store| {
            (store.page_index(), clamp_page(page, store.total_pages()), store.loading())
        });
        if effective == shown && !loading {
            return None;
        }
        Some(self.inner.spawn_fetch(self.inner.compose(effective)))
    }

    /// Empties the text box and settles immediately.
    pub fn on_clear_search(&self) -> JoinHandle<FetchOutcome> {
        self.inner.debouncer.supersede(|| {
            lock(&self.inner.inputs).raw_text.clear();
            self.inner.settle_search(SearchTerm::default())
        })
    }

    /// Drops every facet selection and the search text, settling immediately.
    pub fn on_clear_filters(&self) -> JoinHandle<FetchOutcome> {
        self.inner.debouncer.supersede(|| {
            {
                let mut inputs = lock(&self.inner.inputs);
                inputs.raw_text.clear();
                inputs.search_term = SearchTerm::default();
                inputs.selections.clear();
            }
            self.inner.restart()
        })
    }

    /// Re-runs the last issued query, or the current inputs if nothing was issued yet.
    pub fn refresh(&self) -> JoinHandle<FetchOutcome> {
        refresh_listing(&self.inner)
    }

    /// Re-runs the last query on every item of `changes`, until the stream
    /// ends or the listing is torn down. Replaces any earlier watcher.
    pub fn watch_changes<St>(&self, changes: St)
    where
        St: Stream<Item = ()> + Send + 'static,
    {
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            let mut changes = Box::pin(changes);
            while changes.next().await.is_some() {
                let Some(inner) = weak.upgrade() else { break };
                debug!("{}: change notification, refreshing", inner.schema.name);
                let _ = refresh_listing(&inner);
            }
        });
        if let Some(previous) = lock(&self.inner.watcher).replace(task) {
            previous.abort();
        }
    }

    /// Cancels the pending debounce timer and the change watcher. Requests
    /// already in flight still settle into the store.
    pub fn teardown(&self) {
        self.inner.debouncer.cancel();
        self.inner.stop_watching();
    }

    pub fn view(&self) -> ListingView<S::Row> {
        self.inner.coordinator.view()
    }

    pub fn search_text(&self) -> String {
        lock(&self.inner.inputs).raw_text.clone()
    }

    pub fn search_term(&self) -> SearchTerm {
        lock(&self.inner.inputs).search_term.clone()
    }

    pub fn selections(&self) -> FacetSelections {
        lock(&self.inner.inputs).selections.clone()
    }

    pub fn is_search_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    pub fn url_state(&self) -> ListingUrlState {
        let inputs = lock(&self.inner.inputs);
        ListingUrlState {
            search_term: inputs.search_term.clone(),
            facet_filters: inputs.selections.clone(),
            page_index: self.inner.coordinator.with_store(|store| store.page_index()),
        }
    }

    /// Replaces all inputs with `state` and fetches its page. A page past the
    /// end is clamped and refetched once the total is known.
    pub fn restore(&self, state: ListingUrlState) -> JoinHandle<FetchOutcome> {
        self.inner.debouncer.supersede(|| {
            {
                let mut inputs = lock(&self.inner.inputs);
                inputs.raw_text = state.search_term.to_string();
                inputs.search_term = state.search_term;
                inputs.selections = state.facet_filters;
                inputs.selections.retain(|_, values| !values.is_empty());
            }
            // compose keeps the page small enough to have an offset
            self.inner.spawn_fetch(self.inner.compose(state.page_index))
        })
    }
}

fn refresh_listing<S: QueryService>(inner: &ListingInner<S>) -> JoinHandle<FetchOutcome> {
    let descriptor = match inner.coordinator.last_descriptor() {
        Some(descriptor) => descriptor,
        None => inner.compose(inner.coordinator.with_store(|store| store.page_index())),
    };
    inner.spawn_fetch(descriptor)
}
