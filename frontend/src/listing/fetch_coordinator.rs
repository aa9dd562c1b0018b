//! Issues listing queries and applies only the most recently issued one.
//!
//! Responses can land in any order. Each request is tagged with a
//! [`RequestToken`] when it is issued; a response is applied only if its token
//! is still the latest issued token when it arrives. Older responses are
//! dropped without touching the store.

use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use common::{search_query::QueryDescriptor, search_result::ResultPage};
use tracing::{debug, warn};

use crate::{
    api::search_api::QueryService,
    listing::{
        error::ListingError,
        lock,
        paged_result_store::{ListingView, PagedResultStore},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer request was issued before this one settled.
    Stale,
    Failed,
}

struct CoordinatorState<R> {
    store: PagedResultStore<R>,
    latest_token: u64,
    last_descriptor: Option<QueryDescriptor>,
}

enum Settled {
    Done(FetchOutcome),
    /// The result clamped the page; fetch the clamped page under a new token.
    Refetch(RequestToken, QueryDescriptor),
}

/// Settles the tracked request as failed if it is dropped unsettled, so a
/// panicking service or an aborted task never leaves `loading` on.
struct InFlight<S: QueryService> {
    coordinator: Arc<FetchCoordinator<S>>,
    token: Option<RequestToken>,
}

impl<S: QueryService> InFlight<S> {
    async fn run(mut self, mut token: RequestToken, mut descriptor: QueryDescriptor) -> FetchOutcome {
        let coordinator = self.coordinator.clone();
        loop {
            let result = coordinator.service.count_and_fetch(descriptor.clone()).await;
            match coordinator.settle(token, descriptor, result) {
                Settled::Done(outcome) => {
                    self.token = None;
                    return outcome;
                }
                Settled::Refetch(next_token, next_descriptor) => {
                    token = next_token;
                    self.token = Some(next_token);
                    descriptor = next_descriptor;
                }
            }
        }
    }
}

impl<S: QueryService> Drop for InFlight<S> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.coordinator.abandon(token);
        }
    }
}

pub struct FetchCoordinator<S: QueryService> {
    service: Arc<S>,
    state: Mutex<CoordinatorState<S::Row>>,
}

impl<S: QueryService> FetchCoordinator<S> {
    pub fn new(service: Arc<S>, page_size: u64) -> Self {
        Self {
            service,
            state: Mutex::new(CoordinatorState {
                store: PagedResultStore::new(page_size),
                latest_token: 0,
                last_descriptor: None,
            }),
        }
    }

    fn issue_locked(state: &mut CoordinatorState<S::Row>, descriptor: &QueryDescriptor) -> RequestToken {
        state.latest_token += 1;
        state.store.set_loading(true);
        state.last_descriptor = Some(descriptor.clone());
        debug!(
            "issuing request #{} for {} page {}",
            state.latest_token, descriptor.table, descriptor.page_index
        );
        RequestToken(state.latest_token)
    }

    /// Tags `descriptor` with a new token, making every earlier request stale.
    pub fn issue(&self, descriptor: &QueryDescriptor) -> RequestToken {
        Self::issue_locked(&mut lock(&self.state), descriptor)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        lock(&self.state).latest_token == token.0
    }

    fn settle(
        &self,
        token: RequestToken,
        descriptor: QueryDescriptor,
        result: anyhow::Result<ResultPage<S::Row>>,
    ) -> Settled {
        let mut state = lock(&self.state);
        if state.latest_token != token.0 {
            debug!("dropping stale response #{} (latest is #{})", token.0, state.latest_token);
            return Settled::Done(FetchOutcome::Stale);
        }
        match result {
            Ok(page) => {
                // the page moves together with the rows it belongs to
                state.store.restore_page(descriptor.page_index);
                state.store.set_result(page.rows, page.total_count);
                let clamped = state.store.page_index();
                if clamped != descriptor.page_index {
                    let mut descriptor = descriptor;
                    descriptor.page_index = clamped;
                    let token = Self::issue_locked(&mut state, &descriptor);
                    return Settled::Refetch(token, descriptor);
                }
                state.store.set_loading(false);
                Settled::Done(FetchOutcome::Applied)
            }
            Err(e) => {
                warn!("listing query on {} failed: {e:#}", descriptor.table);
                state.store.set_loading(false);
                state.store.set_error(ListingError::fetch_failure(&e));
                Settled::Done(FetchOutcome::Failed)
            }
        }
    }

    fn abandon(&self, token: RequestToken) {
        let mut state = lock(&self.state);
        if state.latest_token != token.0 {
            return;
        }
        warn!("request #{} ended without settling", token.0);
        state.store.set_loading(false);
        state.store.set_error(ListingError::interrupted());
    }

    /// Issues `descriptor` immediately and returns a future that fetches and
    /// applies the result. The token is taken at call time, not at first poll,
    /// so requests order by when this is called.
    pub fn execute(self: Arc<Self>, descriptor: QueryDescriptor) -> impl Future<Output = FetchOutcome> + Send + 'static {
        let token = self.issue(&descriptor);
        // owned by the future from the start, so even an unpolled drop settles it
        let in_flight = InFlight { coordinator: self, token: Some(token) };
        in_flight.run(token, descriptor)
    }

    pub fn last_descriptor(&self) -> Option<QueryDescriptor> {
        lock(&self.state).last_descriptor.clone()
    }

    pub fn with_store<T>(&self, f: impl FnOnce(&mut PagedResultStore<S::Row>) -> T) -> T {
        f(&mut lock(&self.state).store)
    }

    pub fn view(&self) -> ListingView<S::Row> {
        lock(&self.state).store.view()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use common::{listing_schema::automation_directory, search_query::{FacetSelections, SearchTerm}};
    use tokio::sync::oneshot;

    use super::*;

    type Reply = anyhow::Result<ResultPage<u64>>;

    fn gate_key(term: &str, page: u64) -> String {
        format!("{term}:{page}")
    }

    /// Each call waits for the reply the test sends through the oneshot
    /// channel registered for its search term and page.
    #[derive(Default)]
    struct GatedService {
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl GatedService {
        fn gate(&self, term: &str, page: u64) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(gate_key(term, page), rx);
            tx
        }
    }

    impl QueryService for GatedService {
        type Row = u64;

        fn count_and_fetch(&self, query: QueryDescriptor) -> impl Future<Output = Reply> + Send {
            let key = gate_key(query.search_term().unwrap_or(""), query.page_index);
            let gate = self.gates.lock().unwrap().remove(&key);
            async move {
                match gate {
                    Some(rx) => rx.await.unwrap_or_else(|_| Err(anyhow::anyhow!("gate dropped"))),
                    None => Err(anyhow::anyhow!("no gate")),
                }
            }
        }
    }

    struct PanickingService;

    impl QueryService for PanickingService {
        type Row = u64;

        fn count_and_fetch(&self, _query: QueryDescriptor) -> impl Future<Output = Reply> + Send {
            async { panic!("driver bug") }
        }
    }

    fn descriptor(term: &str, page: u64) -> QueryDescriptor {
        automation_directory().compose(&SearchTerm::new(term), &FacetSelections::new(), page)
    }

    #[tokio::test]
    async fn later_request_wins_when_earlier_resolves_last() {
        let service = Arc::new(GatedService::default());
        let first_gate = service.gate("a", 1);
        let second_gate = service.gate("ab", 1);
        let coordinator = Arc::new(FetchCoordinator::new(service.clone(), 25));

        let first = tokio::spawn(coordinator.clone().execute(descriptor("a", 1)));
        let second = tokio::spawn(coordinator.clone().execute(descriptor("ab", 1)));

        second_gate.send(Ok(ResultPage::new(vec![2], 1))).unwrap();
        assert_eq!(second.await.unwrap(), FetchOutcome::Applied);
        assert!(!coordinator.view().loading);

        first_gate.send(Ok(ResultPage::new(vec![1, 1, 1], 3))).unwrap();
        assert_eq!(first.await.unwrap(), FetchOutcome::Stale);

        let view = coordinator.view();
        assert_eq!(view.rows, vec![2]);
        assert_eq!(view.total_count, 1);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn stale_discard_keeps_loading_for_pending_latest() {
        let service = Arc::new(GatedService::default());
        let first_gate = service.gate("a", 1);
        let second_gate = service.gate("ab", 1);
        let coordinator = Arc::new(FetchCoordinator::new(service.clone(), 25));

        let first = tokio::spawn(coordinator.clone().execute(descriptor("a", 1)));
        let second = tokio::spawn(coordinator.clone().execute(descriptor("ab", 1)));

        first_gate.send(Ok(ResultPage::new(vec![1], 1))).unwrap();
        assert_eq!(first.await.unwrap(), FetchOutcome::Stale);
        assert!(coordinator.view().loading);
        assert!(coordinator.view().rows.is_empty());

        second_gate.send(Ok(ResultPage::new(vec![2], 1))).unwrap();
        assert_eq!(second.await.unwrap(), FetchOutcome::Applied);
        assert!(!coordinator.view().loading);
    }

    #[tokio::test]
    async fn failure_keeps_previous_page_and_reports_error() {
        let service = Arc::new(GatedService::default());
        let ok_gate = service.gate("", 1);
        let err_gate = service.gate("x", 1);
        let coordinator = Arc::new(FetchCoordinator::new(service.clone(), 25));

        let ok = tokio::spawn(coordinator.clone().execute(descriptor("", 1)));
        ok_gate.send(Ok(ResultPage::new(vec![5, 6], 2))).unwrap();
        assert_eq!(ok.await.unwrap(), FetchOutcome::Applied);

        let failed = tokio::spawn(coordinator.clone().execute(descriptor("x", 1)));
        err_gate.send(Err(anyhow::anyhow!("connection reset"))).unwrap();
        assert_eq!(failed.await.unwrap(), FetchOutcome::Failed);

        let view = coordinator.view();
        assert_eq!(view.rows, vec![5, 6]);
        assert_eq!(view.total_count, 2);
        assert_eq!(view.page_index, 1);
        assert!(!view.loading);
        assert!(view.error.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn out_of_range_result_refetches_clamped_page() {
        let service = Arc::new(GatedService::default());
        let page_four = service.gate("", 4);
        let page_two = service.gate("", 2);
        let coordinator = Arc::new(FetchCoordinator::new(service.clone(), 25));

        let fetch = tokio::spawn(coordinator.clone().execute(descriptor("", 4)));
        page_four.send(Ok(ResultPage::new(vec![], 30))).unwrap();
        page_two.send(Ok(ResultPage::new(vec![26, 27, 28, 29, 30], 30))).unwrap();
        assert_eq!(fetch.await.unwrap(), FetchOutcome::Applied);

        let view = coordinator.view();
        assert_eq!(view.page_index, 2);
        assert_eq!(view.rows.len(), 5);
        assert_eq!((view.displayed_range_start, view.displayed_range_end), (26, 30));
        assert_eq!(coordinator.last_descriptor().unwrap().page_index, 2);
    }

    #[tokio::test]
    async fn panicking_service_still_settles_loading() {
        let coordinator = Arc::new(FetchCoordinator::new(Arc::new(PanickingService), 25));
        let fetch = tokio::spawn(coordinator.clone().execute(descriptor("a", 1)));
        assert!(fetch.await.unwrap_err().is_panic());

        let view = coordinator.view();
        assert!(!view.loading);
        assert!(view.error.unwrap().contains("interrupted"));
    }

    #[tokio::test]
    async fn aborted_request_settles_loading_unless_superseded() {
        let service = Arc::new(GatedService::default());
        let _never = service.gate("a", 1);
        let _pending = service.gate("ab", 1);
        let coordinator = Arc::new(FetchCoordinator::new(service.clone(), 25));

        let first = tokio::spawn(coordinator.clone().execute(descriptor("a", 1)));
        let second = tokio::spawn(coordinator.clone().execute(descriptor("ab", 1)));
        tokio::task::yield_now().await;

        // the superseded request leaves the newer one's loading flag alone
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        assert!(coordinator.view().loading);
        assert!(coordinator.view().error.is_none());

        second.abort();
        assert!(second.await.unwrap_err().is_cancelled());
        let view = coordinator.view();
        assert!(!view.loading);
        assert!(view.error.is_some());
    }

    #[test]
    fn issuing_supersedes_earlier_tokens() {
        let coordinator = FetchCoordinator::new(Arc::new(GatedService::default()), 25);
        let first = coordinator.issue(&descriptor("a", 1));
        assert!(coordinator.is_latest(first));
        let second = coordinator.issue(&descriptor("a", 1));
        assert!(!coordinator.is_latest(first));
        assert!(coordinator.is_latest(second));
        assert!(first < second);
    }
}
