//! List View Model: one page's in-memory collection and everything derived from it.
//!
//! The collection is a cache of server state. It is replaced wholesale by every successful
//! fetch and wiped by a failed one. Mutations follow one rule: anything that can change what the
//! filters or statistics see is followed by a full re-fetch; only purely cosmetic field edits are
//! patched into the cache.
//!
//! Fetches are single-flight and scoped to the model's [`CancellationToken`]. Once the model is
//! closed, completions are discarded instead of applied.

use crate::client::ResourceApi;
use crate::constants::{EMPTY_COLLECTION_MESSAGE, NO_MATCHES_MESSAGE};
use crate::filter::FilterSet;
use crate::notice::{sentence_case, Notice};
use crate::resource::Resource;
use crate::stats::{count_by, count_by_status, StatusCounts};
use crate::{OpsError, OpsResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// What a call to [`ListViewModel::refresh`] ended up doing.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The collection was replaced; holds the new record count.
    Loaded(usize),
    /// Another fetch was already in flight.
    Skipped,
    /// The model was closed before the fetch completed.
    Cancelled,
    /// The fetch failed and the collection was cleared.
    Failed(OpsError),
}

/// Which empty-state message a page shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyState {
    NoRecords,
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NoRecords => EMPTY_COLLECTION_MESSAGE,
            EmptyState::NoMatches => NO_MATCHES_MESSAGE,
        }
    }
}

struct ViewState<R> {
    records: Vec<R>,
    loading: bool,
    last_error: Option<String>,
    filters: FilterSet,
    notices: VecDeque<Notice>,
    fetched_at: Option<DateTime<Utc>>,
}

impl<R> Default for ViewState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            last_error: None,
            filters: FilterSet::default(),
            notices: VecDeque::new(),
            fetched_at: None,
        }
    }
}

pub struct ListViewModel<R: Resource, C> {
    client: C,
    state: RwLock<ViewState<R>>,
    in_flight: Mutex<()>,
    scope: CancellationToken,
    _resource: PhantomData<fn() -> R>,
}

impl<R, C> ListViewModel<R, C>
where
    R: Resource,
    C: ResourceApi<R>,
{
    /// A closed-over model with an empty collection. Nothing is fetched until [`Self::refresh`].
    pub fn new(client: C) -> Self {
        Self::with_scope(client, CancellationToken::new())
    }

    /// Like [`Self::new`], tied to `scope`: cancelling it closes the model.
    pub fn with_scope(client: C, scope: CancellationToken) -> Self {
        Self {
            client,
            state: RwLock::new(ViewState::default()),
            in_flight: Mutex::new(()),
            scope,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch the collection unless a fetch is already in flight.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("{} fetch already in flight", R::LABEL);
            return RefreshOutcome::Skipped;
        };
        self.fetch_locked().await
    }

    /// Fetch the collection, waiting for any in-flight fetch to finish first.
    ///
    /// Used after mutations, where the result of a fetch that started earlier may predate the
    /// change.
    pub async fn reload(&self) -> RefreshOutcome {
        let _guard = tokio::select! {
            guard = self.in_flight.lock() => guard,
            _ = self.scope.cancelled() => return RefreshOutcome::Cancelled,
        };
        self.fetch_locked().await
    }

    async fn fetch_locked(&self) -> RefreshOutcome {
        if self.scope.is_cancelled() {
            return RefreshOutcome::Cancelled;
        }

        self.write().loading = true;
        let result = tokio::select! {
            result = self.client.list() => result,
            _ = self.scope.cancelled() => {
                self.write().loading = false;
                return RefreshOutcome::Cancelled;
            }
        };

        let mut state = self.write();
        state.loading = false;
        if self.scope.is_cancelled() {
            return RefreshOutcome::Cancelled;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                tracing::debug!("loaded {} {} records", count, R::LABEL);
                state.records = records;
                state.last_error = None;
                state.fetched_at = Some(Utc::now());
                RefreshOutcome::Loaded(count)
            }
            Err(err) => {
                tracing::warn!("failed to fetch {} records: {}", R::LABEL, err);
                state.records.clear();
                state.last_error = Some(err.to_string());
                state
                    .notices
                    .push_back(Notice::from_error(&err, &format!("Failed to fetch {}s", R::LABEL)));
                RefreshOutcome::Failed(err)
            }
        }
    }

    /// Create a record from `payload`, then re-fetch.
    pub async fn create(&self, payload: &Value) -> OpsResult<R> {
        let result = self.scoped(self.client.create(payload)).await;
        let created = self.settle(result, &format!("Failed to create {}", R::LABEL))?;
        self.push_notice(Notice::success(format!("{} created", sentence_case(R::LABEL))));
        self.reload().await;
        Ok(created)
    }

    /// Update a record.
    ///
    /// The edit is patched into the cache when status, selector values and searchable fields
    /// are unchanged. Otherwise the collection is re-fetched.
    pub async fn update(&self, id: &str, payload: &Value) -> OpsResult<R> {
        let result = self.scoped(self.client.update(id, payload)).await;
        let updated = self.settle(result, &format!("Failed to update {}", R::LABEL))?;
        self.push_notice(Notice::success(format!("{} updated", sentence_case(R::LABEL))));

        let patched = {
            let mut state = self.write();
            match state.records.iter_mut().find(|r| r.id() == id) {
                Some(slot) if is_cosmetic_edit(slot, &updated) => {
                    *slot = updated.clone();
                    true
                }
                _ => false,
            }
        };
        if !patched {
            self.reload().await;
        }
        Ok(updated)
    }

    /// Delete a record, then re-fetch.
    pub async fn remove(&self, id: &str) -> OpsResult<()> {
        let result = self.scoped(self.client.remove(id)).await;
        self.settle(result, &format!("Failed to delete {}", R::LABEL))?;
        self.push_notice(Notice::success(format!("{} deleted", sentence_case(R::LABEL))));
        self.reload().await;
        Ok(())
    }

    /// Run `fut` inside the model's scope.
    pub(crate) async fn scoped<T>(&self, fut: impl Future<Output = OpsResult<T>>) -> OpsResult<T> {
        tokio::select! {
            result = fut => {
                if self.scope.is_cancelled() {
                    Err(OpsError::Cancelled)
                } else {
                    result
                }
            }
            _ = self.scope.cancelled() => Err(OpsError::Cancelled),
        }
    }

    /// Queue an error notice for a failed mutation and pass the result through.
    pub(crate) fn settle<T>(&self, result: OpsResult<T>, fallback: &str) -> OpsResult<T> {
        if let Err(err) = &result {
            if !matches!(err, OpsError::Cancelled) {
                tracing::warn!("{}: {}", fallback, err);
                self.push_notice(Notice::from_error(err, fallback));
            }
        }
        result
    }

    /// Stop the model: pending fetches are abandoned and later completions are dropped.
    pub fn close(&self) {
        self.scope.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_cancelled()
    }
}

impl<R: Resource, C> ListViewModel<R, C> {
    fn read(&self) -> RwLockReadGuard<'_, ViewState<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState<R>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the full collection.
    pub fn records(&self) -> Vec<R> {
        self.read().records.clone()
    }

    pub fn record(&self, id: &str) -> Option<R> {
        self.read().records.iter().find(|r| r.id() == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.read().fetched_at
    }

    pub fn filters(&self) -> FilterSet {
        self.read().filters.clone()
    }

    pub fn set_term(&self, term: impl Into<String>) {
        self.write().filters.set_term(term);
    }

    pub fn set_selector(&self, name: &str, value: &str) -> OpsResult<()> {
        self.write().filters.select::<R>(name, value)
    }

    pub fn reset_filters(&self) {
        self.write().filters.reset();
    }

    /// The collection narrowed by the current filters, recomputed on every call.
    pub fn filtered(&self) -> Vec<R> {
        let state = self.read();
        state.filters.apply(&state.records).into_iter().cloned().collect()
    }

    /// Per-status counts over the unfiltered collection.
    pub fn stats(&self) -> StatusCounts<R::Status> {
        count_by_status(&self.read().records)
    }

    pub fn count_by(&self, selector: &str) -> BTreeMap<String, usize> {
        count_by(&self.read().records, selector)
    }

    /// `None` while the filtered view has something to show.
    pub fn empty_state(&self) -> Option<EmptyState> {
        let state = self.read();
        if state.records.iter().any(|r| state.filters.matches(r)) {
            None
        } else if state.filters.is_active() {
            Some(EmptyState::NoMatches)
        } else {
            Some(EmptyState::NoRecords)
        }
    }

    pub fn push_notice(&self, notice: Notice) {
        self.write().notices.push_back(notice);
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.write().notices.drain(..).collect()
    }
}

/// An edit that cannot move the record between filter buckets or status counts.
fn is_cosmetic_edit<R: Resource>(before: &R, after: &R) -> bool {
    before.status() == after.status()
        && R::SELECTORS
            .iter()
            .all(|s| before.selector_value(s) == after.selector_value(s))
        && before.search_fields() == after.search_fields()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;
    use crate::resource::fixtures::{request, Request, RequestStatus};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn admissions() -> Vec<Request> {
        vec![
            request("AR-1", "John Carter", RequestStatus::Pending),
            request("AR-2", "Mary Shelley", RequestStatus::Pending),
            request("AR-3", "Grace Hopper", RequestStatus::Approved),
        ]
    }

    #[tokio::test]
    async fn refresh_loads_filters_and_counts() {
        let model = ListViewModel::new(FakeApi::with_records(admissions()));
        assert!(matches!(model.refresh().await, RefreshOutcome::Loaded(3)));
        assert!(!model.is_loading());
        assert!(model.fetched_at().is_some());

        model.set_selector("status", "pending").expect("select");
        assert_eq!(model.filtered().len(), 2);

        let stats = model.stats();
        assert_eq!(stats.get(RequestStatus::Pending), 2);
        assert_eq!(stats.get(RequestStatus::Approved), 1);
        assert_eq!(stats.get(RequestStatus::Rejected), 0);
        assert_eq!(stats.get(RequestStatus::Cancelled), 0);
    }

    #[tokio::test]
    async fn failed_fetch_wipes_collection_and_picks_empty_state() {
        let api = FakeApi::with_records(admissions());
        let model = ListViewModel::new(api);
        model.refresh().await;
        assert_eq!(model.records().len(), 3);

        model.client().fail_list.store(true, Ordering::SeqCst);
        assert!(matches!(model.refresh().await, RefreshOutcome::Failed(_)));

        assert!(model.records().is_empty());
        assert!(!model.is_loading());
        assert!(model.last_error().is_some());
        assert_eq!(model.empty_state(), Some(EmptyState::NoRecords));
        assert_eq!(model.empty_state().map(EmptyState::message), Some("No records submitted yet"));

        model.set_term("john");
        assert_eq!(model.empty_state(), Some(EmptyState::NoMatches));
        assert_eq!(model.empty_state().map(EmptyState::message), Some("No records match filters"));

        let notices = model.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Failed to fetch requests");
    }

    #[tokio::test]
    async fn empty_state_is_none_while_records_match() {
        let model = ListViewModel::new(FakeApi::with_records(admissions()));
        model.refresh().await;
        assert_eq!(model.empty_state(), None);

        model.set_term("nobody by that name");
        assert_eq!(model.empty_state(), Some(EmptyState::NoMatches));
        model.reset_filters();
        assert_eq!(model.empty_state(), None);
    }

    #[tokio::test]
    async fn refresh_is_single_flight() {
        let (api, gate) = FakeApi::gated(admissions());
        let entered = Arc::clone(&api.entered);
        let model = Arc::new(ListViewModel::new(api));

        let first = tokio::spawn({
            let model = Arc::clone(&model);
            async move { model.refresh().await }
        });
        entered.notified().await;

        assert!(model.is_loading());
        assert!(matches!(model.refresh().await, RefreshOutcome::Skipped));

        gate.add_permits(1);
        let outcome = first.await.expect("join");
        assert!(matches!(outcome, RefreshOutcome::Loaded(3)));
        assert_eq!(model.client().list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completion_after_close_is_discarded() {
        let (api, gate) = FakeApi::gated(admissions());
        let entered = Arc::clone(&api.entered);
        let model = Arc::new(ListViewModel::new(api));

        let pending = tokio::spawn({
            let model = Arc::clone(&model);
            async move { model.refresh().await }
        });
        entered.notified().await;
        model.close();
        gate.add_permits(1);

        assert!(matches!(pending.await.expect("join"), RefreshOutcome::Cancelled));
        assert!(model.records().is_empty());
        assert!(model.take_notices().is_empty());
        assert!(matches!(model.refresh().await, RefreshOutcome::Cancelled));
    }

    #[tokio::test]
    async fn create_and_remove_refetch() {
        let model = ListViewModel::new(FakeApi::with_records(admissions()));
        model.refresh().await;

        let created = model
            .create(&json!({"patientName": "Alan Turing", "diagnosis": "cough", "urgency": "low"}))
            .await
            .expect("create");
        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(model.records().len(), 4);
        assert_eq!(model.client().list_calls.load(Ordering::SeqCst), 2);

        model.remove(&created.id).await.expect("remove");
        assert_eq!(model.records().len(), 3);
        assert_eq!(model.client().list_calls.load(Ordering::SeqCst), 3);

        let notices = model.take_notices();
        assert_eq!(notices[0].message, "Request created");
        assert_eq!(notices[1].message, "Request deleted");
    }

    #[tokio::test]
    async fn cosmetic_update_is_patched_locally() {
        let model = ListViewModel::new(FakeApi::with_records(admissions()));
        model.refresh().await;

        // review notes are neither searchable nor a selector
        let updated = model
            .update("AR-1", &json!({"reviewNotes": "bed 4 ready"}))
            .await
            .expect("update");
        assert_eq!(updated.review_notes.as_deref(), Some("bed 4 ready"));
        assert_eq!(model.client().list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            model.record("AR-1").and_then(|r| r.review_notes),
            Some("bed 4 ready".to_string())
        );
    }

    #[tokio::test]
    async fn update_touching_filters_refetches() {
        let model = ListViewModel::new(FakeApi::with_records(admissions()));
        model.refresh().await;

        model
            .update("AR-1", &json!({"urgency": "critical"}))
            .await
            .expect("update");
        assert_eq!(model.client().list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(model.count_by("urgency").get("critical"), Some(&1));
    }

    #[tokio::test]
    async fn failed_mutation_queues_server_message() {
        let model = ListViewModel::new(FakeApi::with_records(admissions()));
        model.refresh().await;

        let err = model.remove("AR-404").await.expect_err("missing record");
        assert!(matches!(err, OpsError::Rejected { status: Some(404), .. }));
        let notices = model.take_notices();
        assert!(notices[0].is_error());
        assert_eq!(notices[0].message, "Request not found");
    }
}
