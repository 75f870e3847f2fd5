//! The account search controller
//!
//! Owns the filter selection, the type picker options, the last record
//! snapshot and the notification queue. Remote calls run on spawned tasks
//! and come back as [`Completion`] messages; the owner of the controller
//! feeds them to [`AccountSearch::apply`] from its event loop, so all state
//! is mutated from one place.
//!
//! Overlapping record fetches are not cancelled. Under
//! `FetchOrdering::CompletionOrder` the response that arrives last is the
//! one displayed, whichever request it answers.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::catalog::{build_options, denormalize, CategoryOption};
use super::commit::{build_updates, commit_batch, CommitOutcome};
use super::loader::{FetchApplied, RecordLoader, RecordQuery};
use super::notify::{Toast, Toasts};
use crate::config::ControllerSettings;
use crate::errors::{ControllerError, SourceError};
use crate::models::{DraftEdit, RecordRow, RecordSnapshot};
use crate::source::RecordSource;

/// Result of a remote call, delivered back to the controller
#[derive(Debug)]
pub enum Completion {
    Catalog(Result<Vec<String>, SourceError>),
    Records {
        query: RecordQuery,
        result: Result<Vec<RecordRow>, SourceError>,
    },
    Commit(CommitOutcome),
}

/// State changes produced by applying a completion
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    CatalogLoaded(usize),
    CatalogFailed(String),
    RecordsLoaded(usize),
    RecordsFailed(String),
    RecordsDiscarded,
    CommitSucceeded(usize),
    CommitFailed(String),
}

/// Currently selected type, in display form. Empty means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub selected_label: String,
}

pub struct AccountSearch<S: RecordSource> {
    source: Arc<S>,
    filter: FilterState,
    mounted: bool,

    type_options: Option<Vec<CategoryOption>>,
    catalog_error: Option<ControllerError>,

    records: RecordLoader,

    saving: usize,
    last_commit: Option<CommitOutcome>,
    toasts: Toasts,

    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: RecordSource> AccountSearch<S> {
    pub fn new(source: Arc<S>, settings: ControllerSettings) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            source,
            filter: FilterState::default(),
            mounted: false,
            type_options: None,
            catalog_error: None,
            records: RecordLoader::new(settings.fetch_ordering),
            saving: 0,
            last_commit: None,
            toasts: Toasts::new(settings.toast_history),
            in_flight: 0,
            completions_tx,
            completions_rx,
        }
    }

    /// Start the catalog fetch and the first record fetch for the current filter.
    /// Calling it again has no effect.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        info!("Mounting account search (filter '{}')", self.filter.selected_label);

        let source = Arc::clone(&self.source);
        self.spawn(
            async move { source.list_categories().await },
            Completion::Catalog,
        );

        let filter = self.filter.selected_label.clone();
        self.fetch_records(&filter);
    }

    /// Handle a value emitted by the type picker: an option key, or empty for all types
    pub fn select_type(&mut self, value: &str) -> bool {
        self.set_selected_label(denormalize(value))
    }

    /// Assign the filter label. A fetch is issued only when the label changes
    /// and the controller is mounted; returns whether one was issued.
    pub fn set_selected_label(&mut self, label: String) -> bool {
        if label == self.filter.selected_label {
            return false;
        }
        debug!("Filter changed from '{}' to '{}'", self.filter.selected_label, label);
        self.filter.selected_label = label;

        if !self.mounted {
            return false;
        }
        let filter = self.filter.selected_label.clone();
        self.fetch_records(&filter);
        true
    }

    /// Re-run the last record query with its original filter
    pub fn refresh(&mut self) -> bool {
        match self.records.reissue() {
            Some(query) => {
                info!("Refreshing accounts for '{}'", query.filter);
                self.spawn_records(query);
                true
            }
            None => false,
        }
    }

    /// Submit grid drafts as one concurrent batch
    pub fn save(&mut self, drafts: Vec<DraftEdit>) {
        let updates = build_updates(drafts);
        let count = updates.len();
        info!("Saving {} record update(s)", count);

        self.saving += 1;
        let source = Arc::clone(&self.source);
        self.spawn(
            async move { Ok::<_, SourceError>(commit_batch(source.as_ref(), &updates).await) },
            move |result| {
                Completion::Commit(result.unwrap_or_else(|e| CommitOutcome::SomeFailed {
                    first_error: e,
                    failed: count,
                    succeeded: 0,
                }))
            },
        )
    }

    /// Apply one completion to the controller state
    pub fn apply(&mut self, completion: Completion) -> SearchEvent {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Catalog(Ok(categories)) => {
                info!("Loaded {} account types", categories.len());
                self.type_options = Some(build_options(&categories));
                self.catalog_error = None;
                SearchEvent::CatalogLoaded(categories.len())
            }
            Completion::Catalog(Err(e)) => {
                warn!("Account type fetch failed: {}", e);
                let message = e.message();
                self.type_options = None;
                self.catalog_error = Some(ControllerError::CatalogLoad(e));
                SearchEvent::CatalogFailed(message)
            }
            Completion::Records { query, result } => {
                let message = result.as_ref().err().map(SourceError::message);
                match self.records.complete(&query, result) {
                    FetchApplied::Updated => SearchEvent::RecordsLoaded(self.records.rows().len()),
                    FetchApplied::Failed => SearchEvent::RecordsFailed(message.unwrap_or_default()),
                    FetchApplied::Discarded => SearchEvent::RecordsDiscarded,
                }
            }
            Completion::Commit(outcome) => {
                self.saving = self.saving.saturating_sub(1);
                let event = match &outcome {
                    CommitOutcome::AllSucceeded { count } => {
                        info!("All {} record update(s) succeeded", count);
                        self.toasts.push(Toast::update_success());
                        self.refresh();
                        SearchEvent::CommitSucceeded(*count)
                    }
                    CommitOutcome::SomeFailed {
                        first_error,
                        failed,
                        succeeded,
                    } => {
                        warn!(
                            "{} record update(s) failed, {} applied without rollback: {}",
                            failed, succeeded, first_error
                        );
                        let message = first_error.message();
                        self.toasts.push(Toast::update_error(message.clone()));
                        SearchEvent::CommitFailed(message)
                    }
                };
                self.last_commit = Some(outcome);
                event
            }
        }
    }

    /// Wait for the next completion. Returns `None` when nothing is outstanding.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        self.completions_rx.recv().await
    }

    /// Apply every completion that has already arrived
    pub fn pump(&mut self) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            events.push(self.apply(completion));
        }
        events
    }

    /// Apply completions until no remote call is outstanding,
    /// including refreshes triggered along the way
    pub async fn settle(&mut self) -> Vec<SearchEvent> {
        let mut events = Vec::new();
        while let Some(completion) = self.next_completion().await {
            events.push(self.apply(completion));
        }
        events
    }

    fn fetch_records(&mut self, filter: &str) {
        let query = self.records.issue(filter);
        self.spawn_records(query);
    }

    fn spawn_records(&mut self, query: RecordQuery) {
        debug!("Fetching accounts for '{}' (request {})", query.filter, query.seq);
        let source = Arc::clone(&self.source);
        let filter = query.filter.clone();
        self.spawn(
            async move { source.list_records(&filter).await },
            move |result| Completion::Records { query, result },
        );
    }

    /// Run `work` on its own task and send the wrapped result back.
    /// A panicking task is reported as `SourceError::Task`.
    fn spawn<T, F, W>(&mut self, work: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, SourceError>> + Send + 'static,
        W: FnOnce(Result<T, SourceError>) -> Completion + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(work).await {
                Ok(result) => result,
                Err(e) => Err(SourceError::from(e)),
            };
            // The receiver lives as long as the controller
            let _ = tx.send(wrap(result));
        });
    }

    // Accessors

    pub fn selected_label(&self) -> &str {
        &self.filter.selected_label
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn type_options(&self) -> Option<&[CategoryOption]> {
        self.type_options.as_deref()
    }

    pub fn catalog_error(&self) -> Option<&ControllerError> {
        self.catalog_error.as_ref()
    }

    pub fn record_error(&self) -> Option<&ControllerError> {
        self.records.error()
    }

    pub fn rows(&self) -> &[RecordRow] {
        self.records.rows()
    }

    pub fn snapshot(&self) -> Option<&RecordSnapshot> {
        self.records.snapshot()
    }

    pub fn last_query(&self) -> Option<&RecordQuery> {
        self.records.last_query()
    }

    /// True from the moment a record fetch is issued until all record fetches settle
    pub fn is_loading(&self) -> bool {
        self.records.is_loading()
    }

    pub fn is_saving(&self) -> bool {
        self.saving > 0
    }

    pub fn last_commit(&self) -> Option<&CommitOutcome> {
        self.last_commit.as_ref()
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchOrdering;
    use crate::models::{Field, RecordId};
    use crate::search::notify::ToastVariant;
    use crate::source::testing::ScriptedSource;

    fn accounts() -> Vec<RecordRow> {
        vec![
            RecordRow::new("001", "Burlington Textiles", Some("Customer - Direct")),
            RecordRow::new("002", "Edge Communications", Some("Customer - Direct")),
            RecordRow::new("003", "GenePoint", Some("Customer - Channel")),
        ]
    }

    fn controller(source: ScriptedSource) -> (Arc<ScriptedSource>, AccountSearch<ScriptedSource>) {
        let source = Arc::new(source);
        let search = AccountSearch::new(Arc::clone(&source), ControllerSettings::default());
        (source, search)
    }

    fn rename(id: &str, name: &str) -> DraftEdit {
        DraftEdit::new(RecordId::new(id)).with_field(Field::Name, name)
    }

    #[tokio::test]
    async fn test_mount_loads_catalog_and_all_records() {
        let (source, mut search) = controller(ScriptedSource::new(
            &["Customer - Channel", "Customer - Direct"],
            accounts(),
        ));

        search.mount();
        assert!(search.is_loading());
        search.settle().await;

        let options = search.type_options().unwrap();
        assert_eq!(options[0], CategoryOption::all());
        assert_eq!(options[1].value, "Customer_-_Channel");
        assert_eq!(search.rows().len(), 3);
        assert!(!search.is_loading());
        assert_eq!(*source.record_calls.lock().unwrap(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_mount_twice_is_noop() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.mount();
        search.settle().await;
        assert_eq!(source.record_call_count(), 1);
        assert_eq!(source.category_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_selecting_type_denormalizes_and_fetches() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.settle().await;

        assert!(search.select_type("Customer_-_Direct"));
        assert_eq!(search.selected_label(), "Customer - Direct");
        search.settle().await;

        assert_eq!(search.rows().len(), 2);
        assert_eq!(
            source.record_calls.lock().unwrap().last().map(String::as_str),
            Some("Customer - Direct")
        );
    }

    #[tokio::test]
    async fn test_selecting_all_fetches_with_empty_filter() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.select_type("Customer_-_Channel");
        search.settle().await;

        assert!(search.select_type(""));
        search.settle().await;

        assert_eq!(source.record_calls.lock().unwrap().last().map(String::as_str), Some(""));
        assert_eq!(search.rows().len(), 3);
    }

    #[tokio::test]
    async fn test_same_selection_does_not_refetch() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.select_type("Customer_-_Channel");
        search.settle().await;

        assert!(!search.select_type("Customer_-_Channel"));
        assert!(search.next_completion().await.is_none());
        assert_eq!(source.record_call_count(), 2);
    }

    #[tokio::test]
    async fn test_selection_before_mount_is_used_by_first_fetch() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        assert!(!search.select_type("Customer_-_Channel"));
        assert_eq!(source.record_call_count(), 0);

        search.mount();
        search.settle().await;
        assert_eq!(
            *source.record_calls.lock().unwrap(),
            vec!["Customer - Channel".to_string()]
        );
    }

    #[tokio::test]
    async fn test_successful_commit_toasts_once_and_refreshes_once() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.select_type("Customer_-_Direct");
        search.settle().await;
        let calls_before = source.record_call_count();

        search.save(vec![
            rename("001", "Burlington Textiles Corp"),
            rename("002", "Edge Comms"),
        ]);
        assert!(search.is_saving());
        let events = search.settle().await;

        assert_eq!(events[0], SearchEvent::CommitSucceeded(2));
        assert_eq!(source.record_call_count(), calls_before + 1);
        assert_eq!(
            source.record_calls.lock().unwrap().last().map(String::as_str),
            Some("Customer - Direct")
        );

        let toasts = search.drain_toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].variant, ToastVariant::Success);
        assert_eq!(toasts[0].message, "Record Updates Succeeded!");

        let names: Vec<_> = search.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Burlington Textiles Corp", "Edge Comms"]);
        assert!(!search.is_saving());
    }

    #[tokio::test]
    async fn test_failed_commit_reports_failing_update_without_refresh() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()).fail_update(
            "002",
            SourceError::Rejected("Account name already in use".into()),
        ));
        search.mount();
        search.settle().await;
        let snapshot_before = search.rows().to_vec();
        let calls_before = source.record_call_count();

        search.save(vec![
            rename("001", "Burlington"),
            rename("002", "Edge"),
            rename("003", "GenePoint Inc"),
        ]);
        let events = search.settle().await;

        assert_eq!(
            events,
            vec![SearchEvent::CommitFailed("Account name already in use".into())]
        );
        assert_eq!(source.record_call_count(), calls_before);
        assert_eq!(search.rows(), snapshot_before.as_slice());

        let toasts = search.drain_toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "Error");
        assert_eq!(toasts[0].message, "Account name already in use");

        // successful writes in the batch stay applied at the source
        assert_eq!(source.rows()[0].name, "Burlington");
        assert_eq!(source.rows()[2].name, "GenePoint Inc");
    }

    #[tokio::test]
    async fn test_last_response_wins_under_completion_order() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.settle().await;

        let gate_a = source.gate("A");
        let gate_b = source.gate("B");
        search.set_selected_label("A".into());
        search.set_selected_label("B".into());

        gate_b.send(Ok(vec![RecordRow::new("b1", "Bravo", Some("B"))])).unwrap();
        let completion = search.next_completion().await.unwrap();
        search.apply(completion);
        assert_eq!(search.rows()[0].name, "Bravo");
        assert!(search.is_loading());

        gate_a.send(Ok(vec![RecordRow::new("a1", "Alpha", Some("A"))])).unwrap();
        let completion = search.next_completion().await.unwrap();
        assert_eq!(search.apply(completion), SearchEvent::RecordsLoaded(1));

        // the selection says B but the grid shows A's rows
        assert_eq!(search.selected_label(), "B");
        assert_eq!(search.rows()[0].name, "Alpha");
        assert!(!search.is_loading());
    }

    #[tokio::test]
    async fn test_latest_request_ordering_drops_superseded_response() {
        let source = Arc::new(ScriptedSource::new(&[], accounts()));
        let settings = ControllerSettings {
            fetch_ordering: FetchOrdering::LatestRequest,
            ..ControllerSettings::default()
        };
        let mut search = AccountSearch::new(Arc::clone(&source), settings);
        search.mount();
        search.settle().await;

        let gate_a = source.gate("A");
        let gate_b = source.gate("B");
        search.set_selected_label("A".into());
        search.set_selected_label("B".into());

        gate_b.send(Ok(vec![RecordRow::new("b1", "Bravo", Some("B"))])).unwrap();
        let completion = search.next_completion().await.unwrap();
        search.apply(completion);

        gate_a.send(Ok(vec![RecordRow::new("a1", "Alpha", Some("A"))])).unwrap();
        let completion = search.next_completion().await.unwrap();
        assert_eq!(search.apply(completion), SearchEvent::RecordsDiscarded);

        assert_eq!(search.rows()[0].name, "Bravo");
        assert!(!search.is_loading());
    }

    #[tokio::test]
    async fn test_catalog_failure_leaves_record_path_working() {
        let (_source, mut search) = controller(
            ScriptedSource::new(&[], accounts())
                .with_catalog_error(SourceError::Database("no such table".into())),
        );
        search.mount();
        let events = search.settle().await;

        assert!(events.contains(&SearchEvent::CatalogFailed("Database error: no such table".into())));
        assert!(search.type_options().is_none());
        assert!(matches!(search.catalog_error(), Some(ControllerError::CatalogLoad(_))));
        assert_eq!(search.rows().len(), 3);

        search.select_type("Customer_-_Channel");
        search.settle().await;
        assert_eq!(search.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_record_failure_keeps_previous_rows() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        search.mount();
        search.settle().await;

        let gate = source.gate("Prospect");
        search.set_selected_label("Prospect".into());
        gate.send(Err(SourceError::Database("database is locked".into()))).unwrap();
        let events = search.settle().await;

        assert_eq!(events, vec![SearchEvent::RecordsFailed("Database error: database is locked".into())]);
        assert_eq!(search.rows().len(), 3);
        assert!(search.record_error().is_some());
    }

    #[tokio::test]
    async fn test_refresh_before_mount_does_nothing() {
        let (source, mut search) = controller(ScriptedSource::new(&[], accounts()));
        assert!(!search.refresh());
        assert!(search.next_completion().await.is_none());
        assert_eq!(source.record_call_count(), 0);
    }
}
