//! The note store: raw documents, user configuration and the derived view.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::loader::DocumentLoader;
use crate::models::{DocRef, Document, FilterPatch, FilterSpec, SortDirection, SortSpec};
use crate::persist::{self, PersistedSnapshot};
use crate::pin::{self, PinSet};
use crate::pipeline::{available_folders, available_tags, recompute};
use crate::report::{ErrorReporter, TracingReporter};
use crate::retry::{load_with_retry, RetryPolicy};

/// Every field a consumer can observe.
///
/// Each mutation replaces the affected field with a new value, so
/// `Arc::ptr_eq` on a slice tells whether it changed.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub documents: Arc<Vec<DocRef>>,
    pub pinned: Arc<PinSet>,
    pub filters: Arc<FilterSpec>,
    pub sort: SortSpec,
    pub is_loading: bool,
    pub error: Option<String>,
    pub view: Arc<Vec<DocRef>>,
    pub available_tags: Arc<Vec<String>>,
    pub available_folders: Arc<Vec<String>>,
    /// Incremented on every mutation.
    pub version: u64,
}

impl StoreState {
    /// Startup defaults.
    pub fn initial(sort: SortSpec) -> Self {
        Self {
            documents: Arc::default(),
            pinned: Arc::default(),
            filters: Arc::default(),
            sort,
            is_loading: false,
            error: None,
            view: Arc::default(),
            available_tags: Arc::default(),
            available_folders: Arc::default(),
            version: 0,
        }
    }
}

/// Change notification published after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A reload started.
    LoadStarted,
    /// A reload replaced the raw documents.
    DocumentsReplaced { count: usize },
    /// A reload failed; documents are unchanged.
    LoadFailed { message: String },
    FiltersChanged,
    SortChanged,
    PinsChanged,
    ErrorChanged,
    /// Pins and filters were restored from a snapshot.
    Hydrated,
    Reset,
}

impl StoreEvent {
    /// Whether the persisted snapshot may differ after this event.
    pub fn affects_snapshot(&self) -> bool {
        matches!(
            self,
            Self::FiltersChanged | Self::SortChanged | Self::PinsChanged
        )
    }
}

/// Result of [`NoteStore::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Documents were replaced with this many new ones.
    Loaded(usize),
    /// The reload failed; the message was stored in `error`.
    Failed(String),
}

impl RefreshOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

struct Guarded {
    state: StoreState,
    refreshes_in_flight: usize,
}

struct Inner {
    guarded: RwLock<Guarded>,
    loader: Arc<dyn DocumentLoader>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
    default_sort: SortSpec,
    events: broadcast::Sender<StoreEvent>,
}

/// Builder for [`NoteStore`].
pub struct NoteStoreBuilder {
    loader: Arc<dyn DocumentLoader>,
    reporter: Arc<dyn ErrorReporter>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
    default_sort: SortSpec,
    event_capacity: usize,
}

impl NoteStoreBuilder {
    /// Set the error reporter.
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the clock used for date filters.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the reload retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the startup sort.
    pub fn default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = sort;
        self
    }

    /// Apply sort and retry settings from configuration.
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.default_sort = config.default_sort();
        self.policy = config.retry.policy();
        self
    }

    /// Set the event channel capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> NoteStore {
        let (events, _) = broadcast::channel(self.event_capacity);
        NoteStore {
            inner: Arc::new(Inner {
                guarded: RwLock::new(Guarded {
                    state: StoreState::initial(self.default_sort.clone()),
                    refreshes_in_flight: 0,
                }),
                loader: self.loader,
                reporter: self.reporter,
                clock: self.clock,
                policy: self.policy,
                default_sort: self.default_sort,
                events,
            }),
        }
    }
}

/// Handle to a note store. Clones share the same state.
#[derive(Clone)]
pub struct NoteStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guarded = self.inner.guarded.read();
        f.debug_struct("NoteStore")
            .field("documents", &guarded.state.documents.len())
            .field("view", &guarded.state.view.len())
            .field("version", &guarded.state.version)
            .finish()
    }
}

impl NoteStore {
    /// Start building a store around `loader`.
    pub fn builder(loader: Arc<dyn DocumentLoader>) -> NoteStoreBuilder {
        NoteStoreBuilder {
            loader,
            reporter: Arc::new(TracingReporter),
            clock: Arc::new(SystemClock),
            policy: RetryPolicy::default(),
            default_sort: SortSpec::default(),
            event_capacity: 64,
        }
    }

    /// Create a store configured from `config`.
    pub fn new(loader: Arc<dyn DocumentLoader>, config: &EngineConfig) -> Self {
        Self::builder(loader).config(config).build()
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Clone of the whole observable state.
    pub fn state(&self) -> StoreState {
        self.inner.guarded.read().state.clone()
    }

    pub fn documents(&self) -> Arc<Vec<DocRef>> {
        self.inner.guarded.read().state.documents.clone()
    }

    /// The filtered, sorted, pin-ordered list.
    pub fn view(&self) -> Arc<Vec<DocRef>> {
        self.inner.guarded.read().state.view.clone()
    }

    pub fn available_tags(&self) -> Arc<Vec<String>> {
        self.inner.guarded.read().state.available_tags.clone()
    }

    pub fn available_folders(&self) -> Arc<Vec<String>> {
        self.inner.guarded.read().state.available_folders.clone()
    }

    pub fn pinned(&self) -> Arc<PinSet> {
        self.inner.guarded.read().state.pinned.clone()
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.inner.guarded.read().state.pinned.contains(id)
    }

    pub fn filters(&self) -> Arc<FilterSpec> {
        self.inner.guarded.read().state.filters.clone()
    }

    pub fn sort(&self) -> SortSpec {
        self.inner.guarded.read().state.sort.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.guarded.read().state.is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.guarded.read().state.error.clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.guarded.read().state.version
    }

    /// Current persisted subset of state.
    pub fn persisted_snapshot(&self) -> PersistedSnapshot {
        persist::dehydrate(&self.inner.guarded.read().state)
    }

    /// Shallow-merge `patch` into the current filters.
    pub fn set_filters(&self, patch: FilterPatch) {
        self.mutate(StoreEvent::FiltersChanged, true, |state| {
            state.filters = Arc::new(state.filters.merge(patch));
        });
    }

    /// Reset filters to the match-everything default.
    pub fn clear_filters(&self) {
        self.mutate(StoreEvent::FiltersChanged, true, |state| {
            state.filters = Arc::new(FilterSpec::default());
        });
    }

    /// Sort by `key`, resetting direction to the configured default.
    pub fn set_sort_key(&self, key: impl Into<String>) {
        let direction = self.inner.default_sort.direction;
        let key = key.into();
        self.mutate(StoreEvent::SortChanged, true, |state| {
            state.sort = SortSpec::new(key, direction);
        });
    }

    pub fn set_sort_direction(&self, direction: SortDirection) {
        self.mutate(StoreEvent::SortChanged, true, |state| {
            state.sort = SortSpec::new(state.sort.key.clone(), direction);
        });
    }

    pub fn toggle_sort_direction(&self) {
        self.mutate(StoreEvent::SortChanged, true, |state| {
            state.sort = SortSpec::new(state.sort.key.clone(), state.sort.direction.toggle());
        });
    }

    /// Flip whether `id` is pinned. Returns the new membership.
    pub fn toggle_pin(&self, id: &str) -> bool {
        let mut now_pinned = false;
        self.mutate(StoreEvent::PinsChanged, true, |state| {
            let next = pin::toggled(&state.pinned, id);
            now_pinned = next.contains(id);
            state.pinned = Arc::new(next);
        });
        now_pinned
    }

    /// Set or clear the user-visible error.
    pub fn set_error(&self, error: Option<String>) {
        self.mutate(StoreEvent::ErrorChanged, false, |state| {
            state.error = error;
        });
    }

    /// Restore startup defaults.
    pub fn reset(&self) {
        let sort = self.inner.default_sort.clone();
        {
            let mut guarded = self.inner.guarded.write();
            let version = guarded.state.version + 1;
            guarded.state = StoreState::initial(sort);
            guarded.state.version = version;
            guarded.refreshes_in_flight = 0;
        }
        self.publish(StoreEvent::Reset);
    }

    /// Apply a persisted snapshot and recompute against the loaded documents.
    pub fn hydrate(&self, snapshot: Option<&PersistedSnapshot>) {
        let hydrated = persist::hydrate(snapshot, &self.inner.default_sort);
        self.mutate(StoreEvent::Hydrated, true, |state| {
            state.pinned = Arc::new(hydrated.pinned);
            state.filters = Arc::new(hydrated.filters);
            state.sort = hydrated.sort;
        });
    }

    /// Reload documents through the loader with retries.
    ///
    /// Never fails outward: a terminal failure is stored in `error` and the
    /// previous documents and view are kept.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.begin_refresh();

        match load_with_retry(self.inner.loader.as_ref(), &self.inner.policy).await {
            Ok(documents) => {
                let count = documents.len();
                self.commit_documents(documents);
                tracing::info!(count, "notes loaded");
                RefreshOutcome::Loaded(count)
            }
            Err(err) => {
                let message = self.inner.reporter.report(&err);
                self.fail_refresh(message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    fn begin_refresh(&self) {
        {
            let mut guarded = self.inner.guarded.write();
            guarded.refreshes_in_flight += 1;
            guarded.state.is_loading = true;
            guarded.state.version += 1;
        }
        self.publish(StoreEvent::LoadStarted);
    }

    fn commit_documents(&self, documents: Vec<Document>) {
        let documents: Vec<DocRef> = documents.into_iter().map(Arc::new).collect();
        let count = documents.len();
        let now = self.inner.clock.now();
        {
            let mut guarded = self.inner.guarded.write();
            guarded.refreshes_in_flight = guarded.refreshes_in_flight.saturating_sub(1);
            let still_loading = guarded.refreshes_in_flight > 0;

            // Filters, sort and pins are read here, at commit time.
            let state = &mut guarded.state;
            state.available_tags = Arc::new(available_tags(&documents));
            state.available_folders = Arc::new(available_folders(&documents));
            state.view = Arc::new(recompute(
                &documents,
                &state.filters,
                &state.sort,
                &state.pinned,
                now,
            ));
            state.documents = Arc::new(documents);
            state.error = None;
            state.is_loading = still_loading;
            state.version += 1;
        }
        self.publish(StoreEvent::DocumentsReplaced { count });
    }

    fn fail_refresh(&self, message: String) {
        {
            let mut guarded = self.inner.guarded.write();
            guarded.refreshes_in_flight = guarded.refreshes_in_flight.saturating_sub(1);
            guarded.state.is_loading = guarded.refreshes_in_flight > 0;
            guarded.state.error = Some(message.clone());
            guarded.state.version += 1;
        }
        self.publish(StoreEvent::LoadFailed { message });
    }

    fn mutate(&self, event: StoreEvent, recompute_view: bool, f: impl FnOnce(&mut StoreState)) {
        let now = self.inner.clock.now();
        {
            let mut guarded = self.inner.guarded.write();
            let state = &mut guarded.state;
            f(state);
            if recompute_view {
                state.view = Arc::new(recompute(
                    &state.documents,
                    &state.filters,
                    &state.sort,
                    &state.pinned,
                    now,
                ));
            }
            state.version += 1;
        }
        self.publish(event);
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}
