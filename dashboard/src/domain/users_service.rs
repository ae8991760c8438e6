//! Fetch orchestration and mutation coordination for the user list.
//!
//! [`UserListService`] owns the query state, the record store and the
//! published page. Every view intent lands here: it decides whether the
//! directory must be called, which loading indicator the view should show
//! while the call is in flight, and how the response or mutation is merged
//! back into the visible page.
//!
//! Overlapping fetches are serialised by outcome, not by execution: every
//! fetch is stamped with a monotonically increasing generation and only
//! the newest generation may publish. A slow response from a superseded
//! fetch is discarded, so the page can never travel backwards in time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use paging::{Page, clamped_page};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{ConsoleConfig, FetchMode};

use super::debounce::Debouncer;
use super::ports::{DirectoryError, UserDirectory};
use super::query::{self, QueryState};
use super::store::{RecordStore, StoreError};
use super::strategy::{BackendSearchStrategy, LocalCacheStrategy, QueryStrategy};
use super::user::{UserDraft, UserId, UserPatch, UserRecord};

/// Loading indicator class the view should render.
///
/// Exactly one class is active at a time; the spinner and the full
/// skeleton never overlap for the same fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadIndicator {
    /// No loading cue; the current page is authoritative.
    #[default]
    None,
    /// Lightweight cue for minor transitions such as a page change.
    Spinner,
    /// Placeholder standing in for the whole list during major changes.
    FullSkeleton,
}

/// Errors surfaced by the mutation surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The mutation target does not exist; nothing was changed.
    #[error("no record with id {id}")]
    NotFound {
        /// Identifier the caller asked for.
        id: UserId,
    },
    /// The directory call behind the mutation failed.
    #[error(transparent)]
    Remote(#[from] DirectoryError),
}

impl From<StoreError> for MutationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => Self::NotFound { id },
        }
    }
}

/// View-facing snapshot of the list state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    page: Page<UserRecord>,
    indicator: LoadIndicator,
    last_error: Option<DirectoryError>,
}

impl ListSnapshot {
    /// The current visible page.
    pub fn page(&self) -> &Page<UserRecord> {
        &self.page
    }

    /// The loading indicator the view should render.
    pub fn indicator(&self) -> LoadIndicator {
        self.indicator
    }

    /// The most recent unrecovered directory error, if any.
    pub fn last_error(&self) -> Option<&DirectoryError> {
        self.last_error.as_ref()
    }
}

/// How the page number is repositioned after a refresh settles.
#[derive(Debug, Clone, Copy)]
enum PageRule {
    /// Leave the page number where the intent put it.
    Keep,
    /// Clamp to the last non-empty page, minimum 1.
    Clamp,
}

struct ListState {
    store: RecordStore,
    query: QueryState,
    page: Page<UserRecord>,
    indicator: LoadIndicator,
    last_error: Option<DirectoryError>,
}

impl ListState {
    fn new(config: &ConsoleConfig) -> Self {
        let query = QueryState::new(config.page_size());
        let page = Page::empty(query.page_request());
        Self {
            store: RecordStore::new(),
            query,
            page,
            // The view starts on the skeleton until the initial load settles.
            indicator: LoadIndicator::FullSkeleton,
            last_error: None,
        }
    }
}

/// Orchestrates fetching, filtering, pagination and mutations for the
/// user list.
///
/// Cheap to clone; clones share the same state, so the debounced intents
/// can hop onto spawned timer tasks.
#[derive(Clone)]
pub struct UserListService {
    directory: Arc<dyn UserDirectory>,
    strategy: Arc<dyn QueryStrategy>,
    config: Arc<ConsoleConfig>,
    state: Arc<Mutex<ListState>>,
    generation: Arc<AtomicU64>,
    search_debounce: Arc<Debouncer>,
    age_debounce: Arc<Debouncer>,
}

impl UserListService {
    /// Build a service for the deployment mode named in `config`.
    pub fn new(directory: Arc<dyn UserDirectory>, config: ConsoleConfig) -> Self {
        let strategy: Arc<dyn QueryStrategy> = match config.mode() {
            FetchMode::LocalCache => Arc::new(LocalCacheStrategy),
            FetchMode::BackendSearch => Arc::new(BackendSearchStrategy),
        };
        Self::with_strategy(directory, strategy, config)
    }

    /// Build a service around an explicit strategy implementation.
    pub fn with_strategy(
        directory: Arc<dyn UserDirectory>,
        strategy: Arc<dyn QueryStrategy>,
        config: ConsoleConfig,
    ) -> Self {
        let state = ListState::new(&config);
        Self {
            directory,
            strategy,
            search_debounce: Arc::new(Debouncer::new(config.search_debounce())),
            age_debounce: Arc::new(Debouncer::new(config.age_debounce())),
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current view-facing snapshot.
    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.lock_state();
        ListSnapshot {
            page: state.page.clone(),
            indicator: state.indicator,
            last_error: state.last_error.clone(),
        }
    }

    /// Current filter and pagination state.
    pub fn query_state(&self) -> QueryState {
        self.lock_state().query.clone()
    }

    /// Stamp a fetch and raise its indicator.
    fn begin_fetch(&self, indicator: LoadIndicator) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_state().indicator = indicator;
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Re-run the query engine over the store and publish the result.
    fn publish(&self, state: &mut ListState, rule: PageRule) {
        let locally = self.strategy.applies_search_locally();
        let mut page = query::run_query(state.store.all(), &state.query, locally);
        if matches!(rule, PageRule::Clamp) {
            let clamped = clamped_page(state.query.page(), page.total(), state.query.page_size());
            if clamped != state.query.page() {
                state.query.set_page(clamped);
                page = query::run_query(state.store.all(), &state.query, locally);
            }
        }
        state.page = page;
        state.indicator = LoadIndicator::None;
        state.last_error = None;
    }

    /// One full fetch cycle: stamp, call the strategy, publish or discard.
    async fn run_refresh(&self, indicator: LoadIndicator, rule: PageRule) {
        let generation = self.begin_fetch(indicator);
        let query_state = self.lock_state().query.clone();
        let outcome = self
            .strategy
            .refresh(self.directory.as_ref(), &query_state)
            .await;

        let mut state = self.lock_state();
        if !self.is_current(generation) {
            debug!(generation, "discarding stale fetch result");
            return;
        }
        match outcome {
            Ok(Some(records)) => {
                state.store.replace(records);
                self.publish(&mut state, rule);
            }
            Ok(None) => self.publish(&mut state, rule),
            Err(error) => {
                warn!(%error, "directory refresh failed");
                state.last_error = Some(error);
                state.indicator = LoadIndicator::None;
            }
        }
    }

    /// Initial load: full skeleton until the first candidate set settles.
    ///
    /// An optional warm-up delay keeps the skeleton visible for a minimum
    /// period; it is purely cosmetic and runs before the fetch begins.
    pub async fn initial_load(&self) {
        let generation = self.begin_fetch(LoadIndicator::FullSkeleton);
        if !self.config.skeleton_warmup().is_zero() {
            sleep(self.config.skeleton_warmup()).await;
        }
        let outcome = self.strategy.prime(self.directory.as_ref()).await;

        let mut state = self.lock_state();
        if !self.is_current(generation) {
            debug!(generation, "discarding stale initial load");
            return;
        }
        match outcome {
            Ok(records) => {
                state.store.replace(records);
                self.publish(&mut state, PageRule::Keep);
            }
            Err(error) => {
                warn!(%error, "initial load failed");
                state.last_error = Some(error);
                state.indicator = LoadIndicator::None;
            }
        }
    }

    /// Debounced search intent: coalesces a keystroke burst into one fetch.
    pub fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        let service = self.clone();
        self.search_debounce
            .fire(async move { service.apply_search(text).await });
    }

    /// Apply a search change immediately, bypassing the debounce window.
    ///
    /// Deliberately raises no indicator: the previous page stays visible
    /// until the replacement settles.
    pub async fn apply_search(&self, text: impl Into<String>) {
        self.lock_state().query.set_search(text);
        self.run_refresh(LoadIndicator::None, PageRule::Keep).await;
    }

    /// Debounced age-filter intent, typically wired to a slider release.
    pub fn set_age_filter(&self, age: Option<u32>) {
        let service = self.clone();
        self.age_debounce
            .fire(async move { service.apply_age_filter(age).await });
    }

    /// Apply an age-filter change immediately, with the full skeleton up
    /// for the duration of the fetch.
    pub async fn apply_age_filter(&self, age: Option<u32>) {
        self.lock_state().query.set_age_filter(age);
        self.run_refresh(LoadIndicator::FullSkeleton, PageRule::Keep)
            .await;
    }

    /// Clear the age filter, skeleton up until the refresh settles.
    pub async fn clear_age_filter(&self) {
        self.apply_age_filter(None).await;
    }

    /// Move to another page with the lightweight spinner raised.
    pub async fn set_page(&self, page: u32) {
        self.lock_state().query.set_page(page);
        self.run_refresh(LoadIndicator::Spinner, PageRule::Keep).await;
    }

    fn map_mutation_error(id: UserId, error: DirectoryError) -> MutationError {
        match error {
            DirectoryError::NotFound { .. } => MutationError::NotFound { id },
            other => MutationError::Remote(other),
        }
    }

    fn record_remote_failure(&self, error: &MutationError) {
        if let MutationError::Remote(directory_error) = error {
            self.lock_state().last_error = Some(directory_error.clone());
        }
    }

    /// Create a record, insert it first and reload the visible page.
    ///
    /// The new record may legitimately be absent from the refreshed page
    /// when it does not match the active filter or lands on another page.
    pub async fn add_record(&self, draft: UserDraft) -> Result<UserRecord, MutationError> {
        let record = self
            .strategy
            .persist_add(self.directory.as_ref(), draft)
            .await
            .map_err(MutationError::from)
            .inspect_err(|error| self.record_remote_failure(error))?;

        self.lock_state().store.insert(record.clone());
        self.run_refresh(LoadIndicator::FullSkeleton, PageRule::Keep)
            .await;
        Ok(record)
    }

    /// Merge a partial update into the record with `id`, then reload.
    pub async fn update_record(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<UserRecord, MutationError> {
        let reconciled = self
            .strategy
            .persist_update(self.directory.as_ref(), id, &patch)
            .await
            .map_err(|error| Self::map_mutation_error(id, error))
            .inspect_err(|error| self.record_remote_failure(error))?;

        let updated = match reconciled {
            Some(echo) => {
                self.lock_state().store.put(echo.clone());
                echo
            }
            None => self.lock_state().store.update(id, &patch)?,
        };

        self.run_refresh(LoadIndicator::FullSkeleton, PageRule::Keep)
            .await;
        Ok(updated)
    }

    /// Delete the record with `id`, then reload with the page clamped so
    /// removing the last entry of the last page cannot strand the view.
    pub async fn delete_record(&self, id: UserId) -> Result<(), MutationError> {
        self.strategy
            .persist_delete(self.directory.as_ref(), id)
            .await
            .map_err(|error| Self::map_mutation_error(id, error))
            .inspect_err(|error| self.record_remote_failure(error))?;

        self.lock_state().store.delete(id)?;
        self.run_refresh(LoadIndicator::FullSkeleton, PageRule::Clamp)
            .await;
        Ok(())
    }
}
