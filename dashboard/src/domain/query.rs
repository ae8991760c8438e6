//! Pure query engine over the record store snapshot.
//!
//! [`run_query`] is a deterministic function of its inputs and is re-run on
//! every state change; nothing here touches the network or holds hidden
//! state. Whether the search predicate applies locally depends on the
//! active [`crate::domain::strategy::QueryStrategy`]: a backend-delegated
//! mirror is already filtered by search text, so only the age refinement
//! and pagination run here.

use paging::{Page, PageRequest};

use super::user::UserRecord;

/// Filter and pagination state for the list view.
///
/// Owned by the fetch orchestrator and mutated only through the setters
/// below; views never write it directly. Changing a filter repositions the
/// state on page 1 so a shrunken result set cannot strand the view past
/// the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: u32,
    page_size: u32,
    search: String,
    age_filter: Option<u32>,
}

impl QueryState {
    /// Initial state: first page, no filters.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            age_filter: None,
        }
    }

    /// Current 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Records per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current free-text search string.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Current exact-age filter, when set.
    pub fn age_filter(&self) -> Option<u32> {
        self.age_filter
    }

    /// Replace the search text and reset to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Replace the age filter and reset to the first page.
    pub fn set_age_filter(&mut self, age: Option<u32>) {
        self.age_filter = age;
        self.page = 1;
    }

    /// Move to another page, clamped to at least 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// The pagination request for the current position.
    ///
    /// # Panics
    /// Never in practice: both fields are kept non-zero by construction.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
            .unwrap_or_else(|error| panic!("query state held a degenerate page request: {error}"))
    }
}

/// Derive the visible page from a record snapshot and the current state.
///
/// Steps: optional case-insensitive full-name substring filter, optional
/// exact age filter, then offset pagination. `total` counts survivors of
/// the filters before slicing. Pass `apply_search = false` when the
/// snapshot is already filtered by search text upstream.
pub fn run_query(
    records: &[UserRecord],
    state: &QueryState,
    apply_search: bool,
) -> Page<UserRecord> {
    let needle = state.search().trim().to_lowercase();
    let matching: Vec<UserRecord> = records
        .iter()
        .filter(|record| {
            let by_name = !apply_search
                || needle.is_empty()
                || record.full_name().to_lowercase().contains(&needle);
            let by_age = state
                .age_filter()
                .is_none_or(|age| record.age() == age);
            by_name && by_age
        })
        .cloned()
        .collect();
    paging::paginate(&matching, state.page_request())
}
