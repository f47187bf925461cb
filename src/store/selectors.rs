//! Derived, read-only views over the root state.
//!
//! Selectors never mutate state. Most of them are plain projections; the
//! dog list and filters are handed out as `Arc`s, so consumers can detect a
//! change with `Arc::ptr_eq` instead of comparing contents.

use super::dogs::RequestStatus;
use super::filters::{FilterCriteria, SortOption};
use super::root::RootState;
use crate::service::{Dog, User};
use std::sync::Arc;

/// Pagination figures shown next to the result list.
///
/// `stale` is set while the latest search has not been fulfilled, in which
/// case `total` still describes the previous successful search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationSummary {
    pub page: usize,
    pub page_size: usize,
    pub total: u64,
    pub stale: bool,
}

impl PaginationSummary {
    /// Number of pages needed for `total` results.
    ///
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.page_size as u64)
    }
}

/// Continuation cursors of the last fulfilled search.
///
/// Like `PaginationSummary`, `stale` is set while the cursors belong to an
/// earlier search than the one last requested.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationCursors {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub stale: bool,
}

pub fn select_dogs(state: &RootState) -> Arc<Vec<Dog>> {
    Arc::clone(state.dogs.dogs())
}

pub fn select_filters(state: &RootState) -> Arc<FilterCriteria> {
    Arc::clone(state.dogs.filters())
}

pub fn select_sort_option(state: &RootState) -> Option<SortOption> {
    state.dogs.sort_option().cloned()
}

pub fn select_is_loading(state: &RootState) -> bool {
    state.dogs.search().is_pending()
}

pub fn select_is_loading_breeds(state: &RootState) -> bool {
    state.dogs.breeds_lifecycle().is_pending()
}

/// The search error, or the breeds error when the search has none.
///
pub fn select_error(state: &RootState) -> Option<&str> {
    state
        .dogs
        .search()
        .error
        .as_deref()
        .or_else(|| select_breeds_error(state))
}

pub fn select_breeds_error(state: &RootState) -> Option<&str> {
    state.dogs.breeds_lifecycle().error.as_deref()
}

pub fn select_breeds(state: &RootState) -> &[String] {
    state.dogs.breeds()
}

pub fn select_pagination(state: &RootState) -> PaginationSummary {
    PaginationSummary {
        page: state.dogs.page(),
        page_size: state.dogs.page_size(),
        total: state.dogs.total(),
        stale: is_search_outdated(state),
    }
}

pub fn select_cursors(state: &RootState) -> PaginationCursors {
    PaginationCursors {
        next: state.dogs.next().map(str::to_owned),
        prev: state.dogs.prev().map(str::to_owned),
        stale: is_search_outdated(state),
    }
}

fn is_search_outdated(state: &RootState) -> bool {
    matches!(
        state.dogs.search().status,
        RequestStatus::Pending | RequestStatus::Rejected
    )
}

pub fn select_user(state: &RootState) -> Option<&User> {
    state.auth.user()
}

pub fn select_is_authenticated(state: &RootState) -> bool {
    state.auth.user().is_some()
}

pub fn select_login_error(state: &RootState) -> Option<&str> {
    state.auth.login().error.as_deref()
}

pub fn select_favorites(state: &RootState) -> &[String] {
    state.favorites.ids()
}

pub fn select_is_favorite(state: &RootState, id: &str) -> bool {
    state.favorites.contains(id)
}

/// Memoized view of the dogs to display.
///
/// Filtering and sorting already happened on the server, so the view is
/// the dog list itself. It is recomputed only when the dog list or filters
/// change by reference, or the sort option changes by value.
#[derive(Default)]
pub struct FilteredDogsSelector {
    last: Option<Memo>,
    recomputations: usize,
}

struct Memo {
    dogs: Arc<Vec<Dog>>,
    filters: Arc<FilterCriteria>,
    sort_option: Option<SortOption>,
    result: Arc<Vec<Dog>>,
}

impl FilteredDogsSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, state: &RootState) -> Arc<Vec<Dog>> {
        let dogs = state.dogs.dogs();
        let filters = state.dogs.filters();
        let sort_option = state.dogs.sort_option();

        if let Some(memo) = &self.last {
            if Arc::ptr_eq(&memo.dogs, dogs)
                && Arc::ptr_eq(&memo.filters, filters)
                && memo.sort_option.as_ref() == sort_option
            {
                return Arc::clone(&memo.result);
            }
        }

        self.recomputations += 1;
        let result = Arc::clone(dogs);
        self.last = Some(Memo {
            dogs: Arc::clone(dogs),
            filters: Arc::clone(filters),
            sort_option: sort_option.cloned(),
            result: Arc::clone(&result),
        });
        result
    }

    /// Number of times the view has been recomputed.
    ///
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}
