//! Dog search slice: filters, sort, pagination, results and breeds.

use super::error::StateError;
use super::filters::{FilterCriteria, SortOption};
use crate::service::Dog;
use log::*;
use std::sync::Arc;

/// Page size used until the user picks another one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Rejection message when the service gives no usable message of its own.
pub const FETCH_DOGS_FALLBACK_MESSAGE: &str = "Failed to fetch dogs. Please try again later.";

/// Rejection message for a failed breed fetch.
pub const FETCH_BREEDS_FALLBACK_MESSAGE: &str = "Failed to fetch breeds. Please try again later.";

/// Specifying the status of one asynchronous operation kind.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

/// Status of an operation kind together with the error of its latest
/// rejection.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lifecycle {
    pub status: RequestStatus,
    pub error: Option<String>,
}

impl Lifecycle {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub(crate) fn pending(&mut self) {
        self.status = RequestStatus::Pending;
        self.error = None;
    }

    pub(crate) fn fulfilled(&mut self) {
        self.status = RequestStatus::Fulfilled;
        self.error = None;
    }

    pub(crate) fn rejected(&mut self, message: String) {
        self.status = RequestStatus::Rejected;
        self.error = Some(message);
    }
}

/// Result of a successful search, resolved into full records.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchDogsPayload {
    pub dogs: Vec<Dog>,
    pub total: u64,
    pub result_ids: Vec<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl FetchDogsPayload {
    /// The payload of a search that matched nothing.
    ///
    pub fn empty() -> Self {
        FetchDogsPayload::default()
    }
}

/// Actions understood by the dogs slice.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DogsAction {
    SetFilters(FilterCriteria),
    ClearFilters,
    SetSortOption(Option<SortOption>),
    SetPage(usize),
    SetPageSize(usize),
    FetchDogsPending {
        request_id: u64,
    },
    FetchDogsFulfilled {
        request_id: u64,
        payload: FetchDogsPayload,
    },
    FetchDogsRejected {
        request_id: u64,
        message: String,
    },
    GetBreedsPending {
        request_id: u64,
    },
    GetBreedsFulfilled {
        request_id: u64,
        breeds: Vec<String>,
    },
    GetBreedsRejected {
        request_id: u64,
        message: String,
    },
}

impl DogsAction {
    /// Returns the action type name used in logs and metrics.
    ///
    pub fn name(&self) -> &'static str {
        match self {
            DogsAction::SetFilters(_) => "dogs/setFilters",
            DogsAction::ClearFilters => "dogs/clearFilters",
            DogsAction::SetSortOption(_) => "dogs/setSortOption",
            DogsAction::SetPage(_) => "dogs/setPage",
            DogsAction::SetPageSize(_) => "dogs/setPageSize",
            DogsAction::FetchDogsPending { .. } => "dogs/fetchDogs/pending",
            DogsAction::FetchDogsFulfilled { .. } => "dogs/fetchDogs/fulfilled",
            DogsAction::FetchDogsRejected { .. } => "dogs/fetchDogs/rejected",
            DogsAction::GetBreedsPending { .. } => "dogs/getBreeds/pending",
            DogsAction::GetBreedsFulfilled { .. } => "dogs/getBreeds/fulfilled",
            DogsAction::GetBreedsRejected { .. } => "dogs/getBreeds/rejected",
        }
    }
}

/// Houses the search state of the application.
///
/// Fields are only changed through [`DogsState::reduce`].
#[derive(Clone, Debug)]
pub struct DogsState {
    dogs: Arc<Vec<Dog>>,
    result_ids: Vec<String>,
    total: u64,
    breeds: Vec<String>,
    filters: Arc<FilterCriteria>,
    sort_option: Option<SortOption>,
    search: Lifecycle,
    breeds_lifecycle: Lifecycle,
    page: usize,
    next: Option<String>,
    prev: Option<String>,
    page_size: usize,
    discard_stale_responses: bool,
    latest_search_request: u64,
    latest_breeds_request: u64,
}

impl Default for DogsState {
    fn default() -> Self {
        DogsState {
            dogs: Arc::new(vec![]),
            result_ids: vec![],
            total: 0,
            breeds: vec![],
            filters: Arc::new(FilterCriteria::default()),
            sort_option: None,
            search: Lifecycle::default(),
            breeds_lifecycle: Lifecycle::default(),
            page: 0,
            next: None,
            prev: None,
            page_size: DEFAULT_PAGE_SIZE,
            discard_stale_responses: false,
            latest_search_request: 0,
            latest_breeds_request: 0,
        }
    }
}

impl DogsState {
    /// Returns an initial state with the given page size. When
    /// `discard_stale_responses` is set, settlements of superseded requests
    /// are dropped instead of overwriting newer state.
    ///
    pub fn new(page_size: usize, discard_stale_responses: bool) -> Result<Self, StateError> {
        if page_size == 0 {
            return Err(StateError::InvalidPageSize(page_size));
        }
        Ok(DogsState {
            page_size,
            discard_stale_responses,
            ..Default::default()
        })
    }

    pub fn dogs(&self) -> &Arc<Vec<Dog>> {
        &self.dogs
    }

    pub fn result_ids(&self) -> &[String] {
        &self.result_ids
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn breeds(&self) -> &[String] {
        &self.breeds
    }

    pub fn filters(&self) -> &Arc<FilterCriteria> {
        &self.filters
    }

    pub fn sort_option(&self) -> Option<&SortOption> {
        self.sort_option.as_ref()
    }

    pub fn search(&self) -> &Lifecycle {
        &self.search
    }

    pub fn breeds_lifecycle(&self) -> &Lifecycle {
        &self.breeds_lifecycle
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn prev(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    /// Apply an action to the slice. Invalid input leaves the state as it
    /// was and returns the reason.
    ///
    pub fn reduce(&mut self, action: DogsAction) -> Result<(), StateError> {
        match action {
            DogsAction::SetFilters(filters) => {
                filters.validate()?;
                self.filters = Arc::new(filters);
                self.page = 0;
            }
            DogsAction::ClearFilters => {
                self.filters = Arc::new(FilterCriteria::default());
                self.page = 0;
            }
            DogsAction::SetSortOption(sort_option) => {
                self.sort_option = sort_option;
            }
            DogsAction::SetPage(page) => {
                self.page = page;
            }
            DogsAction::SetPageSize(page_size) => {
                if page_size == 0 {
                    return Err(StateError::InvalidPageSize(page_size));
                }
                self.page_size = page_size;
                self.page = 0;
            }
            DogsAction::FetchDogsPending { request_id } => {
                self.latest_search_request = self.latest_search_request.max(request_id);
                self.search.pending();
            }
            DogsAction::FetchDogsFulfilled {
                request_id,
                payload,
            } => {
                if self.is_stale_search(request_id) {
                    return Ok(());
                }
                self.search.fulfilled();
                self.dogs = Arc::new(payload.dogs);
                self.total = payload.total;
                self.result_ids = payload.result_ids;
                self.next = payload.next;
                self.prev = payload.prev;
            }
            DogsAction::FetchDogsRejected {
                request_id,
                message,
            } => {
                if self.is_stale_search(request_id) {
                    return Ok(());
                }
                self.search.rejected(message);
                self.dogs = Arc::new(vec![]);
                self.result_ids.clear();
            }
            DogsAction::GetBreedsPending { request_id } => {
                self.latest_breeds_request = self.latest_breeds_request.max(request_id);
                self.breeds_lifecycle.pending();
            }
            DogsAction::GetBreedsFulfilled { request_id, breeds } => {
                if self.is_stale_breeds(request_id) {
                    return Ok(());
                }
                self.breeds_lifecycle.fulfilled();
                self.breeds = breeds;
            }
            DogsAction::GetBreedsRejected {
                request_id,
                message,
            } => {
                if self.is_stale_breeds(request_id) {
                    return Ok(());
                }
                self.breeds_lifecycle.rejected(message);
            }
        }
        Ok(())
    }

    fn is_stale_search(&self, request_id: u64) -> bool {
        let stale = self.discard_stale_responses && request_id < self.latest_search_request;
        if stale {
            debug!(
                "Discarding search settlement {} superseded by request {}",
                request_id, self.latest_search_request
            );
        }
        stale
    }

    fn is_stale_breeds(&self, request_id: u64) -> bool {
        let stale = self.discard_stale_responses && request_id < self.latest_breeds_request;
        if stale {
            debug!(
                "Discarding breeds settlement {} superseded by request {}",
                request_id, self.latest_breeds_request
            );
        }
        stale
    }
}
