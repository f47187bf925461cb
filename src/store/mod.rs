//! Application state management module.
//!
//! This module contains the state store for the application, including:
//! - `RootState`, composed of the auth, dogs and favorites slices
//! - `Store`, the single writer that runs actions through middleware
//! - Selectors computing read-only views for the front end
//! - State error handling

mod auth;
mod dogs;
mod error;
mod favorites;
mod filters;
mod middleware;
mod root;
pub mod selectors;

pub use auth::{AuthAction, AuthState, LOGIN_FALLBACK_MESSAGE};
pub use dogs::{
    DogsAction, DogsState, FetchDogsPayload, Lifecycle, RequestStatus, DEFAULT_PAGE_SIZE,
    FETCH_BREEDS_FALLBACK_MESSAGE, FETCH_DOGS_FALLBACK_MESSAGE,
};
pub use error::StateError;
pub use favorites::{FavoritesAction, FavoritesState};
pub use filters::{FilterCriteria, SortDirection, SortOption, DEFAULT_SORT_FIELD};
pub use middleware::{ActionTiming, Middleware, Next, PerformanceMiddleware};
pub use root::{Action, RootState, Store};
