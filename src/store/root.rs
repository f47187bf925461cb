//! Root state composition and the store that owns it.

use super::auth::{AuthAction, AuthState};
use super::dogs::{DogsAction, DogsState};
use super::error::StateError;
use super::favorites::{FavoritesAction, FavoritesState};
use super::middleware::Middleware;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Any action understood by the root reducer.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
    Dogs(DogsAction),
    Favorites(FavoritesAction),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Auth(action) => action.name(),
            Action::Dogs(action) => action.name(),
            Action::Favorites(action) => action.name(),
        }
    }
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}

impl From<DogsAction> for Action {
    fn from(action: DogsAction) -> Self {
        Action::Dogs(action)
    }
}

impl From<FavoritesAction> for Action {
    fn from(action: FavoritesAction) -> Self {
        Action::Favorites(action)
    }
}

/// Houses the state of every slice.
///
#[derive(Clone, Debug, Default)]
pub struct RootState {
    pub auth: AuthState,
    pub dogs: DogsState,
    pub favorites: FavoritesState,
}

impl RootState {
    pub fn new(dogs: DogsState) -> Self {
        RootState {
            dogs,
            ..Default::default()
        }
    }

    /// Route the action to its slice. Logging out also forgets favorites.
    ///
    pub fn reduce(&mut self, action: Action) -> Result<(), StateError> {
        match action {
            Action::Auth(action) => {
                if action == AuthAction::LoggedOut {
                    self.favorites.reduce(FavoritesAction::Clear);
                }
                self.auth.reduce(action);
                Ok(())
            }
            Action::Dogs(action) => self.dogs.reduce(action),
            Action::Favorites(action) => {
                self.favorites.reduce(action);
                Ok(())
            }
        }
    }
}

/// Single writer of the application state.
///
/// Cheap to clone; clones share the same state and middleware.
#[derive(Clone)]
pub struct Store {
    state: Arc<Mutex<RootState>>,
    middleware: Arc<Vec<Box<dyn Middleware>>>,
    request_ids: Arc<AtomicU64>,
}

impl Default for Store {
    fn default() -> Self {
        Store::new(RootState::default(), vec![])
    }
}

impl Store {
    pub fn new(state: RootState, middleware: Vec<Box<dyn Middleware>>) -> Self {
        Store {
            state: Arc::new(Mutex::new(state)),
            middleware: Arc::new(middleware),
            request_ids: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run the action through the middleware chain and into the reducer.
    ///
    pub async fn dispatch(&self, action: impl Into<Action>) -> Result<(), StateError> {
        let action = action.into();
        let mut state = self.state.lock().await;
        run_chain(&self.middleware, action, &mut state)
    }

    /// Evaluate a read-only view of the state.
    ///
    pub async fn select<T>(&self, selector: impl FnOnce(&RootState) -> T) -> T {
        let state = self.state.lock().await;
        selector(&state)
    }

    /// Returns a fresh id for tagging an asynchronous operation. Ids only
    /// grow, so a smaller id always belongs to an older request.
    ///
    pub fn next_request_id(&self) -> u64 {
        self.request_ids.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn run_chain(
    middleware: &[Box<dyn Middleware>],
    action: Action,
    state: &mut RootState,
) -> Result<(), StateError> {
    match middleware.split_first() {
        Some((head, rest)) => {
            head.handle(action, &mut |action: Action| run_chain(rest, action, &mut *state))
        }
        None => state.reduce(action),
    }
}
