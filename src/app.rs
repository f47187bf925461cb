use crate::cli::Options;
use crate::config::Config;
use crate::error::AppResult;
use crate::events::network::{Event as NetworkEvent, Handler as NetworkEventHandler};
use crate::service::{AuthService, Dog, SearchService};
use crate::store::selectors::*;
use crate::store::{
    DogsAction, DogsState, PerformanceMiddleware, RequestStatus, RootState, Store,
};
use log::*;
use std::sync::{Arc, Mutex};

/// Oversees store composition, search execution and text output.
///
pub struct App {
    config: Config,
    store: Store,
    performance: PerformanceMiddleware,
    filtered_dogs: Mutex<FilteredDogsSelector>,
}

impl App {
    /// Compose the store from the configuration: dogs slice sized and
    /// hardened as configured, with the performance middleware in front.
    ///
    pub fn new(config: Config) -> AppResult<App> {
        let performance = PerformanceMiddleware::new(config.slow_action_threshold);
        let dogs = DogsState::new(config.page_size, config.discard_stale_responses)?;
        let store = Store::new(
            RootState::new(dogs),
            vec![Box::new(performance.clone())],
        );
        Ok(App {
            config,
            store,
            performance,
            filtered_dogs: Mutex::new(FilteredDogsSelector::new()),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Log in when credentials are known, apply the requested filters and
    /// paging, then fetch breeds and results concurrently. Returns whether
    /// the search was fulfilled.
    ///
    pub async fn run<S>(&self, service: &S, options: &Options) -> AppResult<bool>
    where
        S: SearchService + AuthService,
    {
        info!("Starting search...");
        let handler = NetworkEventHandler::new(&self.store, service);

        let credentials = match (&options.name, &options.email) {
            (Some(name), Some(email)) => Some((name.clone(), email.clone())),
            _ => self
                .config
                .credentials()
                .map(|(name, email)| (name.to_owned(), email.to_owned())),
        };
        match credentials {
            Some((name, email)) => handler.handle(NetworkEvent::Login { name, email }).await?,
            None => warn!("No credentials configured, searching without a session."),
        }

        self.store
            .dispatch(DogsAction::SetFilters(options.filters.clone()))
            .await?;
        if let Some(size) = options.size {
            self.store.dispatch(DogsAction::SetPageSize(size)).await?;
        }
        self.store.dispatch(DogsAction::SetPage(options.page)).await?;
        let sort = options
            .sort
            .clone()
            .or_else(|| self.config.default_sort.clone());
        self.store.dispatch(DogsAction::SetSortOption(sort)).await?;

        let (filters, pagination, sort) = self
            .store
            .select(|state| {
                (
                    select_filters(state),
                    select_pagination(state),
                    select_sort_option(state),
                )
            })
            .await;

        let (breeds, dogs) = tokio::join!(
            handler.handle(NetworkEvent::GetBreeds),
            handler.handle(NetworkEvent::FetchDogs {
                filters: (*filters).clone(),
                page: pagination.page,
                size: pagination.page_size,
                sort,
            })
        );
        breeds?;
        dogs?;

        Ok(self
            .store
            .select(|state| state.dogs.search().status == RequestStatus::Fulfilled)
            .await)
    }

    /// Render the current state as plain text.
    ///
    pub async fn render(&self) -> String {
        self.store
            .select(|state| {
                let dogs = match self.filtered_dogs.lock() {
                    Ok(mut selector) => selector.select(state),
                    Err(_) => select_dogs(state),
                };
                render_state(state, &dogs)
            })
            .await
    }

    /// End the session and report dispatch timings.
    ///
    pub async fn finish<S>(&self, service: &S) -> AppResult<()>
    where
        S: SearchService + AuthService,
    {
        if self.store.select(select_is_authenticated).await {
            NetworkEventHandler::new(&self.store, service)
                .handle(NetworkEvent::Logout)
                .await?;
        }

        let mut timings: Vec<_> = self.performance.timings().into_iter().collect();
        timings.sort_by_key(|(name, _)| *name);
        for (name, timing) in timings {
            debug!(
                "{}: {} dispatches, {:?} total, {:?} max",
                name, timing.count, timing.total, timing.max
            );
        }
        Ok(())
    }
}

fn render_state(state: &RootState, dogs: &Arc<Vec<Dog>>) -> String {
    let mut lines = Vec::new();

    if let Some(user) = select_user(state) {
        lines.push(format!("Signed in as {} <{}>", user.name, user.email));
    }
    if let Some(error) = select_error(state) {
        lines.push(format!("Error: {}", error));
    }

    let breeds = select_breeds(state);
    if !breeds.is_empty() {
        lines.push(format!("{} breeds known", breeds.len()));
    }

    let pagination = select_pagination(state);
    lines.push(format!(
        "Page {} of {} ({} dogs, {} per page{})",
        pagination.page.saturating_add(1),
        pagination.page_count().max(1),
        pagination.total,
        pagination.page_size,
        if pagination.stale { ", outdated" } else { "" }
    ));

    if dogs.is_empty() && state.dogs.search().status == RequestStatus::Fulfilled {
        lines.push("No dogs match these filters.".to_string());
    }
    for dog in dogs.iter() {
        let marker = if select_is_favorite(state, &dog.id) { "*" } else { " " };
        lines.push(format!(
            "{} {:<16} {:<28} age {:>2}  zip {}  [{}]",
            marker, dog.name, dog.breed, dog.age, dog.zip_code, dog.id
        ));
    }

    let cursors = select_cursors(state);
    if cursors.stale {
        return lines.join("\n");
    }
    if let Some(prev) = cursors.prev {
        lines.push(format!("Previous: {}", prev));
    }
    if let Some(next) = cursors.next {
        lines.push(format!("Next: {}", next));
    }

    lines.join("\n")
}
