use crate::service::{AuthService, Dog, SearchService, ServiceError, User};
use crate::store::{
    AuthAction, DogsAction, FetchDogsPayload, FilterCriteria, SortOption, StateError, Store,
    FETCH_BREEDS_FALLBACK_MESSAGE, FETCH_DOGS_FALLBACK_MESSAGE, LOGIN_FALLBACK_MESSAGE,
};
use log::*;
use std::collections::HashMap;
use std::error::Error;

/// Specify different network event types.
///
#[derive(Debug, Clone)]
pub enum Event {
    FetchDogs {
        filters: FilterCriteria,
        page: usize,
        size: usize,
        sort: Option<SortOption>,
    },
    GetBreeds,
    Login {
        name: String,
        email: String,
    },
    Logout,
}

/// Specify struct for managing state with network events.
///
/// Service failures never escape the handler: they end up as a rejected
/// lifecycle in the store. The only errors returned are store errors.
pub struct Handler<'a, S> {
    store: &'a Store,
    service: &'a S,
}

impl<'a, S> Handler<'a, S> {
    /// Return new instance with reference to the store.
    ///
    pub fn new(store: &'a Store, service: &'a S) -> Self {
        Handler { store, service }
    }
}

impl<S: SearchService + AuthService> Handler<'_, S> {
    /// Handle network events by type.
    ///
    pub async fn handle(&self, event: Event) -> Result<(), StateError> {
        debug!("Processing network event '{:?}'...", event);
        match event {
            Event::FetchDogs {
                filters,
                page,
                size,
                sort,
            } => self.fetch_dogs(&filters, page, size, sort).await,
            Event::GetBreeds => self.get_breeds().await,
            Event::Login { name, email } => self.login(name, email).await,
            Event::Logout => self.logout().await,
        }
    }
}

impl<S: SearchService> Handler<'_, S> {
    /// Update state with the dogs matching the filters on the given page.
    ///
    pub async fn fetch_dogs(
        &self,
        filters: &FilterCriteria,
        page: usize,
        size: usize,
        sort: Option<SortOption>,
    ) -> Result<(), StateError> {
        let request_id = self.store.next_request_id();
        self.store
            .dispatch(DogsAction::FetchDogsPending { request_id })
            .await?;

        let sort = sort.unwrap_or_default();
        info!(
            "Fetching dogs page {} (size {}, sort {})...",
            page, size, sort
        );

        let action = match self.search(filters, page, size, &sort).await {
            Ok(payload) => {
                info!(
                    "Received {} dogs ({} matching in total).",
                    payload.dogs.len(),
                    payload.total
                );
                DogsAction::FetchDogsFulfilled {
                    request_id,
                    payload,
                }
            }
            Err(e) => {
                error!("Failed to fetch dogs: {}", e);
                log_error_chain(&e);
                let message = e
                    .message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| FETCH_DOGS_FALLBACK_MESSAGE.to_owned());
                DogsAction::FetchDogsRejected {
                    request_id,
                    message,
                }
            }
        };
        self.store.dispatch(action).await
    }

    /// Update state with the list of known breeds.
    ///
    pub async fn get_breeds(&self) -> Result<(), StateError> {
        let request_id = self.store.next_request_id();
        self.store
            .dispatch(DogsAction::GetBreedsPending { request_id })
            .await?;

        info!("Fetching breeds...");
        let action = match self.service.get_breeds().await {
            Ok(breeds) => {
                info!("Received {} breeds.", breeds.len());
                DogsAction::GetBreedsFulfilled { request_id, breeds }
            }
            Err(e) => {
                error!("Failed to fetch breeds: {}", e);
                log_error_chain(&e);
                DogsAction::GetBreedsRejected {
                    request_id,
                    message: FETCH_BREEDS_FALLBACK_MESSAGE.to_owned(),
                }
            }
        };
        self.store.dispatch(action).await
    }

    /// Search for ids, then resolve them into records. The second call is
    /// skipped when nothing matched.
    ///
    async fn search(
        &self,
        filters: &FilterCriteria,
        page: usize,
        size: usize,
        sort: &SortOption,
    ) -> Result<FetchDogsPayload, ServiceError> {
        let results = self.service.search_dogs(filters, page, size, sort).await?;
        if results.result_ids.is_empty() {
            debug!("Search matched no dogs, skipping record lookup.");
            return Ok(FetchDogsPayload::empty());
        }

        let dogs = self.service.get_dogs_by_ids(&results.result_ids).await?;
        Ok(FetchDogsPayload {
            dogs: order_by_ids(&results.result_ids, dogs),
            total: results.total,
            result_ids: results.result_ids,
            next: results.next,
            prev: results.prev,
        })
    }
}

impl<S: AuthService> Handler<'_, S> {
    /// Start a session for the user.
    ///
    pub async fn login(&self, name: String, email: String) -> Result<(), StateError> {
        self.store.dispatch(AuthAction::LoginPending).await?;
        info!("Logging in as {}...", name);
        let action = match self.service.login(&name, &email).await {
            Ok(()) => {
                info!("Logged in as {}.", name);
                AuthAction::LoginFulfilled(User { name, email })
            }
            Err(e) => {
                error!("Failed to log in: {}", e);
                AuthAction::LoginRejected(LOGIN_FALLBACK_MESSAGE.to_owned())
            }
        };
        self.store.dispatch(action).await
    }

    /// End the session. The local session is dropped even when the service
    /// call fails.
    ///
    pub async fn logout(&self) -> Result<(), StateError> {
        if let Err(e) = self.service.logout().await {
            warn!("Logout request failed, clearing local session anyway: {}", e);
        }
        self.store.dispatch(AuthAction::LoggedOut).await
    }
}

/// Put the records in the order of the ids they were requested with.
///
fn order_by_ids(ids: &[String], dogs: Vec<Dog>) -> Vec<Dog> {
    let mut by_id: HashMap<String, Dog> = dogs.into_iter().map(|d| (d.id.clone(), d)).collect();
    let ordered: Vec<Dog> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
    if ordered.len() != ids.len() {
        warn!(
            "Resolved {} of {} requested dogs.",
            ordered.len(),
            ids.len()
        );
    }
    ordered
}

fn log_error_chain(e: &ServiceError) {
    let mut source = e.source();
    while let Some(err) = source {
        error!("  Caused by: {}", err);
        source = err.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{DogService, SearchPage};
    use crate::store::selectors::*;
    use crate::store::{DogsState, RequestStatus, RootState};
    use fake::{Fake, Faker};
    use httpmock::MockServer;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn service(server: &MockServer) -> DogService {
        DogService::new(&server.base_url()).unwrap()
    }

    fn dog(id: &str) -> Dog {
        let mut dog: Dog = Faker.fake();
        dog.id = id.to_string();
        dog
    }

    fn beagle_filters() -> FilterCriteria {
        FilterCriteria {
            breeds: vec!["beagle".to_string()],
            age_min: Some(1),
            age_max: Some(5),
            zip_codes: None,
        }
    }

    #[tokio::test]
    async fn fetch_dogs_defaults_sort_and_resolves_records_in_order() {
        let d1 = dog("d1");
        let d2 = dog("d2");

        let server = MockServer::start();
        let search = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/dogs/search")
                    .query_param("breeds", "beagle")
                    .query_param("ageMin", "1")
                    .query_param("ageMax", "5")
                    .query_param("size", "25")
                    .query_param("from", "0")
                    .query_param("sort", "breed:asc");
                then.status(200).json_body(json!({
                    "resultIds": ["d1", "d2"],
                    "total": 2,
                    "next": null,
                    "prev": null
                }));
            })
            .await;
        let lookup = server
            .mock_async(|when, then| {
                when.method("POST").path("/dogs").json_body(json!(["d1", "d2"]));
                then.status(200).json_body(json!([d2, d1]));
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        let handler = Handler::new(&store, &service);
        handler
            .fetch_dogs(&beagle_filters(), 0, 25, None)
            .await
            .unwrap();

        search.assert_async().await;
        lookup.assert_async().await;
        let (status, dogs, total, ids) = store
            .select(|state| {
                (
                    state.dogs.search().status,
                    select_dogs(state),
                    state.dogs.total(),
                    state.dogs.result_ids().to_vec(),
                )
            })
            .await;
        assert_eq!(status, RequestStatus::Fulfilled);
        assert_eq!(*dogs, vec![d1, d2]);
        assert_eq!(total, 2);
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[tokio::test]
    async fn fetch_dogs_with_no_matches_skips_record_lookup() {
        let server = MockServer::start();
        let search = server
            .mock_async(|when, then| {
                when.method("GET").path("/dogs/search");
                then.status(200).json_body(json!({
                    "resultIds": [],
                    "total": 0,
                    "next": "/dogs/search?from=25",
                    "prev": null
                }));
            })
            .await;
        let lookup = server
            .mock_async(|when, then| {
                when.method("POST").path("/dogs");
                then.status(200).json_body(json!([]));
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        Handler::new(&store, &service)
            .fetch_dogs(&FilterCriteria::default(), 0, 25, None)
            .await
            .unwrap();

        search.assert_async().await;
        assert_eq!(lookup.hits_async().await, 0);
        let (status, dogs, total, ids, cursors) = store
            .select(|state| {
                (
                    state.dogs.search().status,
                    select_dogs(state),
                    state.dogs.total(),
                    state.dogs.result_ids().len(),
                    select_cursors(state),
                )
            })
            .await;
        assert_eq!(status, RequestStatus::Fulfilled);
        assert!(dogs.is_empty());
        assert_eq!(total, 0);
        assert_eq!(ids, 0);
        assert_eq!(cursors, PaginationCursors::default());
    }

    #[tokio::test]
    async fn fetch_dogs_uses_explicit_sort() {
        let server = MockServer::start();
        let search = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/dogs/search")
                    .query_param("sort", "age:desc")
                    .query_param("from", "20");
                then.status(200)
                    .json_body(json!({ "resultIds": [], "total": 0 }));
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        Handler::new(&store, &service)
            .fetch_dogs(
                &FilterCriteria::default(),
                2,
                10,
                Some("age:desc".parse().unwrap()),
            )
            .await
            .unwrap();
        search.assert_async().await;
    }

    #[tokio::test]
    async fn failed_lookup_rejects_with_embedded_message_and_clears_dogs() {
        let server = MockServer::start();
        let mut search = server
            .mock_async(|when, then| {
                when.method("GET").path("/dogs/search");
                then.status(200)
                    .json_body(json!({ "resultIds": ["d1"], "total": 1 }));
            })
            .await;
        let mut lookup = server
            .mock_async(|when, then| {
                when.method("POST").path("/dogs");
                then.status(200).json_body(json!([dog("d1")]));
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        let handler = Handler::new(&store, &service);
        handler
            .fetch_dogs(&FilterCriteria::default(), 0, 25, None)
            .await
            .unwrap();
        assert_eq!(store.select(|s| select_dogs(s).len()).await, 1);

        search.delete_async().await;
        lookup.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/dogs/search");
                then.status(200)
                    .json_body(json!({ "resultIds": ["d1"], "total": 1 }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/dogs");
                then.status(500)
                    .json_body(json!({ "message": "Dog lookup unavailable" }));
            })
            .await;

        handler
            .fetch_dogs(&FilterCriteria::default(), 0, 25, None)
            .await
            .unwrap();
        let (status, dogs, error) = store
            .select(|state| {
                (
                    state.dogs.search().status,
                    select_dogs(state),
                    select_error(state).map(str::to_owned),
                )
            })
            .await;
        assert_eq!(status, RequestStatus::Rejected);
        assert!(dogs.is_empty());
        assert_eq!(error.as_deref(), Some("Dog lookup unavailable"));
    }

    #[tokio::test]
    async fn failed_search_without_message_uses_fallback() {
        let server = MockServer::start();
        let lookup = server
            .mock_async(|when, then| {
                when.method("POST").path("/dogs");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method("GET").path("/dogs/search");
                then.status(401).body("Unauthorized");
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        Handler::new(&store, &service)
            .fetch_dogs(&FilterCriteria::default(), 0, 25, None)
            .await
            .unwrap();

        assert_eq!(lookup.hits_async().await, 0);
        let error = store
            .select(|state| select_error(state).map(str::to_owned))
            .await;
        assert_eq!(error.as_deref(), Some(FETCH_DOGS_FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn network_failure_rejects_with_fallback() {
        let store = Store::default();
        // Nothing listens on the discard port.
        let service = DogService::new("http://127.0.0.1:9").unwrap();
        Handler::new(&store, &service)
            .fetch_dogs(&FilterCriteria::default(), 0, 25, None)
            .await
            .unwrap();
        let (status, error) = store
            .select(|state| {
                (
                    state.dogs.search().status,
                    select_error(state).map(str::to_owned),
                )
            })
            .await;
        assert_eq!(status, RequestStatus::Rejected);
        assert_eq!(error.as_deref(), Some(FETCH_DOGS_FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn get_breeds_failure_keeps_cached_breeds() {
        let server = MockServer::start();
        let mut ok = server
            .mock_async(|when, then| {
                when.method("GET").path("/dogs/breeds");
                then.status(200).json_body(json!(["Beagle", "Pug"]));
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        let handler = Handler::new(&store, &service);
        handler.get_breeds().await.unwrap();
        ok.delete_async().await;

        server
            .mock_async(|when, then| {
                when.method("GET").path("/dogs/breeds");
                then.status(503)
                    .json_body(json!({ "message": "ignored for breeds" }));
            })
            .await;
        handler.get_breeds().await.unwrap();

        let (status, error, breeds) = store
            .select(|state| {
                (
                    state.dogs.breeds_lifecycle().status,
                    select_breeds_error(state).map(str::to_owned),
                    select_breeds(state).to_vec(),
                )
            })
            .await;
        assert_eq!(status, RequestStatus::Rejected);
        assert_eq!(
            error.as_deref(),
            Some("Failed to fetch breeds. Please try again later.")
        );
        assert_eq!(breeds, vec!["Beagle", "Pug"]);
    }

    #[tokio::test]
    async fn handle_routes_login_and_logout() {
        let server = MockServer::start();
        let login = server
            .mock_async(|when, then| {
                when.method("POST").path("/auth/login");
                then.status(200).body("OK");
            })
            .await;
        let logout = server
            .mock_async(|when, then| {
                when.method("POST").path("/auth/logout");
                then.status(500);
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        let handler = Handler::new(&store, &service);
        handler
            .handle(Event::Login {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        login.assert_async().await;
        assert!(store.select(select_is_authenticated).await);

        handler.handle(Event::Logout).await.unwrap();
        logout.assert_async().await;
        assert!(!store.select(select_is_authenticated).await);
    }

    #[tokio::test]
    async fn failed_login_is_rejected() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("POST").path("/auth/login");
                then.status(401);
            })
            .await;

        let store = Store::default();
        let service = service(&server);
        Handler::new(&store, &service)
            .login("Ada".to_string(), "not-an-email".to_string())
            .await
            .unwrap();
        let (authenticated, error) = store
            .select(|state| {
                (
                    select_is_authenticated(state),
                    select_login_error(state).map(str::to_owned),
                )
            })
            .await;
        assert!(!authenticated);
        assert_eq!(error.as_deref(), Some(LOGIN_FALLBACK_MESSAGE));
    }

    #[test]
    fn order_by_ids_follows_request_order_and_drops_unknown() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ordered = order_by_ids(&ids, vec![dog("c"), dog("x"), dog("a")]);
        let ordered_ids: Vec<&str> = ordered.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ordered_ids, vec!["a", "c"]);
    }

    /// Search service whose responses can be held back, to settle requests
    /// out of order.
    struct GatedService {
        gates: Mutex<VecDeque<Option<oneshot::Receiver<()>>>>,
        pages: Mutex<VecDeque<Vec<String>>>,
    }

    impl GatedService {
        fn new(pages: Vec<Vec<&str>>, gates: Vec<Option<oneshot::Receiver<()>>>) -> Self {
            GatedService {
                gates: Mutex::new(gates.into()),
                pages: Mutex::new(
                    pages
                        .into_iter()
                        .map(|ids| ids.into_iter().map(str::to_owned).collect())
                        .collect(),
                ),
            }
        }
    }

    impl SearchService for GatedService {
        async fn search_dogs(
            &self,
            _filters: &FilterCriteria,
            _page: usize,
            _size: usize,
            _sort: &SortOption,
        ) -> Result<SearchPage, ServiceError> {
            let gate = self.gates.lock().unwrap().pop_front().flatten();
            let ids = self.pages.lock().unwrap().pop_front().unwrap_or_default();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(SearchPage {
                total: ids.len() as u64,
                result_ids: ids,
                next: None,
                prev: None,
            })
        }

        async fn get_dogs_by_ids(&self, ids: &[String]) -> Result<Vec<Dog>, ServiceError> {
            Ok(ids.iter().map(|id| dog(id)).collect())
        }

        async fn get_breeds(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec![])
        }
    }

    async fn race(store: &Store) -> Vec<String> {
        let (release_first, first_gate) = oneshot::channel();
        let service = GatedService::new(
            vec![vec!["old"], vec!["new1", "new2"]],
            vec![Some(first_gate), None],
        );
        let handler = Handler::new(store, &service);
        let filters = FilterCriteria::default();

        let (first, second) = tokio::join!(handler.fetch_dogs(&filters, 0, 25, None), async {
            let result = handler.fetch_dogs(&filters, 0, 25, None).await;
            let _ = release_first.send(());
            result
        });
        first.unwrap();
        second.unwrap();

        store
            .select(|state| select_dogs(state).iter().map(|d| d.id.clone()).collect())
            .await
    }

    #[tokio::test]
    async fn concurrent_fetches_are_last_write_wins_by_default() {
        let store = Store::default();
        assert_eq!(race(&store).await, vec!["old"]);
    }

    #[tokio::test]
    async fn concurrent_fetches_can_discard_stale_settlements() {
        let state = RootState::new(DogsState::new(25, true).unwrap());
        let store = Store::new(state, vec![]);
        assert_eq!(race(&store).await, vec!["new1", "new2"]);
    }
}
