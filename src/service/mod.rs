//! Dog search service boundary.
//!
//! The store only ever talks to the service through the [`SearchService`]
//! and [`AuthService`] traits. [`DogService`] is the HTTP implementation
//! used by the binary.

mod client;
mod error;
mod resource;

pub use error::ServiceError;
pub use resource::*;

use crate::store::{FilterCriteria, SortOption};
use client::Client;
use log::*;

/// Default base URL of the dog search service.
pub const DEFAULT_BASE_URL: &str = "https://frontend-take-home-service.fetch.com";

/// Maximum number of ids the service resolves in one request.
pub const MAX_IDS_PER_REQUEST: usize = 100;

/// Search endpoints the store depends on.
///
#[allow(async_fn_in_trait)]
pub trait SearchService {
    /// Returns one page of ids matching the filters, plus cursors.
    async fn search_dogs(
        &self,
        filters: &FilterCriteria,
        page: usize,
        size: usize,
        sort: &SortOption,
    ) -> Result<SearchPage, ServiceError>;

    /// Returns the records for the given ids.
    async fn get_dogs_by_ids(&self, ids: &[String]) -> Result<Vec<Dog>, ServiceError>;

    /// Returns every known breed label.
    async fn get_breeds(&self) -> Result<Vec<String>, ServiceError>;
}

/// Session endpoints used by the auth slice.
///
#[allow(async_fn_in_trait)]
pub trait AuthService {
    async fn login(&self, name: &str, email: &str) -> Result<(), ServiceError>;
    async fn logout(&self) -> Result<(), ServiceError>;
}

/// Responsible for asynchronous interaction with the dog search API
/// including transformation of response data into explicitly-defined types.
///
pub struct DogService {
    client: Client,
}

impl DogService {
    /// Returns a new instance for the given base URL.
    ///
    pub fn new(base_url: &str) -> Result<DogService, ServiceError> {
        debug!("Initializing dog search client for {}...", base_url);
        Ok(DogService {
            client: Client::new(base_url)?,
        })
    }
}

/// Build the query string parameters for a search request.
///
fn search_params(
    filters: &FilterCriteria,
    page: usize,
    size: usize,
    sort: &SortOption,
) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = filters
        .breeds
        .iter()
        .map(|breed| ("breeds", breed.clone()))
        .collect();

    if let Some(zip_codes) = &filters.zip_codes {
        params.extend(zip_codes.iter().map(|zip| ("zipCodes", zip.clone())));
    }
    if let Some(age_min) = filters.age_min {
        params.push(("ageMin", age_min.to_string()));
    }
    if let Some(age_max) = filters.age_max {
        params.push(("ageMax", age_max.to_string()));
    }

    params.push(("size", size.to_string()));
    params.push(("from", page.saturating_mul(size).to_string()));
    params.push(("sort", sort.to_string()));
    params
}

impl SearchService for DogService {
    async fn search_dogs(
        &self,
        filters: &FilterCriteria,
        page: usize,
        size: usize,
        sort: &SortOption,
    ) -> Result<SearchPage, ServiceError> {
        debug!(
            "Requesting dog search page {} (size {}, sort {})...",
            page, size, sort
        );
        let params = search_params(filters, page, size, sort);
        let data: SearchPage = self.client.get("dogs/search", &params).await?;
        debug!(
            "Search matched {} dogs, {} ids on this page",
            data.total,
            data.result_ids.len()
        );
        Ok(data)
    }

    async fn get_dogs_by_ids(&self, ids: &[String]) -> Result<Vec<Dog>, ServiceError> {
        debug!("Requesting {} dog records...", ids.len());
        let mut dogs = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let page: Vec<Dog> = self.client.post("dogs", chunk).await?;
            dogs.extend(page);
        }
        Ok(dogs)
    }

    async fn get_breeds(&self) -> Result<Vec<String>, ServiceError> {
        debug!("Requesting breed list...");
        self.client.get("dogs/breeds", &[]).await
    }
}

impl AuthService for DogService {
    async fn login(&self, name: &str, email: &str) -> Result<(), ServiceError> {
        debug!("Logging in as {} <{}>...", name, email);
        let body = serde_json::json!({ "name": name, "email": email });
        self.client.post_unit("auth/login", Some(&body)).await
    }

    async fn logout(&self) -> Result<(), ServiceError> {
        debug!("Logging out...");
        self.client.post_unit::<serde_json::Value>("auth/logout", None).await
    }
}
