//! HTTP client for dog search service requests.
//!
//! This module provides a low-level HTTP client wrapper for making requests
//! to the search service, handling the session cookie, status checks and
//! response parsing.

use super::error::ServiceError;
use reqwest::Response;
use serde::{de::DeserializeOwned, Serialize};

/// Makes requests to the service and tries to conform response data to the
/// requested type.
///
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given base URL. The underlying client
    /// keeps a cookie store so the session established by login is reused.
    ///
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Ok(Client {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client: reqwest::Client::builder().cookie_store(true).build()?,
        })
    }

    /// Issue a GET request with query parameters and parse the JSON body.
    ///
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let response = self
            .http_client
            .get(self.url(path))
            .query(params)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Issue a POST request with a JSON body and parse the JSON response.
    ///
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Issue a POST request whose response body carries no data of interest.
    ///
    pub async fn post_unit<B>(&self, path: &str, body: Option<&B>) -> Result<(), ServiceError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http_client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::check(request.send().await?).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn non-success responses into `ServiceError::Api`, pulling the
    /// message out of a JSON error body when there is one.
    ///
    async fn check(response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let response_text = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Unable to read response"));
        log::error!(
            "API request failed with status {}: {}",
            status,
            response_text
        );

        let message = serde_json::from_str::<serde_json::Value>(&response_text)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_owned)
            });

        Err(ServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let response = Self::check(response).await?;
        let response_bytes = response.bytes().await?;

        match serde_json::from_slice::<T>(&response_bytes) {
            Ok(data) => Ok(data),
            Err(e) => {
                log::error!(
                    "Failed to deserialize API response: {}. Response body: {}",
                    e,
                    String::from_utf8_lossy(&response_bytes)
                );
                Err(e.into())
            }
        }
    }
}
