//! Pocket Price API client
//!
//! This module provides the single-call-per-resource fetch layer: each method
//! performs one HTTP request, normalizes the response envelope into a plain
//! typed collection and surfaces any transport or parse failure as an
//! [`ApiError`]. No retries and no caching happen here; that is the cache
//! manager's responsibility.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::data::{Category, HealthInfo, Service};

/// Default base URL for the Pocket Price API
const DEFAULT_BASE_URL: &str = "https://api.pocketprice.ru";

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Upstream returned a non-success status code
    #[error("API returned HTTP {0}")]
    HttpStatus(StatusCode),
}

/// Source of service and category listings
///
/// Abstracts the remote API so the cache manager can be exercised against
/// scripted sources in tests. The production implementation is
/// [`PriceApiClient`].
#[async_trait]
pub trait ServiceSource: Send + Sync {
    /// Fetches the full service listing
    async fn fetch_services(&self) -> Result<Vec<Service>, ApiError>;

    /// Fetches the full category listing
    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;

    /// Queries the upstream health endpoint
    async fn health_check(&self) -> Result<HealthInfo, ApiError>;
}

/// Client for the Pocket Price HTTP API
#[derive(Debug, Clone)]
pub struct PriceApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Default for PriceApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, None)
    }
}

impl PriceApiClient {
    /// Creates a new client for the given base URL and optional API key
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_trailing_slash(base_url.into()),
            api_key,
        }
    }

    /// Performs a GET against `path` and parses the body as JSON
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ServiceSource for PriceApiClient {
    async fn fetch_services(&self) -> Result<Vec<Service>, ApiError> {
        let payload = self.get_json("services").await?;
        extract_collection(payload, "services")
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let payload = self.get_json("categories").await?;
        extract_collection(payload, "categories")
    }

    async fn health_check(&self) -> Result<HealthInfo, ApiError> {
        let payload = self.get_json("health").await?;
        Ok(serde_json::from_value(payload)?)
    }
}

/// Normalizes an upstream payload into a plain collection
///
/// The API sometimes wraps the collection in a named field
/// (`{"services": [...]}`) and sometimes returns the bare array. Both shapes
/// reduce to the inner value; anything that is not an array after unwrapping
/// yields an empty collection rather than an error, so ambiguous shapes never
/// propagate past this boundary. Arrays whose elements fail to parse are
/// still an [`ApiError::ParseError`].
fn extract_collection<T: DeserializeOwned>(payload: Value, key: &str) -> Result<Vec<T>, ApiError> {
    let inner = match payload {
        Value::Object(mut map) => match map.remove(key) {
            Some(wrapped) => wrapped,
            None => Value::Object(map),
        },
        other => other,
    };

    match inner {
        Value::Array(_) => Ok(serde_json::from_value(inner)?),
        _ => Ok(Vec::new()),
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample wrapped services payload as served by the production API
    const WRAPPED_SERVICES: &str = r#"{
        "services": [
            {
                "id": "svc-1",
                "name": "Haircut",
                "price": 1500,
                "currency": "RUB",
                "category_id": "cat-1"
            },
            {
                "id": "svc-2",
                "name": "Coloring",
                "price": 4000,
                "price_max": 7000,
                "currency": "RUB",
                "duration": 120,
                "category_id": "cat-1"
            }
        ]
    }"#;

    #[test]
    fn test_extract_collection_from_wrapped_payload() {
        let payload: Value = serde_json::from_str(WRAPPED_SERVICES).expect("Failed to parse");
        let services: Vec<Service> =
            extract_collection(payload, "services").expect("Failed to extract");

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].id, "svc-1");
        assert_eq!(services[1].price_max, Some(7000.0));
    }

    #[test]
    fn test_extract_collection_from_bare_array() {
        let payload: Value = serde_json::from_str(
            r#"[{"id": "cat-1", "name": "Hair", "slug": "hair"}]"#,
        )
        .expect("Failed to parse");

        let categories: Vec<Category> =
            extract_collection(payload, "categories").expect("Failed to extract");

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].slug, "hair");
    }

    #[test]
    fn test_extract_collection_non_array_defaults_to_empty() {
        // Wrapped value that is not a collection
        let payload: Value =
            serde_json::from_str(r#"{"services": "maintenance"}"#).expect("Failed to parse");
        let services: Vec<Service> =
            extract_collection(payload, "services").expect("Failed to extract");
        assert!(services.is_empty());

        // Bare object without the expected field
        let payload: Value =
            serde_json::from_str(r#"{"error": "rate limited"}"#).expect("Failed to parse");
        let services: Vec<Service> =
            extract_collection(payload, "services").expect("Failed to extract");
        assert!(services.is_empty());

        // Scalar payload
        let services: Vec<Service> =
            extract_collection(Value::Null, "services").expect("Failed to extract");
        assert!(services.is_empty());
    }

    #[test]
    fn test_extract_collection_malformed_elements_error() {
        // Array elements missing the required id field fail element parsing
        let payload: Value =
            serde_json::from_str(r#"{"services": [{"name": "No id"}]}"#).expect("Failed to parse");

        let result: Result<Vec<Service>, ApiError> = extract_collection(payload, "services");

        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }

    #[test]
    fn test_extract_collection_empty_array() {
        let payload: Value = serde_json::from_str(r#"{"services": []}"#).expect("Failed to parse");
        let services: Vec<Service> =
            extract_collection(payload, "services").expect("Failed to extract");
        assert!(services.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = PriceApiClient::new("https://api.example.com/", None);
        assert_eq!(client.base_url, "https://api.example.com");

        let client = PriceApiClient::new("https://api.example.com", None);
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn test_default_client_points_at_production_api() {
        let client = PriceApiClient::default();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_api_error_messages() {
        let err = ApiError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("500"));

        let parse_err: serde_json::Error =
            serde_json::from_str::<Value>("{ nope").expect_err("should fail");
        let err = ApiError::ParseError(parse_err);
        assert!(err.to_string().contains("parse"));
    }
}
