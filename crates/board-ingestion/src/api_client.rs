//! HTTP client for the analytics API.
//!
//! Every board endpoint takes the same shape of call: a JSON `POST` of a
//! [`BoardRequest`] to `{base_url}{endpoint}` with the key in an `apiKey`
//! header, answered by a [`BoardResponse`].
//!
//! # Design
//!
//! - Client struct with `reqwest::Client` + `base_url`
//! - Requests are built separately from sending so they can be inspected
//! - Non-success statuses become [`IngestionError::Network`] with the status

use crate::config::ApiConfig;
use crate::error::IngestionError;
use crate::DataSource;
use board_types::{BoardRequest, BoardResponse};
use url::Url;

/// Name of the header carrying the API key.
pub(crate) const API_KEY_HEADER: &str = "apiKey";

/// Production data source over HTTP.
///
/// # Example
///
/// ```rust,no_run
/// use board_ingestion::{AnalyticsClient, ApiConfig, DataSource};
/// use board_types::BoardRequest;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = AnalyticsClient::new(ApiConfig::default().with_api_key("key"));
///     let page = client
///         .fetch_page("/api/v1/smart-money/netflows", &BoardRequest::default())
///         .await?;
///     println!("Got {} records", page.data.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http_client: reqwest::Client,
    config: ApiConfig,
}

impl AnalyticsClient {
    /// Create a client from a config.
    ///
    /// No connection is made until the first request.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
        }
    }

    /// The config this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Absolute URL of an endpoint path.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, IngestionError> {
        if !endpoint.starts_with('/') {
            return Err(IngestionError::InvalidInput(format!(
                "endpoint must start with '/': {}",
                endpoint
            )));
        }
        Ok(self.config.base_url.join(endpoint)?)
    }

    /// Build the HTTP request for one page without sending it.
    pub(crate) fn build_request(
        &self,
        endpoint: &str,
        request: &BoardRequest,
    ) -> Result<reqwest::Request, IngestionError> {
        let mut builder = self
            .http_client
            .post(self.endpoint_url(endpoint)?)
            .json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        Ok(builder.build()?)
    }
}

impl DataSource for AnalyticsClient {
    async fn fetch_page(
        &self,
        endpoint: &str,
        request: &BoardRequest,
    ) -> Result<BoardResponse, IngestionError> {
        let http_request = self.build_request(endpoint, request)?;

        tracing::debug!(
            "POST {} (page {}, per_page {})",
            http_request.url(),
            request.pagination.page,
            request.pagination.per_page
        );

        let response: BoardResponse = self
            .http_client
            .execute(http_request)
            .await?
            .error_for_status()
            .map_err(|e| IngestionError::Network(e.to_string()))?
            .json()
            .await?;

        tracing::debug!(
            "{} page {} returned {} records (last page: {})",
            endpoint,
            request.pagination.page,
            response.data.len(),
            response.pagination.is_last_page
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_types::SortSpec;

    fn client(base: &str) -> AnalyticsClient {
        AnalyticsClient::new(ApiConfig::new(Url::parse(base).unwrap()))
    }

    #[test]
    fn test_endpoint_url() {
        let url = client("https://api.example.com")
            .endpoint_url("/api/v1/smart-money/holdings")
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/smart-money/holdings");
    }

    #[test]
    fn test_endpoint_must_be_absolute_path() {
        assert!(matches!(
            client("https://api.example.com").endpoint_url("holdings"),
            Err(IngestionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_request_carries_key_and_json_body() {
        let config = ApiConfig::new(Url::parse("https://api.example.com").unwrap())
            .with_api_key("secret");
        let client = AnalyticsClient::new(config);
        let request = BoardRequest::new(2, 50).with_sort(SortSpec::desc("value_usd"));

        let http = client.build_request("/api/v1/tgm/dex-trades", &request).unwrap();
        assert_eq!(http.method(), reqwest::Method::POST);
        assert_eq!(http.headers()[API_KEY_HEADER], "secret");

        let body = http.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: BoardRequest = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, request);
    }

    #[test]
    fn test_request_without_key_has_no_header() {
        let http = client("https://api.example.com")
            .build_request("/x", &BoardRequest::default())
            .unwrap();
        assert!(http.headers().get(API_KEY_HEADER).is_none());
    }
}
