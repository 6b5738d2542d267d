//! HTTP client abstraction for testability

use super::ProviderError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for async HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. Uses `Pin<Box<dyn Future>>`
/// so implementations remain trait-object compatible.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request, returning the response body as bytes.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new client with the default 30 second timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new client with a custom request timeout.
    ///
    /// The engine itself enforces no timeout; a hung tile fetch is bounded
    /// only by this transport-level timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ProviderError::Http(format!("Request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| ProviderError::Http(format!("Failed to read response: {}", e)))
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock HTTP client for testing.
    ///
    /// Returns a fixed response and counts how many requests were made.
    pub struct MockHttpClient {
        pub response: Result<Vec<u8>, ProviderError>,
        pub requests: AtomicUsize,
    }

    impl MockHttpClient {
        pub fn returning(response: Result<Vec<u8>, ProviderError>) -> Self {
            Self {
                response,
                requests: AtomicUsize::new(0),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockHttpClient {
        fn get<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::returning(Ok(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com").await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::returning(Err(ProviderError::Http("Test error".to_string())));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_client_construction() {
        assert!(ReqwestClient::new().is_ok());
        assert!(ReqwestClient::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
