//! HTTP fetch primitive for tile downloads.
//!
//! The engine never talks to the network directly; it goes through the
//! [`AsyncHttpClient`] trait so tests can inject mock transports and count
//! requests. [`ReqwestClient`] is the production implementation.

mod http;

pub use http::{AsyncHttpClient, BoxFuture, ReqwestClient};

#[cfg(test)]
pub use http::tests::MockHttpClient;

use thiserror::Error;

/// Errors surfaced by the HTTP fetch primitive.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, read).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server responded with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}
