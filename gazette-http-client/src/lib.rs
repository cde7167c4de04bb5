//! # Gazette HTTP Client
//!
//! Thin async HTTP client shared by every Gazette repository and by the entity
//! proxy. It resolves request paths against a configured base URL, applies
//! default headers and timeouts, and turns responses into typed results.
//!
//! Requests are never retried automatically; a failed call surfaces as an
//! [`HttpClientError`] and repeating it is the caller's decision.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gazette_http_client::{HttpClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(
//!         HttpClientConfig::builder()
//!             .base_url("http://localhost:4100")
//!             .build(),
//!     )?;
//!
//!     let articles: serde_json::Value = client
//!         .get("/api/articles")
//!         .query("page", "1")
//!         .query("limit", "50")
//!         .send_json()
//!         .await?;
//!
//!     println!("{articles}");
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::request::RequestBuilder;
    pub use crate::response::Response;
    pub use http::{Method, StatusCode};
}
