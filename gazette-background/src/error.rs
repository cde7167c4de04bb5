//! Error types for background resolution.

use gazette_http_client::HttpClientError;
use thiserror::Error;

/// Background configuration errors.
#[derive(Debug, Error)]
pub enum BackgroundError {
    /// The settings document could not be fetched.
    #[error("Failed to fetch background settings: {0}")]
    Http(#[from] HttpClientError),

    /// The document is not a JSON object of route entries.
    #[error("Malformed background settings: {0}")]
    Malformed(String),

    /// The document has no `default` entry.
    #[error("Background settings have no \"default\" entry")]
    MissingDefault,

    /// A non-HTTP repository could not serve the document.
    #[error("Background settings unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for BackgroundError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
