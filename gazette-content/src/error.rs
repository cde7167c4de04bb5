//! Error types for content operations.

use gazette_http_client::HttpClientError;
use thiserror::Error;

/// Result type for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Content errors.
///
/// Absence is never an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Network failure or non-2xx answer from the API.
    #[error("Transport error: {0}")]
    Http(#[from] HttpClientError),

    /// The API answered with a body of the wrong shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A non-HTTP repository could not serve the request.
    #[error("Content unavailable: {0}")]
    Unavailable(String),

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ContentError {
    /// Transport, HTTP status and decode failures.
    pub fn is_transport(&self) -> bool {
        !self.is_validation()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status_code(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let validation = ContentError::Validation("start after end".to_string());
        assert!(validation.is_validation());
        assert!(!validation.is_transport());

        let http = ContentError::from(HttpClientError::Response {
            status: 502,
            message: "Bad Gateway".to_string(),
        });
        assert!(http.is_transport());
        assert_eq!(http.status_code(), Some(502));

        let decode: ContentError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(decode.is_transport());
    }
}
