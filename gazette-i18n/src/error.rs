//! Error types for i18n operations

use thiserror::Error;

/// Errors that can occur while resolving locales and translations.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Invalid locale string
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Locale outside the supported set
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Translation or manifest document has the wrong shape
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Transport failure talking to the locale service
    #[error("Transport error: {0}")]
    Http(#[from] gazette_http_client::HttpClientError),

    /// Repository could not produce the data for another reason
    #[error("Translations unavailable: {0}")]
    Unavailable(String),

    /// Preference storage failure
    #[error("Preference storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}
