//! Errors raised while assembling a portal session.

use thiserror::Error;

/// Result type for session setup.
pub type Result<T> = std::result::Result<T, SessionError>;

/// A session could not be built. Runtime failures never surface here: the
/// engines, translator and resolver degrade on their own.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] gazette_config::ConfigError),

    #[error(transparent)]
    Http(#[from] gazette_http_client::HttpClientError),

    #[error(transparent)]
    I18n(#[from] gazette_i18n::I18nError),
}
