//! Locale and translation resolution for the Gazette portal client.
//!
//! - **Locales**: tag parsing and normalization, the supported set with its
//!   default, and `Accept-Language` negotiation
//! - **Translation trees**: nested JSON documents addressed by dot-delimited
//!   keys, with literal `{name}` interpolation
//! - **Translator**: the active-locale state machine with a per-locale cache,
//!   a fallback chain ending in the default locale, and stale-load discarding
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gazette_http_client::{HttpClient, HttpClientConfig};
//! use gazette_i18n::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let assets = HttpClient::new(
//!     HttpClientConfig::builder().base_url("http://localhost:3000").build(),
//! )?;
//!
//! let translator = Translator::new(
//!     Arc::new(HttpTranslationRepository::new(assets)),
//!     Arc::new(FilePreferenceStore::new(".gazette/locale.json")),
//!     LocaleSet::default(),
//! );
//!
//! translator.refresh_supported_locales().await;
//! translator.initialize(None, Some("en-US,en;q=0.9")).await;
//!
//! println!("{}", translator.lookup("listing.count", &[("n", "25")]));
//! # Ok(())
//! # }
//! ```

mod error;
mod locale;
mod repository;
mod storage;
mod translator;
mod tree;

pub use error::I18nError;
pub use locale::{
    Locale, LocaleManifest, LocaleSet, best_match, negotiate_locale, parse_accept_language,
};
pub use repository::{HttpTranslationRepository, MemoryTranslationRepository, TranslationRepository};
pub use storage::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use translator::{LocaleSnapshot, LocaleState, MissingKeyHook, Translator};
pub use tree::{TranslationTree, interpolate};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        I18nError, Locale, LocaleSet, LocaleState, PreferenceStore, Result, TranslationRepository,
        TranslationTree, Translator,
    };
}
