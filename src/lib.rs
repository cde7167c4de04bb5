//! Gazette: the data-access and resolution layer of a content portal.
//!
//! The workspace is split one crate per concern; this crate re-exports them
//! and wires them together in a [`PortalSession`].
//!
//! | Crate | Concern |
//! |-------|---------|
//! | [`content`] | repositories, use-cases, pagination engine, entity proxy |
//! | [`i18n`] | locales, translation trees, the translator |
//! | [`background`] | route-to-background resolution |
//! | [`config`] | layered settings |
//! | [`cache`] | keyed and single-flight caches |
//! | [`http`] | the shared HTTP client |
//! | [`log`] | leveled logging |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gazette::prelude::*;
//!
//! # async fn example() -> gazette::Result<()> {
//! let session = PortalSession::from_env()?;
//! session.start(Some("en-US,en;q=0.8")).await;
//!
//! let articles = session.engine(ContentKind::Articles);
//! articles.apply_filters(FilterCriteria::new().label("rates")).await;
//!
//! println!("{}", session.translator().t("listing.title"));
//! println!("{:?}", session.backgrounds().resolve("/articles").await.render_hint());
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::{Result, SessionError};
pub use session::{PerKind, PortalRepositories, PortalSession};

pub use gazette_background as background;
pub use gazette_cache as cache;
pub use gazette_config as config;
pub use gazette_content as content;
pub use gazette_http_client as http;
pub use gazette_i18n as i18n;
pub use gazette_log as log;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{PerKind, PortalRepositories, PortalSession, SessionError};
    pub use gazette_background::{Background, BackgroundResolver, RenderHint};
    pub use gazette_config::{ConfigService, PortalSettings};
    pub use gazette_content::{
        ContentItem, ContentKind, EntityProxy, FetchOutcome, FilterCriteria, ListingSnapshot,
        PaginationEngine, PaginationState,
    };
    pub use gazette_i18n::{Locale, LocaleSet, LocaleState, Translator};
}
