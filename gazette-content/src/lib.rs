//! Content access for the Gazette portal client.
//!
//! - **Model**: [`ContentItem`] projections with field back-fill, drafts for
//!   mutations, and the three [`ContentKind`]s
//! - **Repositories**: the [`ContentRepository`] port with an HTTP
//!   implementation and an in-memory fake
//! - **Use-cases**: list, get, create, update, delete
//! - **Pagination engine**: filter and page state for a listing UI, with
//!   response normalization and stale-response discarding
//! - **Entity proxy**: one-to-one forwarding of `/api/{entity}` calls
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gazette_content::*;
//! use gazette_http_client::{HttpClient, HttpClientConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let api = HttpClient::new(
//!     HttpClientConfig::builder().base_url("http://localhost:4100").build(),
//! )?;
//! let articles = Arc::new(HttpContentRepository::new(api, ContentKind::Articles));
//!
//! let engine = PaginationEngine::new(articles, 50);
//! engine.apply_filters(FilterCriteria::new().label("rates")).await;
//!
//! let snapshot = engine.snapshot();
//! println!("{} of {}", snapshot.items.len(), snapshot.pagination.total_count);
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod filter;
mod model;
mod page;
mod proxy;
mod repository;
mod usecase;

pub use engine::{ErrorHook, FetchOutcome, ListingSnapshot, PaginationEngine};
pub use error::{ContentError, Result};
pub use filter::FilterCriteria;
pub use model::{ContentDraft, ContentItem, ContentKind, parse_timestamp, validate_id};
pub use page::{Envelope, Page, PageQuery, PageResponse, PaginationState, normalize_page};
pub use proxy::{EntityProxy, ProxyReply};
pub use repository::{ContentRepository, HttpContentRepository, MemoryContentRepository};
pub use usecase::{
    ContentUseCases, CreateContent, DeleteContent, GetContent, ListContent, UpdateContent,
};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ContentError, ContentItem, ContentKind, ContentRepository, FetchOutcome, FilterCriteria,
        ListingSnapshot, PaginationEngine, PaginationState, Result,
    };
}
