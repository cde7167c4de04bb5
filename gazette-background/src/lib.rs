//! Per-page background resolution for the Gazette portal client.
//!
//! A settings document maps route keys to background variants (color,
//! image, video). The [`BackgroundResolver`] turns a navigation path into
//! one of them, falling back to the mandatory `default` entry, and never
//! fails outward: when nothing can be loaded the page simply gets no
//! decoration.
//!
//! ```rust,no_run
//! use gazette_background::*;
//! use gazette_http_client::{HttpClient, HttpClientConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let assets = HttpClient::new(
//!     HttpClientConfig::builder().base_url("http://localhost:3000").build(),
//! )?;
//! let resolver = BackgroundResolver::new(Arc::new(HttpBackgroundRepository::new(assets)));
//!
//! match resolver.resolve("/research").await.render_hint() {
//!     RenderHint::Color { css } => println!("background-color: {}", css),
//!     other => println!("{:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod model;
mod repository;
mod resolver;

pub use error::BackgroundError;
pub use model::{Background, BackgroundSettings, RenderHint, VideoOptions};
pub use repository::{BackgroundRepository, HttpBackgroundRepository, MemoryBackgroundRepository};
pub use resolver::{BackgroundResolver, normalize};

/// Result type for background operations
pub type Result<T> = std::result::Result<T, BackgroundError>;
