//! In-process caches for the Gazette portal client.
//!
//! Two building blocks, both explicitly constructed and owned by the service
//! that uses them:
//!
//! - [`KeyedCache`] - one shared value per key, last write wins, explicit
//!   invalidation. Used for per-locale translation trees.
//! - [`SharedFetch`] - a single lazily loaded value whose first load is shared
//!   by every concurrent caller. Failed loads are not cached. Used for the
//!   page background settings document.
//!
//! # Examples
//!
//! ```
//! use gazette_cache::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let trees: KeyedCache<String, Vec<String>> = KeyedCache::new();
//! let stored = trees.insert("ja".to_string(), vec!["挨拶".to_string()]);
//! assert!(std::sync::Arc::ptr_eq(&stored, &trees.get("ja").unwrap()));
//!
//! let settings: SharedFetch<u32> = SharedFetch::new();
//! let value = settings
//!     .get_or_try_load(|| async { Ok::<_, std::io::Error>(7) })
//!     .await
//!     .unwrap();
//! assert_eq!(*value, 7);
//! # }
//! ```

pub mod keyed;
pub mod shared;

pub use keyed::{CacheStats, KeyedCache};
pub use shared::SharedFetch;
