//! Listing state machine: page, filters, and the last committed page.

use crate::{ContentItem, ContentRepository, FilterCriteria, PageQuery, PaginationState};
use gazette_log::{debug, warn};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// What the listing UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub items: Arc<Vec<ContentItem>>,
    pub pagination: PaginationState,
    pub loading: bool,
    /// User-facing message of the last failed request, cleared when the next
    /// request starts.
    pub error: Option<String>,
    /// Filters of the most recent request.
    pub applied_filters: FilterCriteria,
}

/// How one `execute` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was committed.
    Committed,
    /// A newer request started before this one finished; its result was dropped.
    Superseded,
    /// The request failed or was rejected; the previous page is still shown.
    Failed,
    /// The page guard refused the change; nothing was requested.
    Ignored,
}

/// Receives the user-facing error message (the listing UI's `onError`).
pub type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

struct Listing {
    snapshot: ListingSnapshot,
    generation: u64,
}

/// Drives one paginated, filterable listing.
///
/// Every request takes a new generation; a response whose generation is no
/// longer current is discarded. Items and pagination are replaced together
/// from a successful response, and a failure leaves both untouched.
///
/// ```
/// use gazette_content::*;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let repo = Arc::new(MemoryContentRepository::new(ContentKind::Articles));
/// let engine = PaginationEngine::new(repo, 20);
///
/// assert_eq!(engine.apply_filters(FilterCriteria::new().search("yen")).await, FetchOutcome::Committed);
/// assert_eq!(engine.snapshot().pagination.current_page, 1);
/// // a single page: moving to page 2 is refused
/// assert_eq!(engine.change_page(2).await, FetchOutcome::Ignored);
/// # }
/// ```
pub struct PaginationEngine {
    repository: Arc<dyn ContentRepository>,
    page_size: u32,
    error_message: String,
    state: RwLock<Listing>,
    snapshots: watch::Sender<ListingSnapshot>,
    error_hook: RwLock<Option<ErrorHook>>,
}

impl PaginationEngine {
    pub fn new(repository: Arc<dyn ContentRepository>, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let snapshot = ListingSnapshot {
            items: Arc::new(Vec::new()),
            pagination: PaginationState::initial(page_size),
            loading: false,
            error: None,
            applied_filters: FilterCriteria::new(),
        };
        let (snapshots, _) = watch::channel(snapshot.clone());
        let error_message = format!("Failed to load {}", repository.kind());

        Self {
            repository,
            page_size,
            error_message,
            state: RwLock::new(Listing {
                snapshot,
                generation: 0,
            }),
            snapshots,
            error_hook: RwLock::new(None),
        }
    }

    /// Message shown when a request fails.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn with_error_hook(self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        *self.error_hook.write() = Some(Arc::new(hook));
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn snapshot(&self) -> ListingSnapshot {
        self.state.read().snapshot.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingSnapshot> {
        self.snapshots.subscribe()
    }

    /// Request `page`. `None` keeps the applied filters.
    pub async fn execute(&self, page: u32, filters: Option<FilterCriteria>) -> FetchOutcome {
        let filters = filters.unwrap_or_else(|| self.state.read().snapshot.applied_filters.clone());

        if let Err(e) = filters.validate() {
            debug!("Rejected {} filters: {}", self.repository.kind(), e);
            {
                let mut state = self.state.write();
                state.generation += 1;
                state.snapshot.loading = false;
                state.snapshot.error = Some(e.to_string());
                self.snapshots.send_replace(state.snapshot.clone());
            }
            self.report(&e.to_string());
            return FetchOutcome::Failed;
        }

        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.snapshot.loading = true;
            state.snapshot.error = None;
            state.snapshot.applied_filters = filters.clone();
            self.snapshots.send_replace(state.snapshot.clone());
            state.generation
        };

        let query = PageQuery::new(page.max(1), self.page_size, filters);
        let result = self.repository.find_page(&query).await;

        let failure = {
            let mut state = self.state.write();
            if state.generation != generation {
                debug!(
                    "Discarding {} page {} (request {} superseded by {})",
                    self.repository.kind(),
                    query.page,
                    generation,
                    state.generation
                );
                return FetchOutcome::Superseded;
            }

            state.snapshot.loading = false;
            let failure = match result {
                Ok(page) => {
                    state.snapshot.items = Arc::new(page.items);
                    state.snapshot.pagination = page.pagination;
                    None
                }
                Err(e) => {
                    warn!("Failed to load {} page {}: {}", self.repository.kind(), query.page, e);
                    state.snapshot.error = Some(self.error_message.clone());
                    Some(self.error_message.clone())
                }
            };
            self.snapshots.send_replace(state.snapshot.clone());
            failure
        };

        match failure {
            Some(message) => {
                self.report(&message);
                FetchOutcome::Failed
            }
            None => FetchOutcome::Committed,
        }
    }

    /// Apply a new filter set; always starts again from page 1.
    pub async fn apply_filters(&self, filters: FilterCriteria) -> FetchOutcome {
        self.execute(1, Some(filters)).await
    }

    pub async fn clear_filters(&self) -> FetchOutcome {
        self.execute(1, Some(FilterCriteria::new())).await
    }

    /// Move to `page` with the applied filters, unless the guard refuses it.
    pub async fn change_page(&self, page: u32) -> FetchOutcome {
        let pagination = self.state.read().snapshot.pagination;
        if !pagination.accepts(page) {
            debug!(
                "Ignoring page change to {} (current {}, total {})",
                page, pagination.current_page, pagination.total_pages
            );
            return FetchOutcome::Ignored;
        }
        self.execute(page, None).await
    }

    /// Repeat the current page with the applied filters.
    pub async fn refresh(&self) -> FetchOutcome {
        let page = self.state.read().snapshot.pagination.current_page;
        self.execute(page, None).await
    }

    fn report(&self, message: &str) {
        let hook = self.error_hook.read().clone();
        if let Some(hook) = hook {
            hook(message);
        }
    }
}

impl fmt::Debug for PaginationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("PaginationEngine")
            .field("kind", &self.repository.kind())
            .field("page_size", &self.page_size)
            .field("generation", &state.generation)
            .field("pagination", &state.snapshot.pagination)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentKind, MemoryContentRepository};
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use serde_json::json;

    fn repo(n: usize) -> Arc<MemoryContentRepository> {
        let items = (1..=n).map(|i| {
            ContentItem::from_value(json!({
                "id": format!("a{}", i),
                "title": if i % 2 == 0 { "Yen rally" } else { "Bond yields" },
                "publishedAt": format!("2024-02-{:02}T00:00:00Z", i),
            }))
            .unwrap()
        });
        Arc::new(MemoryContentRepository::new(ContentKind::Articles).with_items(items))
    }

    #[tokio::test]
    async fn test_initial_snapshot() {
        let engine = PaginationEngine::new(repo(0), 10);
        let snapshot = engine.snapshot();

        assert!(snapshot.items.is_empty());
        assert!(!snapshot.loading);
        assert_eq!(snapshot.pagination, PaginationState::initial(10));
    }

    #[tokio::test]
    async fn test_filter_change_resets_to_first_page() {
        let repo = repo(25);
        let engine = PaginationEngine::new(repo.clone(), 5);

        engine.execute(1, None).await;
        assert_eq!(engine.change_page(3).await, FetchOutcome::Committed);
        assert_eq!(engine.snapshot().pagination.current_page, 3);

        engine.apply_filters(FilterCriteria::new().search("yen")).await;

        let last = repo.page_queries().pop().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.filters.search_query.as_deref(), Some("yen"));
        assert_eq!(engine.snapshot().pagination.current_page, 1);
        assert_eq!(engine.snapshot().pagination.total_count, 12);
    }

    #[tokio::test]
    async fn test_page_change_keeps_filters() {
        let repo = repo(25);
        let engine = PaginationEngine::new(repo.clone(), 5);

        engine.apply_filters(FilterCriteria::new().search("bond")).await;
        engine.change_page(2).await;

        let last = repo.page_queries().pop().unwrap();
        assert_eq!(last.page, 2);
        assert_eq!(last.filters.search_query.as_deref(), Some("bond"));
    }

    #[tokio::test]
    async fn test_page_guard() {
        let repo = repo(25);
        let engine = PaginationEngine::new(repo.clone(), 10);
        engine.execute(1, None).await;

        assert_eq!(engine.change_page(1).await, FetchOutcome::Ignored);
        assert_eq!(engine.change_page(0).await, FetchOutcome::Ignored);
        assert_eq!(engine.change_page(4).await, FetchOutcome::Ignored);
        assert_eq!(repo.page_queries().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_page() {
        let repo = repo(25);
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let engine = PaginationEngine::new(repo.clone(), 10)
            .with_error_hook(move |m| sink.lock().push(m.to_string()));

        engine.execute(1, None).await;
        let before = engine.snapshot();

        repo.set_failing(true);
        assert_eq!(engine.change_page(2).await, FetchOutcome::Failed);

        let after = engine.snapshot();
        assert_eq!(after.items, before.items);
        assert_eq!(after.pagination, before.pagination);
        assert!(!after.loading);
        assert_eq!(after.error.as_deref(), Some("Failed to load articles"));
        assert_eq!(*messages.lock(), vec!["Failed to load articles".to_string()]);

        repo.set_failing(false);
        assert_eq!(engine.refresh().await, FetchOutcome::Committed);
        assert_eq!(engine.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_invalid_range_skips_network() {
        let repo = repo(3);
        let engine = PaginationEngine::new(repo.clone(), 10).with_error_message("Could not load");

        let filters = FilterCriteria::new().date_range(
            NaiveDate::from_ymd_opt(2024, 2, 10),
            NaiveDate::from_ymd_opt(2024, 2, 1),
        );
        assert_eq!(engine.apply_filters(filters).await, FetchOutcome::Failed);

        assert!(repo.page_queries().is_empty());
        assert!(engine.snapshot().error.unwrap().contains("after end date"));
        assert!(engine.snapshot().applied_filters.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let repo = repo(25);
        let engine = Arc::new(PaginationEngine::new(repo.clone(), 10));

        let gate = repo.hold_next_page();
        let slow = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.apply_filters(FilterCriteria::new().search("bond")).await })
        };
        while repo.page_queries().is_empty() {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            engine.apply_filters(FilterCriteria::new().search("yen")).await,
            FetchOutcome::Committed
        );
        gate.notify_one();
        assert_eq!(slow.await.unwrap(), FetchOutcome::Superseded);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.applied_filters.search_query.as_deref(), Some("yen"));
        assert!(snapshot.items.iter().all(|i| i.title == "Yen rally"));
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_subscribers_see_loading_then_result() {
        let engine = PaginationEngine::new(repo(3), 10);
        let mut rx = engine.subscribe();

        engine.execute(1, None).await;

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.items.len(), 3);
    }
}
