//! Content repository port with HTTP and in-memory implementations.

use crate::{
    ContentDraft, ContentError, ContentItem, ContentKind, FilterCriteria, Page, PageQuery,
    PageResponse, PaginationState, Result, normalize_page,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gazette_http_client::HttpClient;
use gazette_log::debug;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Access to one kind of content.
///
/// `find_by_id` reports absence as `Ok(None)`; `Err` is reserved for
/// transport and decode failures.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Which entity this repository serves.
    fn kind(&self) -> ContentKind;

    /// One page of a filtered listing.
    async fn find_page(&self, query: &PageQuery) -> Result<Page<ContentItem>>;

    /// Every item matching `filters`, across all pages the server reports.
    async fn find_all(&self, filters: &FilterCriteria) -> Result<Vec<ContentItem>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentItem>>;

    async fn create(&self, draft: &ContentDraft) -> Result<ContentItem>;

    async fn update(&self, id: &str, draft: &ContentDraft) -> Result<ContentItem>;

    async fn delete(&self, id: &str) -> Result<()>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Talks to `/api/{entity}` on the portal API.
#[derive(Clone)]
pub struct HttpContentRepository {
    client: HttpClient,
    kind: ContentKind,
}

impl HttpContentRepository {
    pub fn new(client: HttpClient, kind: ContentKind) -> Self {
        Self { client, kind }
    }
}

#[async_trait]
impl ContentRepository for HttpContentRepository {
    fn kind(&self) -> ContentKind {
        self.kind
    }

    async fn find_page(&self, query: &PageQuery) -> Result<Page<ContentItem>> {
        let path = self.kind.collection_path();
        debug!("GET {} page={} limit={}", path, query.page, query.limit);

        let body: Value = self
            .client
            .get(path)
            .queries(query.to_query())
            .send_json()
            .await?;
        normalize_page(body, query.limit)
    }

    async fn find_all(&self, filters: &FilterCriteria) -> Result<Vec<ContentItem>> {
        let body: Value = self
            .client
            .get(self.kind.collection_path())
            .queries(filters.to_query())
            .send_json()
            .await?;
        // unfiltered requests get a bare array; filtered ones get page 1
        // of an envelope at the server's default limit
        let mut current = match PageResponse::from_value(body)? {
            PageResponse::Bare(items) => {
                let limit = items.len() as u32;
                return Ok(PageResponse::Bare(items).into_page(limit)?.items);
            }
            envelope => envelope.into_page(0)?,
        };

        let limit = current.items.len() as u32;
        let last = current.pagination.total_pages;
        let mut next = current.pagination.current_page;
        let mut items = std::mem::take(&mut current.items);
        while current.pagination.has_next_page {
            next += 1;
            if limit == 0 || next > last {
                return Err(ContentError::Decode(format!(
                    "{} listing reports more pages than it returned",
                    self.kind
                )));
            }
            current = self
                .find_page(&PageQuery::new(next, limit, filters.clone()))
                .await?;
            if current.items.is_empty() && current.pagination.has_next_page {
                return Err(ContentError::Decode(format!(
                    "{} page {} is empty but not the last",
                    self.kind, next
                )));
            }
            items.append(&mut current.items);
        }
        Ok(items)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentItem>> {
        let body: Option<Value> = self
            .client
            .get(self.kind.item_path(id)?)
            .send_optional_json()
            .await?;
        body.map(ContentItem::from_value).transpose()
    }

    async fn create(&self, draft: &ContentDraft) -> Result<ContentItem> {
        let body: Value = self
            .client
            .post(self.kind.collection_path())
            .json(draft)
            .send_json()
            .await?;
        ContentItem::from_value(body)
    }

    async fn update(&self, id: &str, draft: &ContentDraft) -> Result<ContentItem> {
        let body: Value = self
            .client
            .put(self.kind.item_path(id)?)
            .json(draft)
            .send_json()
            .await?;
        ContentItem::from_value(body)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(self.kind.item_path(id)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// In-memory repository for tests and offline demos.
///
/// Filters and pages its items the way the backend does (newest first),
/// answering with an envelope. It records every page query, can be switched
/// to fail, and can hold the next page request until released.
pub struct MemoryContentRepository {
    kind: ContentKind,
    items: Mutex<Vec<ContentItem>>,
    queries: Mutex<Vec<PageQuery>>,
    holds: Mutex<VecDeque<Arc<Notify>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl MemoryContentRepository {
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            items: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            holds: Mutex::new(VecDeque::new()),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn with_items(self, items: impl IntoIterator<Item = ContentItem>) -> Self {
        self.items.lock().extend(items);
        self
    }

    pub fn insert(&self, item: ContentItem) {
        self.items.lock().push(item);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold the next `find_page` call until the returned handle is notified.
    pub fn hold_next_page(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.holds.lock().push_back(gate.clone());
        gate
    }

    /// Every page query received, oldest first.
    pub fn page_queries(&self) -> Vec<PageQuery> {
        self.queries.lock().clone()
    }

    /// Number of repository calls of any kind.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ContentError::Unavailable(format!(
                "{} store is offline",
                self.kind
            )));
        }
        Ok(())
    }

    fn matching(&self, filters: &FilterCriteria) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .items
            .lock()
            .iter()
            .filter(|item| filters.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        items
    }

    fn materialize(
        &self,
        id: String,
        draft: &ContentDraft,
        created_at: Option<DateTime<Utc>>,
    ) -> ContentItem {
        let now = Utc::now();
        let created_at = created_at.unwrap_or(now);
        ContentItem {
            id,
            title: draft.title.clone(),
            summary: draft.summary.clone().unwrap_or_default(),
            published_at: draft.published_at.or(Some(created_at)),
            created_at: Some(created_at),
            updated_at: Some(now),
            labels: draft.labels.clone(),
            thumbnail_url: draft.thumbnail_url.clone(),
            extra: draft.extra.clone(),
        }
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    fn kind(&self) -> ContentKind {
        self.kind
    }

    async fn find_page(&self, query: &PageQuery) -> Result<Page<ContentItem>> {
        self.queries.lock().push(query.clone());

        let hold = self.holds.lock().pop_front();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        self.enter()?;

        let matching = self.matching(&query.filters);
        let limit = query.limit.max(1);
        let total_count = matching.len() as u64;
        let total_pages = total_count.div_ceil(limit as u64) as u32;
        let page = query.page.max(1);

        let items = matching
            .into_iter()
            .skip(((page - 1) as usize).saturating_mul(limit as usize))
            .take(limit as usize)
            .collect();

        Ok(Page {
            items,
            pagination: PaginationState {
                current_page: page,
                page_size: limit,
                total_count,
                total_pages: total_pages.max(1),
                has_next_page: page < total_pages,
                has_previous_page: page > 1,
            },
        })
    }

    async fn find_all(&self, filters: &FilterCriteria) -> Result<Vec<ContentItem>> {
        self.enter()?;
        Ok(self.matching(filters))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentItem>> {
        self.enter()?;
        Ok(self.items.lock().iter().find(|item| item.id == id).cloned())
    }

    async fn create(&self, draft: &ContentDraft) -> Result<ContentItem> {
        self.enter()?;
        let id = format!("{}-{}", self.kind, self.next_id.fetch_add(1, Ordering::SeqCst));
        let item = self.materialize(id, draft, None);
        self.items.lock().push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: &str, draft: &ContentDraft) -> Result<ContentItem> {
        self.enter()?;
        let mut items = self.items.lock();
        let slot = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ContentError::Unavailable(format!("{} {} not found", self.kind, id)))?;
        let updated = self.materialize(id.to_string(), draft, slot.created_at);
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter()?;
        self.items.lock().retain(|item| item.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, published: &str) -> ContentItem {
        ContentItem::from_value(json!({"id": id, "title": id, "publishedAt": published})).unwrap()
    }

    fn repo(n: usize) -> MemoryContentRepository {
        MemoryContentRepository::new(ContentKind::Articles).with_items(
            (1..=n).map(|i| item(&format!("a{}", i), &format!("2024-01-{:02}T00:00:00Z", i))),
        )
    }

    #[tokio::test]
    async fn test_memory_paging_matches_backend() {
        let repo = repo(25);

        let page = repo
            .find_page(&PageQuery::new(2, 10, FilterCriteria::new()))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].id, "a15");
        assert_eq!(page.pagination.total_count, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next_page);
        assert!(page.pagination.has_previous_page);
    }

    #[tokio::test]
    async fn test_memory_crud() {
        let repo = MemoryContentRepository::new(ContentKind::Topics);

        let created = repo.create(&ContentDraft::new("Weekly")).await.unwrap();
        assert_eq!(created.id, "topics-1");
        assert_eq!(created.published_at, created.created_at);

        let updated = repo
            .update(&created.id, &ContentDraft::new("Weekly (rev)"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Weekly (rev)");
        assert_eq!(updated.created_at, created.created_at);

        repo.delete(&created.id).await.unwrap();
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_failure_switch() {
        let repo = repo(1);
        repo.set_failing(true);

        let err = repo.find_by_id("a1").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(repo.call_count(), 1);
    }

    #[tokio::test]
    async fn test_http_rejects_ids_that_leave_the_segment() {
        let client = HttpClient::new(Default::default()).unwrap();
        let repo = HttpContentRepository::new(client, ContentKind::Articles);

        for id in ["", " ", "../admin", "a1?admin=1", "a1#x", "a%2F1"] {
            let err = repo.find_by_id(id).await.unwrap_err();
            assert!(err.is_validation(), "{:?} was accepted", id);
            assert!(repo.delete(id).await.unwrap_err().is_validation());
        }
    }
}
