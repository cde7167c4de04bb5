//! One use-case per entity operation.
//!
//! Each use-case validates its input, then delegates to the injected
//! [`ContentRepository`]. Validation failures never reach the repository.

use crate::{ContentDraft, ContentItem, ContentRepository, FilterCriteria, Page, PageQuery, Result};
use std::sync::Arc;

/// List items, either one page or everything matching a filter.
#[derive(Clone)]
pub struct ListContent {
    repository: Arc<dyn ContentRepository>,
}

impl ListContent {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, filters: &FilterCriteria) -> Result<Vec<ContentItem>> {
        filters.validate()?;
        self.repository.find_all(filters).await
    }

    pub async fn execute_page(&self, query: &PageQuery) -> Result<Page<ContentItem>> {
        query.filters.validate()?;
        self.repository.find_page(query).await
    }
}

/// Fetch one item; `Ok(None)` when it does not exist.
#[derive(Clone)]
pub struct GetContent {
    repository: Arc<dyn ContentRepository>,
}

impl GetContent {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Result<Option<ContentItem>> {
        self.repository.find_by_id(id).await
    }
}

#[derive(Clone)]
pub struct CreateContent {
    repository: Arc<dyn ContentRepository>,
}

impl CreateContent {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, draft: &ContentDraft) -> Result<ContentItem> {
        draft.validate()?;
        self.repository.create(draft).await
    }
}

#[derive(Clone)]
pub struct UpdateContent {
    repository: Arc<dyn ContentRepository>,
}

impl UpdateContent {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str, draft: &ContentDraft) -> Result<ContentItem> {
        draft.validate()?;
        self.repository.update(id, draft).await
    }
}

#[derive(Clone)]
pub struct DeleteContent {
    repository: Arc<dyn ContentRepository>,
}

impl DeleteContent {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Result<()> {
        self.repository.delete(id).await
    }
}

/// All five use-cases bound to one repository.
#[derive(Clone)]
pub struct ContentUseCases {
    pub list: ListContent,
    pub get: GetContent,
    pub create: CreateContent,
    pub update: UpdateContent,
    pub delete: DeleteContent,
}

impl ContentUseCases {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self {
            list: ListContent::new(repository.clone()),
            get: GetContent::new(repository.clone()),
            create: CreateContent::new(repository.clone()),
            update: UpdateContent::new(repository.clone()),
            delete: DeleteContent::new(repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentKind, MemoryContentRepository};
    use chrono::NaiveDate;

    fn setup() -> (Arc<MemoryContentRepository>, ContentUseCases) {
        let repo = Arc::new(MemoryContentRepository::new(ContentKind::Research));
        let cases = ContentUseCases::new(repo.clone());
        (repo, cases)
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_repository() {
        let (repo, cases) = setup();

        let err = cases.create.execute(&ContentDraft::new("")).await.unwrap_err();
        assert!(err.is_validation());

        let err = cases
            .update
            .execute("r-1", &ContentDraft::new("ok").label(" "))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(repo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_filters_never_reach_repository() {
        let (repo, cases) = setup();
        let filters = FilterCriteria::new().date_range(
            NaiveDate::from_ymd_opt(2024, 3, 1),
            NaiveDate::from_ymd_opt(2024, 2, 1),
        );

        assert!(cases.list.execute(&filters).await.unwrap_err().is_validation());
        assert_eq!(repo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_through_use_cases() {
        let (_repo, cases) = setup();

        let created = cases
            .create
            .execute(&ContentDraft::new("Semiconductor outlook").label("tech"))
            .await
            .unwrap();

        let found = cases.get.execute(&created.id).await.unwrap();
        assert_eq!(found.as_ref().map(|i| i.title.as_str()), Some("Semiconductor outlook"));

        let tagged = cases
            .list
            .execute(&FilterCriteria::new().label("tech"))
            .await
            .unwrap();
        assert_eq!(tagged.len(), 1);

        cases.delete.execute(&created.id).await.unwrap();
        assert_eq!(cases.get.execute(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (repo, cases) = setup();
        repo.set_failing(true);

        let err = cases.get.execute("r-1").await.unwrap_err();
        assert!(err.is_transport());
    }
}
