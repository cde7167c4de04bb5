//! Page queries and normalization of the two listing response shapes.

use crate::{ContentItem, FilterCriteria, Result};
use serde::Deserialize;
use serde_json::Value;

/// One listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub limit: u32,
    pub filters: FilterCriteria,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32, filters: FilterCriteria) -> Self {
        Self {
            page,
            limit,
            filters,
        }
    }

    /// `page`, `limit`, then the non-empty filter fields.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        params.extend(self.filters.to_query());
        params
    }
}

/// Pagination fields exactly as the server last reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationState {
    /// State before anything has been loaded.
    pub fn initial(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_count: 0,
            total_pages: 1,
            has_next_page: false,
            has_previous_page: false,
        }
    }

    /// Whether `page` is a real move: different from the current page and
    /// inside `[1, total_pages]`.
    pub fn accepts(&self, page: u32) -> bool {
        page != self.current_page && page >= 1 && page <= self.total_pages
    }
}

/// A normalized page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationState,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// The listing endpoint answers with either a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PageResponse {
    Bare(Vec<Value>),
    Envelope(Envelope),
}

/// Paginated envelope. `articles` is accepted in place of `items`; a null
/// or missing field takes the backend's default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default, alias = "articles")]
    pub items: Option<Vec<Value>>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub has_previous_page: Option<bool>,
}

impl PageResponse {
    /// Decode the raw body shape.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Normalize into a page of decoded items.
    ///
    /// A bare array is always page 1 of 1, even when it holds exactly
    /// `limit` items.
    pub fn into_page(self, limit: u32) -> Result<Page<ContentItem>> {
        let (raw_items, pagination) = match self {
            Self::Bare(items) => {
                let pagination = PaginationState {
                    current_page: 1,
                    page_size: limit,
                    total_count: items.len() as u64,
                    total_pages: 1,
                    has_next_page: false,
                    has_previous_page: false,
                };
                (items, pagination)
            }
            Self::Envelope(envelope) => {
                let pagination = PaginationState {
                    current_page: envelope.current_page.filter(|p| *p > 0).unwrap_or(1),
                    page_size: limit,
                    total_count: envelope.total_count.unwrap_or(0),
                    total_pages: envelope.total_pages.filter(|p| *p > 0).unwrap_or(1),
                    has_next_page: envelope.has_next_page.unwrap_or(false),
                    has_previous_page: envelope.has_previous_page.unwrap_or(false),
                };
                (envelope.items.unwrap_or_default(), pagination)
            }
        };

        let items = raw_items
            .into_iter()
            .map(ContentItem::from_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page { items, pagination })
    }
}

/// Decode and normalize a listing body in one step.
pub fn normalize_page(body: Value, limit: u32) -> Result<Page<ContentItem>> {
    PageResponse::from_value(body)?.into_page(limit)
}
