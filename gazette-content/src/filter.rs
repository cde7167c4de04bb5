//! Listing filter criteria.

use crate::{ContentError, ContentItem, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filters applied to a listing query.
///
/// Blank strings are treated as absent. Label order is irrelevant.
///
/// ```
/// use chrono::NaiveDate;
/// use gazette_content::FilterCriteria;
///
/// let filters = FilterCriteria::new()
///     .date_range(NaiveDate::from_ymd_opt(2024, 1, 1), NaiveDate::from_ymd_opt(2024, 1, 31))
///     .label("rates")
///     .label("fx")
///     .search("  ");
///
/// assert_eq!(
///     filters.to_query(),
///     vec![
///         ("startDate", "2024-01-01".to_string()),
///         ("endDate", "2024-01-31".to_string()),
///         ("labelTags", "fx,rates".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    pub search_query: Option<String>,
    pub source_filter: Option<String>,
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        if let Some(label) = non_blank(label) {
            self.labels.insert(label);
        }
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().filter_map(non_blank));
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = non_blank(query);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source_filter = non_blank(source);
        self
    }

    /// No filter field is set.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.labels.is_empty()
            && self.search_query.is_none()
            && self.source_filter.is_none()
    }

    /// A start date after the end date is rejected.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ContentError::Validation(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Query parameters for every non-empty field, in a fixed order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(start) = self.start_date {
            params.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if !self.labels.is_empty() {
            let joined = self.labels.iter().map(String::as_str).collect::<Vec<_>>().join(",");
            params.push(("labelTags", joined));
        }
        if let Some(ref query) = self.search_query {
            params.push(("searchQuery", query.clone()));
        }
        if let Some(ref source) = self.source_filter {
            params.push(("sourceFilter", source.clone()));
        }

        params
    }

    /// Client-side evaluation, used by the in-memory repository.
    ///
    /// Dates compare against the publish date, labels match when the item
    /// carries any of them, text search is case-insensitive over title and
    /// summary, and the source filter matches the `source` field exactly.
    pub fn matches(&self, item: &ContentItem) -> bool {
        let published = item.published_on();
        if let Some(start) = self.start_date {
            if published.is_none_or(|d| d < start) {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if published.is_none_or(|d| d > end) {
                return false;
            }
        }

        if !self.labels.is_empty() && !item.labels.iter().any(|l| self.labels.contains(l)) {
            return false;
        }

        if let Some(ref query) = self.search_query {
            let needle = query.to_lowercase();
            let hit = item.title.to_lowercase().contains(&needle)
                || item.summary.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(ref source) = self.source_filter {
            if item.extra_str("source") != Some(source.as_str()) {
                return false;
            }
        }

        true
    }
}
