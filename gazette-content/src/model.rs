//! Read-only projections of backend content.

use crate::{ContentError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The kinds of content the portal lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Articles,
    Topics,
    Research,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [Self::Articles, Self::Topics, Self::Research];

    /// The `{entity}` path segment under `/api`.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Articles => "articles",
            Self::Topics => "topics",
            Self::Research => "research",
        }
    }

    /// `/api/{entity}`
    pub fn collection_path(&self) -> String {
        format!("/api/{}", self.segment())
    }

    /// `/api/{entity}/{id}`, refusing ids that would escape the path segment.
    pub fn item_path(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        Ok(format!("/api/{}/{}", self.segment(), id))
    }
}

/// An id must be one non-blank path segment: no `/`, `?`, `#`, `%`,
/// whitespace or control characters.
pub fn validate_id(id: &str) -> Result<()> {
    let bad = |c: char| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control();
    if id.is_empty() || id.contains(bad) {
        return Err(ContentError::Validation(format!("invalid id: {:?}", id)));
    }
    Ok(())
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for ContentKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "articles" | "article" => Ok(Self::Articles),
            "topics" | "topic" => Ok(Self::Topics),
            "research" | "trend-reports" => Ok(Self::Research),
            other => Err(ContentError::Validation(format!("unknown entity: {}", other))),
        }
    }
}

/// One article, topic digest, or research report as the UI sees it.
///
/// Built through back-fill: the display timestamp falls back to the creation
/// timestamp, missing labels and summary become empty, an empty thumbnail is
/// absent. Fields without a dedicated slot are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawContentItem")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub thumbnail_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentItem {
    /// Decode one backend record.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// A string field kept in `extra` (e.g. `source`, `articleUrl`).
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Publish date in UTC, used for date-range filtering.
    pub fn published_on(&self) -> Option<NaiveDate> {
        self.published_at.map(|t| t.date_naive())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContentItem {
    #[serde(deserialize_with = "de_id")]
    id: String,
    #[serde(default, deserialize_with = "de_null_default")]
    title: String,
    #[serde(default, deserialize_with = "de_null_default")]
    summary: String,
    #[serde(default, alias = "publishDate", deserialize_with = "de_timestamp")]
    published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_null_default")]
    labels: Vec<String>,
    #[serde(default, deserialize_with = "de_non_empty")]
    thumbnail_url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawContentItem> for ContentItem {
    fn from(raw: RawContentItem) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            summary: raw.summary,
            published_at: raw.published_at.or(raw.created_at),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            labels: raw.labels,
            thumbnail_url: raw.thumbnail_url,
            extra: raw.extra,
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "id must be a string or number, got {}",
            other
        ))),
    }
}

fn de_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_non_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

fn de_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC), and bare dates.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

/// Input for create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Kind-specific fields (`source`, `articleUrl`, `speaker`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Reject drafts the backend would refuse.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ContentError::Validation("title must not be empty".to_string()));
        }
        if self.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ContentError::Validation("labels must not be blank".to_string()));
        }
        Ok(())
    }
}
