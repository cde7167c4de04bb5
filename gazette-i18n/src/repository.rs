//! Where translation documents and the locale manifest come from.

use crate::{I18nError, Locale, LocaleManifest, LocaleSet, Result, TranslationTree};
use async_trait::async_trait;
use gazette_http_client::HttpClient;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Notify;

/// Source of translation trees and of the supported locale list.
#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Fetch the tree for one locale. An empty tree is a valid answer.
    async fn fetch_translations(&self, locale: &Locale) -> Result<TranslationTree>;

    /// Fetch the supported locales and the default.
    async fn fetch_locale_set(&self) -> Result<LocaleSet>;
}

/// Reads `{locales_path}/{tag}.json` and the manifest from the static asset
/// host.
#[derive(Clone)]
pub struct HttpTranslationRepository {
    client: HttpClient,
    locales_path: String,
    manifest_path: String,
}

impl HttpTranslationRepository {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            locales_path: "/locales".to_string(),
            manifest_path: "/locales/manifest.json".to_string(),
        }
    }

    /// Directory holding the per-locale documents.
    pub fn with_locales_path(mut self, path: impl Into<String>) -> Self {
        self.locales_path = path.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_manifest_path(mut self, path: impl Into<String>) -> Self {
        self.manifest_path = path.into();
        self
    }

    fn document_path(&self, locale: &Locale) -> String {
        format!("{}/{}.json", self.locales_path, locale.tag())
    }
}

#[async_trait]
impl TranslationRepository for HttpTranslationRepository {
    async fn fetch_translations(&self, locale: &Locale) -> Result<TranslationTree> {
        let path = self.document_path(locale);
        gazette_log::debug!("Fetching translations from {}", path);

        let value: Value = self.client.get(path).send_json().await?;
        TranslationTree::from_value(value)
    }

    async fn fetch_locale_set(&self) -> Result<LocaleSet> {
        let manifest: LocaleManifest = self
            .client
            .get(self.manifest_path.as_str())
            .send_json()
            .await?;
        LocaleSet::try_from(manifest)
    }
}

/// In-memory repository for tests and offline use.
///
/// Counts fetches per locale, can be switched to fail, and can hold a
/// locale's fetch until its gate is opened.
#[derive(Default)]
pub struct MemoryTranslationRepository {
    trees: Mutex<HashMap<Locale, Value>>,
    locale_set: Mutex<Option<LocaleSet>>,
    failing: Mutex<HashSet<Locale>>,
    fail_manifest: Mutex<bool>,
    gates: Mutex<HashMap<Locale, Arc<Notify>>>,
    fetches: Mutex<HashMap<Locale, usize>>,
}

impl MemoryTranslationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `tree` for `locale`.
    pub fn with_tree(self, locale: Locale, tree: Value) -> Self {
        self.trees.lock().insert(locale, tree);
        self
    }

    /// Serve `set` from the manifest.
    pub fn with_locale_set(self, set: LocaleSet) -> Self {
        *self.locale_set.lock() = Some(set);
        self
    }

    pub fn set_tree(&self, locale: Locale, tree: Value) {
        self.trees.lock().insert(locale, tree);
    }

    /// Make fetches for `locale` fail (or succeed again).
    pub fn set_failing(&self, locale: &Locale, failing: bool) {
        let mut set = self.failing.lock();
        if failing {
            set.insert(locale.clone());
        } else {
            set.remove(locale);
        }
    }

    pub fn set_manifest_failing(&self, failing: bool) {
        *self.fail_manifest.lock() = failing;
    }

    /// Hold fetches for `locale` until the returned gate is notified.
    pub fn gate(&self, locale: &Locale) -> Arc<Notify> {
        self.gates
            .lock()
            .entry(locale.clone())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Number of fetches issued for `locale`.
    pub fn fetch_count(&self, locale: &Locale) -> usize {
        self.fetches.lock().get(locale).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TranslationRepository for MemoryTranslationRepository {
    async fn fetch_translations(&self, locale: &Locale) -> Result<TranslationTree> {
        *self.fetches.lock().entry(locale.clone()).or_insert(0) += 1;

        let gate = self.gates.lock().get(locale).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.lock().contains(locale) {
            return Err(I18nError::Unavailable(format!("{} is offline", locale)));
        }

        let tree = self.trees.lock().get(locale).cloned();
        match tree {
            Some(value) => TranslationTree::from_value(value),
            None => Ok(TranslationTree::new()),
        }
    }

    async fn fetch_locale_set(&self) -> Result<LocaleSet> {
        if *self.fail_manifest.lock() {
            return Err(I18nError::Unavailable("manifest is offline".to_string()));
        }
        self.locale_set
            .lock()
            .clone()
            .ok_or_else(|| I18nError::Unavailable("no manifest".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_repository_counts_fetches() {
        let repo = MemoryTranslationRepository::new().with_tree(Locale::en(), json!({"hello": "Hello"}));

        let tree = repo.fetch_translations(&Locale::en()).await.unwrap();
        assert_eq!(tree.lookup("hello"), Some("Hello"));

        let missing = repo.fetch_translations(&Locale::ja()).await.unwrap();
        assert!(missing.is_empty());

        assert_eq!(repo.fetch_count(&Locale::en()), 1);
        assert_eq!(repo.fetch_count(&Locale::ja()), 1);
    }

    #[tokio::test]
    async fn test_memory_repository_failures() {
        let repo = MemoryTranslationRepository::new();
        repo.set_failing(&Locale::en(), true);
        assert!(repo.fetch_translations(&Locale::en()).await.is_err());

        repo.set_failing(&Locale::en(), false);
        assert!(repo.fetch_translations(&Locale::en()).await.is_ok());

        assert!(repo.fetch_locale_set().await.is_err());
    }

    #[test]
    fn test_document_path() {
        let client = HttpClient::new(Default::default()).unwrap();
        let repo = HttpTranslationRepository::new(client).with_locales_path("/static/locales/");
        assert_eq!(
            repo.document_path(&Locale::new("en", Some("us"))),
            "/static/locales/en-US.json"
        );
    }
}
