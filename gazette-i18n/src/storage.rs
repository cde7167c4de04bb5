//! Durable storage for the user's chosen locale.

use crate::{I18nError, Locale, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Persists the chosen locale between sessions.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// The stored locale, if any.
    async fn load(&self) -> Result<Option<Locale>>;

    /// Remember `locale`.
    async fn save(&self, locale: &Locale) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    locale: Locale,
}

/// Stores the preference as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self) -> Result<Option<Locale>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredPreference = serde_json::from_str(&content)?;
        Ok(Some(stored.locale))
    }

    async fn save(&self, locale: &Locale) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string(&StoredPreference {
            locale: locale.clone(),
        })?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// Keeps the preference in memory only.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    locale: Mutex<Option<Locale>>,
    read_only: Mutex<bool>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a stored locale.
    pub fn with_locale(locale: Locale) -> Self {
        Self {
            locale: Mutex::new(Some(locale)),
            read_only: Mutex::new(false),
        }
    }

    /// Reject every save, the way a full or locked storage would.
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.lock() = read_only;
    }

    pub fn stored(&self) -> Option<Locale> {
        self.locale.lock().clone()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> Result<Option<Locale>> {
        Ok(self.locale.lock().clone())
    }

    async fn save(&self, locale: &Locale) -> Result<()> {
        if *self.read_only.lock() {
            return Err(I18nError::Storage("preference storage is read-only".to_string()));
        }
        *self.locale.lock() = Some(locale.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("prefs/locale.json"));

        assert_eq!(store.load().await.unwrap(), None);
        store.save(&Locale::en()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Locale::en()));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"locale":"en"}"#);
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locale.json");
        std::fs::write(&path, r#"{"locale":"not a locale"}"#).unwrap();

        assert!(FilePreferenceStore::new(path).load().await.is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_file_store_yields_to_other_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("locale.json"));

        let ticker = tokio::spawn(async { tokio::task::yield_now().await });
        store.save(&Locale::ja()).await.unwrap();
        ticker.await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Locale::ja()));
    }

    #[tokio::test]
    async fn test_memory_store_read_only() {
        let store = MemoryPreferenceStore::with_locale(Locale::ja());
        store.set_read_only(true);

        assert!(store.save(&Locale::en()).await.is_err());
        assert_eq!(store.stored(), Some(Locale::ja()));
    }
}
