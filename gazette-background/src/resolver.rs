//! Navigation path to background resolution.

use crate::{Background, BackgroundRepository, BackgroundSettings, Result};
use gazette_cache::SharedFetch;
use gazette_log::warn;
use std::sync::Arc;

/// Map a navigation path to its settings key.
///
/// `/` is `home`; any other path loses exactly one leading slash.
pub fn normalize(path: &str) -> &str {
    if path == "/" {
        return "home";
    }
    path.strip_prefix('/').unwrap_or(path)
}

/// Resolves the background for a path.
///
/// The settings document is loaded once and shared; resolves that arrive
/// while the first load is in flight wait for it. A failed load is not
/// cached, so the next resolve tries again.
pub struct BackgroundResolver {
    repository: Arc<dyn BackgroundRepository>,
    settings: SharedFetch<BackgroundSettings>,
}

impl BackgroundResolver {
    pub fn new(repository: Arc<dyn BackgroundRepository>) -> Self {
        Self {
            repository,
            settings: SharedFetch::new(),
        }
    }

    /// The settings document, loading it if needed.
    pub async fn settings(&self) -> Result<Arc<BackgroundSettings>> {
        let repository = self.repository.clone();
        self.settings
            .get_or_try_load(|| async move { repository.load_settings().await })
            .await
    }

    /// Background for `path`, falling back to the `default` entry.
    pub async fn try_resolve(&self, path: &str) -> Result<Background> {
        let settings = self.settings().await?;
        Ok(settings.lookup(normalize(path)).clone())
    }

    /// Like [`try_resolve`](Self::try_resolve), but a load failure is logged
    /// and yields [`Background::Unsupported`] (no decoration).
    pub async fn resolve(&self, path: &str) -> Background {
        match self.try_resolve(path).await {
            Ok(background) => background,
            Err(e) => {
                warn!("Failed to load background settings for {}: {}", path, e);
                Background::Unsupported
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.settings.is_loaded()
    }

    /// Drop the loaded document; the next resolve fetches it again.
    pub fn invalidate(&self) {
        self.settings.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackgroundRepository;
    use serde_json::json;

    fn resolver(document: serde_json::Value) -> (Arc<MemoryBackgroundRepository>, BackgroundResolver) {
        let repo = Arc::new(MemoryBackgroundRepository::with_document(document));
        let resolver = BackgroundResolver::new(repo.clone());
        (repo, resolver)
    }

    fn color(value: &str) -> Background {
        Background::Color {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/"), "home");
        assert_eq!(normalize("/articles"), "articles");
        assert_eq!(normalize("//double"), "/double");
        assert_eq!(normalize("research/2024"), "research/2024");
        assert_eq!(normalize(""), "");
    }

    #[tokio::test]
    async fn test_root_resolves_home_then_default() {
        let (_, with_home) = resolver(json!({
            "default": {"type": "color", "value": "#000"},
            "home": {"type": "color", "value": "#fff"}
        }));
        assert_eq!(with_home.resolve("/").await, color("#fff"));

        let (_, without_home) = resolver(json!({"default": {"type": "color", "value": "#000"}}));
        assert_eq!(without_home.resolve("/").await, color("#000"));
        assert_eq!(without_home.resolve("/unknown-route").await, color("#000"));
    }

    #[tokio::test]
    async fn test_document_is_loaded_once() {
        let (repo, resolver) = resolver(json!({"default": {"type": "color", "value": "#000"}}));

        resolver.resolve("/a").await;
        resolver.resolve("/b").await;
        assert_eq!(repo.load_count(), 1);

        resolver.invalidate();
        assert!(!resolver.is_loaded());
        resolver.resolve("/a").await;
        assert_eq!(repo.load_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let sink = gazette_log::capture();
        let (repo, resolver) = resolver(json!({"default": {"type": "color", "value": "#000"}}));

        repo.set_failing(true);
        assert_eq!(resolver.resolve("/topics").await, Background::Unsupported);
        assert!(resolver.try_resolve("/topics").await.is_err());
        assert!(sink.contains(gazette_log::Level::Warn, "Failed to load background settings for /topics"));

        repo.set_failing(false);
        assert_eq!(resolver.resolve("/topics").await, color("#000"));
        assert_eq!(repo.load_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_default_degrades() {
        let (_, resolver) = resolver(json!({"home": {"type": "color", "value": "#fff"}}));
        assert_eq!(resolver.resolve("/").await, Background::Unsupported);
    }
}
