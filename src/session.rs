//! One portal session: every service built from one set of settings.

use crate::Result;
use gazette_background::{BackgroundRepository, BackgroundResolver, HttpBackgroundRepository};
use gazette_cache::KeyedCache;
use gazette_config::{ConfigService, PortalSettings};
use gazette_content::{
    ContentKind, ContentRepository, ContentUseCases, EntityProxy, HttpContentRepository,
    PaginationEngine,
};
use gazette_http_client::{HttpClient, HttpClientConfig};
use gazette_i18n::{
    FilePreferenceStore, HttpTranslationRepository, Locale, LocaleSet, MemoryPreferenceStore,
    PreferenceStore, TranslationRepository, TranslationTree, Translator,
};
use gazette_log::{debug, info};
use std::fmt;
use std::sync::Arc;

/// One value per [`ContentKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerKind<T> {
    pub articles: T,
    pub topics: T,
    pub research: T,
}

impl<T> PerKind<T> {
    pub fn from_fn(mut f: impl FnMut(ContentKind) -> T) -> Self {
        Self {
            articles: f(ContentKind::Articles),
            topics: f(ContentKind::Topics),
            research: f(ContentKind::Research),
        }
    }

    pub fn get(&self, kind: ContentKind) -> &T {
        match kind {
            ContentKind::Articles => &self.articles,
            ContentKind::Topics => &self.topics,
            ContentKind::Research => &self.research,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentKind, &T)> {
        ContentKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// The ports a session talks through.
pub struct PortalRepositories {
    pub content: PerKind<Arc<dyn ContentRepository>>,
    pub translations: Arc<dyn TranslationRepository>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub backgrounds: Arc<dyn BackgroundRepository>,
}

impl PortalRepositories {
    /// HTTP repositories: content on `api`, locales and page configs on
    /// `assets`. The locale preference goes to the configured file, or
    /// stays in memory when none is set.
    pub fn http(settings: &PortalSettings, api: &HttpClient, assets: &HttpClient) -> Self {
        let preferences: Arc<dyn PreferenceStore> = match settings.preference_file {
            Some(ref path) => Arc::new(FilePreferenceStore::new(path.clone())),
            None => Arc::new(MemoryPreferenceStore::new()),
        };

        Self {
            content: PerKind::from_fn(|kind| {
                Arc::new(HttpContentRepository::new(api.clone(), kind)) as Arc<dyn ContentRepository>
            }),
            translations: Arc::new(
                HttpTranslationRepository::new(assets.clone())
                    .with_locales_path(settings.locales_path.clone())
                    .with_manifest_path(settings.locale_manifest_path.clone()),
            ),
            preferences,
            backgrounds: Arc::new(
                HttpBackgroundRepository::new(assets.clone())
                    .with_path(settings.background_config_path.clone()),
            ),
        }
    }
}

/// Everything the portal UI needs, wired from one [`PortalSettings`].
///
/// The session owns the caches: the per-locale translation cache and the
/// background document live as long as the session, and
/// [`invalidate_caches`](Self::invalidate_caches) drops both.
pub struct PortalSession {
    settings: PortalSettings,
    api: HttpClient,
    repositories: PerKind<Arc<dyn ContentRepository>>,
    engines: PerKind<Arc<PaginationEngine>>,
    proxy: EntityProxy,
    translation_cache: KeyedCache<Locale, TranslationTree>,
    translator: Arc<Translator>,
    backgrounds: Arc<BackgroundResolver>,
}

impl PortalSession {
    /// Build a session talking HTTP to the configured hosts.
    pub fn new(settings: PortalSettings) -> Result<Self> {
        let (api, assets) = Self::clients(&settings)?;
        let repositories = PortalRepositories::http(&settings, &api, &assets);
        Self::assemble(settings, api, repositories)
    }

    /// Build from layered configuration.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Self::new(config.portal_settings()?)
    }

    /// Build from `.env` and `GAZETTE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ConfigService::builder().load_dotenv(None).build()?;
        Self::from_config(&config)
    }

    /// Build around caller-supplied repositories (in-memory fakes, custom
    /// transports). The proxy still targets the configured API host.
    pub fn with_repositories(
        settings: PortalSettings,
        repositories: PortalRepositories,
    ) -> Result<Self> {
        let (api, _) = Self::clients(&settings)?;
        Self::assemble(settings, api, repositories)
    }

    fn clients(settings: &PortalSettings) -> Result<(HttpClient, HttpClient)> {
        let config = HttpClientConfig::builder()
            .base_url(settings.api_base_url.clone())
            .timeout(settings.request_timeout())
            .build();
        let assets = config.with_base_url(settings.assets_base_url.clone());
        Ok((HttpClient::new(config)?, HttpClient::new(assets)?))
    }

    fn assemble(
        settings: PortalSettings,
        api: HttpClient,
        repositories: PortalRepositories,
    ) -> Result<Self> {
        let locales = LocaleSet::from_tags(
            settings.supported_locales.as_slice(),
            &settings.default_locale,
        )?;
        let translation_cache = KeyedCache::new();
        let translator =
            Translator::new(repositories.translations, repositories.preferences, locales)
                .with_cache(translation_cache.clone());

        let engines = PerKind::from_fn(|kind| {
            Arc::new(PaginationEngine::new(
                repositories.content.get(kind).clone(),
                settings.page_size,
            ))
        });

        debug!(
            "Portal session ready (api {}, assets {}, page size {})",
            settings.api_base_url, settings.assets_base_url, settings.page_size
        );

        Ok(Self {
            proxy: EntityProxy::new(api.clone()),
            api,
            engines,
            repositories: repositories.content,
            translation_cache,
            translator: Arc::new(translator),
            backgrounds: Arc::new(BackgroundResolver::new(repositories.backgrounds)),
            settings,
        })
    }

    /// Discover the supported locales, then pick and load the starting one.
    pub async fn start(&self, accept_language: Option<&str>) -> Locale {
        self.translator.refresh_supported_locales().await;
        let locale = self.translator.initialize(None, accept_language).await;
        info!("Portal session started in {}", locale);
        locale
    }

    pub fn settings(&self) -> &PortalSettings {
        &self.settings
    }

    pub fn api_client(&self) -> &HttpClient {
        &self.api
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    pub fn translation_cache(&self) -> &KeyedCache<Locale, TranslationTree> {
        &self.translation_cache
    }

    pub fn backgrounds(&self) -> &Arc<BackgroundResolver> {
        &self.backgrounds
    }

    /// The listing engine for `kind`.
    pub fn engine(&self, kind: ContentKind) -> &Arc<PaginationEngine> {
        self.engines.get(kind)
    }

    pub fn repository(&self, kind: ContentKind) -> &Arc<dyn ContentRepository> {
        self.repositories.get(kind)
    }

    pub fn use_cases(&self, kind: ContentKind) -> ContentUseCases {
        ContentUseCases::new(self.repositories.get(kind).clone())
    }

    pub fn proxy(&self) -> &EntityProxy {
        &self.proxy
    }

    /// Drop cached translations and the background document.
    pub fn invalidate_caches(&self) {
        self.translator.clear_cache();
        self.backgrounds.invalidate();
        info!("Portal caches invalidated");
    }
}

impl fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalSession")
            .field("api_base_url", &self.settings.api_base_url)
            .field("assets_base_url", &self.settings.assets_base_url)
            .field("translator", &self.translator)
            .field("cached_locales", &self.translation_cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_background::{Background, MemoryBackgroundRepository};
    use gazette_content::{ContentItem, FetchOutcome, MemoryContentRepository};
    use gazette_i18n::MemoryTranslationRepository;
    use serde_json::json;

    struct Fakes {
        articles: Arc<MemoryContentRepository>,
        translations: Arc<MemoryTranslationRepository>,
        backgrounds: Arc<MemoryBackgroundRepository>,
    }

    fn session() -> (Fakes, PortalSession) {
        let articles = Arc::new(MemoryContentRepository::new(ContentKind::Articles).with_items([
            ContentItem::from_value(json!({"id": "a1", "title": "Rates", "createdAt": "2024-01-01"}))
                .unwrap(),
        ]));
        let translations = Arc::new(
            MemoryTranslationRepository::new()
                .with_tree(Locale::ja(), json!({"nav": {"home": "ホーム"}}))
                .with_tree(Locale::en(), json!({"nav": {"home": "Home"}})),
        );
        let backgrounds = Arc::new(MemoryBackgroundRepository::new());

        let content = PerKind {
            articles: articles.clone() as Arc<dyn ContentRepository>,
            topics: Arc::new(MemoryContentRepository::new(ContentKind::Topics)),
            research: Arc::new(MemoryContentRepository::new(ContentKind::Research)),
        };
        let repositories = PortalRepositories {
            content,
            translations: translations.clone(),
            preferences: Arc::new(MemoryPreferenceStore::new()),
            backgrounds: backgrounds.clone(),
        };

        let settings = PortalSettings {
            page_size: 10,
            ..PortalSettings::default()
        };
        let session = PortalSession::with_repositories(settings, repositories).unwrap();
        (
            Fakes {
                articles,
                translations,
                backgrounds,
            },
            session,
        )
    }

    #[test]
    fn test_per_kind_lookup() {
        let names = PerKind::from_fn(|kind| kind.segment());
        assert_eq!(*names.get(ContentKind::Research), "research");
        assert_eq!(names.iter().count(), 3);
    }

    #[tokio::test]
    async fn test_session_wires_services() {
        let (fakes, session) = session();

        assert_eq!(session.engine(ContentKind::Articles).page_size(), 10);
        assert_eq!(
            session.engine(ContentKind::Articles).execute(1, None).await,
            FetchOutcome::Committed
        );
        assert_eq!(session.engine(ContentKind::Articles).snapshot().items.len(), 1);
        assert_eq!(fakes.articles.page_queries()[0].limit, 10);

        assert_eq!(session.start(Some("en")).await, Locale::en());
        assert_eq!(session.translator().t("nav.home"), "Home");

        assert_eq!(
            session.backgrounds().resolve("/").await,
            Background::Color {
                value: "#000000".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalidate_caches_forces_refetch() {
        let (fakes, session) = session();
        session.start(None).await;
        session.backgrounds().resolve("/").await;

        assert_eq!(fakes.translations.fetch_count(&Locale::ja()), 1);
        assert_eq!(session.translation_cache().len(), 1);

        session.invalidate_caches();
        assert!(session.translation_cache().is_empty());
        assert!(!session.backgrounds().is_loaded());

        session.translator().get_translations(&Locale::ja()).await;
        session.backgrounds().resolve("/").await;
        assert_eq!(fakes.translations.fetch_count(&Locale::ja()), 2);
        assert_eq!(fakes.backgrounds.load_count(), 2);
    }

    #[test]
    fn test_default_locale_must_be_supported() {
        let settings = PortalSettings {
            default_locale: "fr".to_string(),
            ..PortalSettings::default()
        };
        assert!(PortalSession::new(settings).is_err());
    }
}
