//! Active-locale state machine and translation lookup.

use crate::{
    Locale, LocaleSet, PreferenceStore, TranslationRepository, TranslationTree, interpolate,
};
use gazette_cache::KeyedCache;
use gazette_log::{debug, info, warn};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Where the active locale is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleState {
    /// Nothing loaded yet
    Uninitialized,
    /// A load for the active locale is in flight
    Loading,
    /// The active locale's own tree is committed
    Ready,
    /// The active locale could not be loaded; the default locale's tree (or
    /// the last good tree) is in use
    Fallback,
}

/// What subscribers see after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSnapshot {
    pub locale: Locale,
    pub state: LocaleState,
    /// Bumped on every locale change; identifies which load a state belongs to.
    pub generation: u64,
}

/// Called with `(key, active locale)` whenever a lookup falls back to the key.
pub type MissingKeyHook = Arc<dyn Fn(&str, &Locale) + Send + Sync>;

struct Active {
    locale: Locale,
    state: LocaleState,
    generation: u64,
    tree: Arc<TranslationTree>,
}

impl Active {
    fn snapshot(&self) -> LocaleSnapshot {
        LocaleSnapshot {
            locale: self.locale.clone(),
            state: self.state,
            generation: self.generation,
        }
    }
}

struct Resolved {
    tree: Arc<TranslationTree>,
    fallback: bool,
}

/// Resolves translations for the active locale.
///
/// Trees are cached per locale for the translator's lifetime. A load that
/// finishes after the active locale has changed again is discarded, and an
/// empty result never replaces a tree that is already committed.
///
/// # Examples
///
/// ```
/// use gazette_i18n::*;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let repo = MemoryTranslationRepository::new()
///     .with_tree(Locale::ja(), json!({"nav": {"home": "ホーム"}}))
///     .with_tree(Locale::en(), json!({"nav": {"home": "Home"}, "hi": "Hi {name}"}));
///
/// let translator = Translator::new(
///     Arc::new(repo),
///     Arc::new(MemoryPreferenceStore::new()),
///     LocaleSet::default(),
/// );
///
/// translator.initialize(None, Some("en-US,en;q=0.9")).await;
/// assert_eq!(translator.t("nav.home"), "Home");
/// assert_eq!(translator.lookup("hi", &[("name", "Aiko")]), "Hi Aiko");
///
/// translator.set_locale(Locale::ja()).await;
/// assert_eq!(translator.t("nav.home"), "ホーム");
/// # }
/// ```
pub struct Translator {
    repository: Arc<dyn TranslationRepository>,
    preferences: Arc<dyn PreferenceStore>,
    cache: KeyedCache<Locale, TranslationTree>,
    locales: RwLock<LocaleSet>,
    active: RwLock<Active>,
    snapshots: watch::Sender<LocaleSnapshot>,
    missing_key_hook: RwLock<Option<MissingKeyHook>>,
}

impl Translator {
    /// Create a translator positioned on the default locale, nothing loaded.
    pub fn new(
        repository: Arc<dyn TranslationRepository>,
        preferences: Arc<dyn PreferenceStore>,
        locales: LocaleSet,
    ) -> Self {
        let active = Active {
            locale: locales.default_locale().clone(),
            state: LocaleState::Uninitialized,
            generation: 0,
            tree: Arc::new(TranslationTree::new()),
        };
        let (snapshots, _) = watch::channel(active.snapshot());

        Self {
            repository,
            preferences,
            cache: KeyedCache::new(),
            locales: RwLock::new(locales),
            active: RwLock::new(active),
            snapshots,
            missing_key_hook: RwLock::new(None),
        }
    }

    /// Use an externally owned cache (so a session can clear it).
    pub fn with_cache(mut self, cache: KeyedCache<Locale, TranslationTree>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_missing_key_hook(self, hook: impl Fn(&str, &Locale) + Send + Sync + 'static) -> Self {
        *self.missing_key_hook.write() = Some(Arc::new(hook));
        self
    }

    pub fn set_missing_key_hook(&self, hook: Option<MissingKeyHook>) {
        *self.missing_key_hook.write() = hook;
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    pub fn locale(&self) -> Locale {
        self.active.read().locale.clone()
    }

    pub fn state(&self) -> LocaleState {
        self.active.read().state
    }

    pub fn is_loading(&self) -> bool {
        self.state() == LocaleState::Loading
    }

    pub fn snapshot(&self) -> LocaleSnapshot {
        self.active.read().snapshot()
    }

    /// Receive every state transition.
    pub fn subscribe(&self) -> watch::Receiver<LocaleSnapshot> {
        self.snapshots.subscribe()
    }

    /// The committed tree (empty until the first successful load).
    pub fn translations(&self) -> Arc<TranslationTree> {
        self.active.read().tree.clone()
    }

    pub fn supported_locales(&self) -> Vec<Locale> {
        self.locales.read().supported().to_vec()
    }

    pub fn default_locale(&self) -> Locale {
        self.locales.read().default_locale().clone()
    }

    pub fn is_supported(&self, locale: &Locale) -> bool {
        self.locales.read().contains(locale)
    }

    pub fn cache(&self) -> &KeyedCache<Locale, TranslationTree> {
        &self.cache
    }

    /// Drop every cached tree. The committed tree stays in use.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Pick the starting locale and load it.
    ///
    /// Order: `explicit` if supported, then the stored preference if
    /// supported, then the best `Accept-Language` match, then the default.
    pub async fn initialize(&self, explicit: Option<Locale>, accept_language: Option<&str>) -> Locale {
        let locale = self.initial_locale(explicit, accept_language).await;
        info!("Initializing translations with locale {}", locale);

        let generation = self.begin(&locale);
        self.load(&locale, generation).await;
        locale
    }

    async fn initial_locale(&self, explicit: Option<Locale>, accept_language: Option<&str>) -> Locale {
        let locales = self.locales.read().clone();

        if let Some(locale) = explicit {
            if locales.contains(&locale) {
                return locale;
            }
            warn!("Requested locale {} is not supported", locale);
        }

        match self.preferences.load().await {
            Ok(Some(locale)) if locales.contains(&locale) => return locale,
            Ok(_) => {}
            Err(e) => warn!("Failed to read stored locale preference: {}", e),
        }

        if let Some(locale) = accept_language.and_then(|header| locales.negotiate(header)) {
            return locale.clone();
        }

        locales.default_locale().clone()
    }

    /// Switch to `locale`. Returns `false` (and does nothing) when it is
    /// already active or not supported.
    ///
    /// The choice is persisted best-effort; a storage failure is logged and
    /// the switch proceeds.
    pub async fn set_locale(&self, locale: Locale) -> bool {
        if locale == self.locale() {
            debug!("Locale {} already active", locale);
            return false;
        }
        if !self.is_supported(&locale) {
            warn!("Ignoring unsupported locale {}", locale);
            return false;
        }

        let generation = self.begin(&locale);

        if let Err(e) = self.preferences.save(&locale).await {
            warn!("Failed to persist locale preference {}: {}", locale, e);
        }

        self.load(&locale, generation).await;
        true
    }

    /// Make `locale` active in the loading state and return its generation.
    fn begin(&self, locale: &Locale) -> u64 {
        let mut active = self.active.write();
        active.generation += 1;
        active.locale = locale.clone();
        active.state = LocaleState::Loading;
        self.snapshots.send_replace(active.snapshot());
        active.generation
    }

    async fn load(&self, locale: &Locale, generation: u64) {
        let resolved = self.resolve(locale).await;

        let mut active = self.active.write();
        if active.generation != generation {
            debug!(
                "Discarding translations for {} (generation {} superseded by {})",
                locale, generation, active.generation
            );
            return;
        }

        if !resolved.tree.is_empty() {
            active.tree = resolved.tree.clone();
        }
        active.state = if resolved.fallback || resolved.tree.is_empty() {
            LocaleState::Fallback
        } else {
            LocaleState::Ready
        };
        self.snapshots.send_replace(active.snapshot());
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// The tree for `locale`: cached, freshly fetched, the default locale's
    /// tree when that fails, or an empty tree when the default itself fails.
    pub async fn get_translations(&self, locale: &Locale) -> Arc<TranslationTree> {
        self.resolve(locale).await.tree
    }

    async fn resolve(&self, locale: &Locale) -> Resolved {
        if let Some(tree) = self.fetch_cached(locale).await {
            return Resolved {
                tree,
                fallback: false,
            };
        }

        let default = self.default_locale();
        if *locale != default {
            if let Some(tree) = self.fetch_cached(&default).await {
                warn!("Using {} translations in place of {}", default, locale);
                return Resolved {
                    tree,
                    fallback: true,
                };
            }
        }

        Resolved {
            tree: Arc::new(TranslationTree::new()),
            fallback: true,
        }
    }

    /// Cache hit, or a fetch that produced a non-empty tree (then cached).
    async fn fetch_cached(&self, locale: &Locale) -> Option<Arc<TranslationTree>> {
        if let Some(tree) = self.cache.get(locale) {
            return Some(tree);
        }

        match self.repository.fetch_translations(locale).await {
            Ok(tree) if !tree.is_empty() => Some(self.cache.insert(locale.clone(), tree)),
            Ok(_) => {
                warn!("Translations for {} are empty", locale);
                None
            }
            Err(e) => {
                warn!("Failed to load translations for {}: {}", locale, e);
                None
            }
        }
    }

    /// Refetch the supported locale list. On failure the known list is
    /// kept. Returns the list now in effect.
    pub async fn refresh_supported_locales(&self) -> Vec<Locale> {
        match self.repository.fetch_locale_set().await {
            Ok(set) => {
                debug!(
                    "Supported locales: {:?}, default {}",
                    set.supported().iter().map(Locale::tag).collect::<Vec<_>>(),
                    set.default_locale()
                );
                *self.locales.write() = set;
            }
            Err(e) => warn!("Keeping known locales, discovery failed: {}", e),
        }
        self.supported_locales()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Translate `key` against the committed tree, interpolating `params`.
    /// Missing keys come back unchanged.
    pub fn lookup(&self, key: &str, params: &[(&str, &str)]) -> String {
        let missing_in = {
            let active = self.active.read();
            match active.tree.lookup(key) {
                Some(template) => return interpolate(template, params),
                None => active.locale.clone(),
            }
        };

        let hook = self.missing_key_hook.read().clone();
        if let Some(hook) = hook {
            hook(key, &missing_in);
        }
        key.to_string()
    }

    /// Translate without parameters.
    pub fn t(&self, key: &str) -> String {
        self.lookup(key, &[])
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.active.read();
        f.debug_struct("Translator")
            .field("locale", &active.locale)
            .field("state", &active.state)
            .field("generation", &active.generation)
            .field("cached", &self.cache.len())
            .finish()
    }
}
