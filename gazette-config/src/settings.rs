//! Typed view of the portal client settings.

use crate::{ConfigManager, ConfigValidator, Result, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings consumed by the portal session.
///
/// Every field has a default matching the stock deployment, so an empty
/// environment yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalSettings {
    /// Base URL of the REST API (`/api/{entity}`).
    pub api_base_url: String,
    /// Base URL serving static documents (locales, page configs).
    pub assets_base_url: String,
    /// Items requested per listing page.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Ultimate fallback locale.
    pub default_locale: String,
    /// Locales known before discovery runs.
    pub supported_locales: Vec<String>,
    /// Directory holding `{locale}.json` translation trees.
    pub locales_path: String,
    /// Locale manifest listing supported locales and the default.
    pub locale_manifest_path: String,
    /// Page background settings document.
    pub background_config_path: String,
    /// File used to persist the chosen locale. `None` keeps it in memory.
    pub preference_file: Option<PathBuf>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4100".to_string(),
            assets_base_url: "http://localhost:3000".to_string(),
            page_size: 50,
            request_timeout_secs: 30,
            default_locale: "ja".to_string(),
            supported_locales: vec!["ja".to_string(), "en".to_string()],
            locales_path: "/locales".to_string(),
            locale_manifest_path: "/locales/manifest.json".to_string(),
            background_config_path: "/configs/pageBackgrounds.json".to_string(),
            preference_file: None,
        }
    }
}

impl PortalSettings {
    /// Build settings from whatever layers the manager holds, then validate.
    pub fn from_manager(manager: &ConfigManager) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(v) = manager.get_parsed("api_base_url")? {
            settings.api_base_url = v;
        }
        if let Some(v) = manager.get_parsed("assets_base_url")? {
            settings.assets_base_url = v;
        }
        if let Some(v) = manager.get_parsed("page_size")? {
            settings.page_size = v;
        }
        if let Some(v) = manager.get_parsed("request_timeout_secs")? {
            settings.request_timeout_secs = v;
        }
        if let Some(v) = manager.get_parsed("default_locale")? {
            settings.default_locale = v;
        }
        if let Some(v) = manager.get_list("supported_locales")? {
            settings.supported_locales = v;
        }
        if let Some(v) = manager.get_parsed("locales_path")? {
            settings.locales_path = v;
        }
        if let Some(v) = manager.get_parsed("locale_manifest_path")? {
            settings.locale_manifest_path = v;
        }
        if let Some(v) = manager.get_parsed("background_config_path")? {
            settings.background_config_path = v;
        }
        if let Some(v) = manager.get_parsed::<String>("preference_file")? {
            settings.preference_file = Some(PathBuf::from(v));
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Validate for PortalSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_url(&self.api_base_url, "api_base_url")?;
        ConfigValidator::is_url(&self.assets_base_url, "assets_base_url")?;
        ConfigValidator::in_range(self.page_size, 1, 500, "page_size")?;
        ConfigValidator::in_range(self.request_timeout_secs, 1, 600, "request_timeout_secs")?;
        ConfigValidator::not_empty(&self.default_locale, "default_locale")?;
        ConfigValidator::one_of(
            &self.default_locale,
            &self.supported_locales,
            "default_locale",
        )?;
        ConfigValidator::is_path(&self.locales_path, "locales_path")?;
        ConfigValidator::is_path(&self.locale_manifest_path, "locale_manifest_path")?;
        ConfigValidator::is_path(&self.background_config_path, "background_config_path")?;
        Ok(())
    }
}
