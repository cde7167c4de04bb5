//! Locale representation, the supported locale set, and Accept-Language
//! negotiation.

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A locale tag: language plus optional script and region.
///
/// Serialized as its tag string (`"en-US"`), which is also the file stem
/// used for translation documents.
///
/// # Examples
///
/// ```
/// use gazette_i18n::Locale;
///
/// let ja: Locale = "JA".parse().unwrap();
/// assert_eq!(ja.tag(), "ja");
///
/// let en_us = Locale::parse("en_us").unwrap();
/// assert_eq!(en_us.tag(), "en-US");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    /// Language code, lowercase (ISO 639)
    pub language: String,
    /// Optional script, title case (e.g. "Hans")
    pub script: Option<String>,
    /// Optional region, uppercase (ISO 3166-1 or UN M.49)
    pub region: Option<String>,
}

impl Locale {
    /// Create a locale from a language and optional region, normalizing case.
    pub fn new(language: impl Into<String>, region: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            script: None,
            region: region.map(|r| r.into().to_uppercase()),
        }
    }

    /// Parse a BCP 47 style tag (`en`, `en-US`, `zh_Hans_CN`).
    pub fn parse(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        let mut parts = tag.split(['-', '_']);

        let language = parts.next().unwrap_or_default().to_lowercase();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }

        let mut script = None;
        let mut region = None;

        for part in parts {
            if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) && script.is_none() {
                let mut chars = part.chars();
                script = chars
                    .next()
                    .map(|first| first.to_ascii_uppercase().to_string() + &chars.as_str().to_lowercase());
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                region = Some(part.to_uppercase());
            } else if part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()) {
                region = Some(part.to_string());
            } else {
                return Err(I18nError::InvalidLocale(tag.to_string()));
            }
        }

        Ok(Self {
            language,
            script,
            region,
        })
    }

    /// The normalized tag (e.g. `"en-US"`).
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        if let Some(ref script) = self.script {
            tag.push('-');
            tag.push_str(script);
        }
        if let Some(ref region) = self.region {
            tag.push('-');
            tag.push_str(region);
        }
        tag
    }

    /// Same locale without the region.
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: self.script.clone(),
            region: None,
        }
    }

    /// Match score against another locale (higher is better, 0 is no match).
    ///
    /// - 100: identical
    /// - 50: language and region
    /// - 25: language and script
    /// - 10: language only
    pub fn match_score(&self, other: &Locale) -> u32 {
        if self.language != other.language {
            return 0;
        }
        if self == other {
            return 100;
        }

        let mut score = 10;
        if self.region.is_some() && self.region == other.region {
            score += 40;
        }
        if self.script.is_some() && self.script == other.script {
            score += 15;
        }
        score
    }

    /// Japanese
    pub fn ja() -> Self {
        Self::new("ja", None::<&str>)
    }

    /// English (no region)
    pub fn en() -> Self {
        Self::new("en", None::<&str>)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = I18nError;

    fn try_from(value: String) -> Result<Self> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag()
    }
}

// ============================================================================
// Supported set
// ============================================================================

/// The locales the portal can display, and the one used as the last resort.
///
/// The default is always a member of the supported list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    supported: Vec<Locale>,
    default: Locale,
}

impl LocaleSet {
    /// Build a set, rejecting an empty list or a default outside it.
    pub fn new(supported: Vec<Locale>, default: Locale) -> Result<Self> {
        if supported.is_empty() {
            return Err(I18nError::Malformed("supported locale list is empty".to_string()));
        }
        if !supported.contains(&default) {
            return Err(I18nError::UnsupportedLocale(default.tag()));
        }

        let mut deduped: Vec<Locale> = Vec::with_capacity(supported.len());
        for locale in supported {
            if !deduped.contains(&locale) {
                deduped.push(locale);
            }
        }

        Ok(Self {
            supported: deduped,
            default,
        })
    }

    /// Build a set from tag strings.
    pub fn from_tags<S: AsRef<str>>(supported: &[S], default: &str) -> Result<Self> {
        let supported = supported
            .iter()
            .map(|tag| Locale::parse(tag.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(supported, Locale::parse(default)?)
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn contains(&self, locale: &Locale) -> bool {
        self.supported.contains(locale)
    }

    /// Best supported locale for an `Accept-Language` header, if any entry
    /// matches at least by language.
    pub fn negotiate(&self, accept_language: &str) -> Option<&Locale> {
        let requested = parse_accept_language(accept_language);
        requested
            .iter()
            .find_map(|req| best_match(req, &self.supported))
    }
}

impl Default for LocaleSet {
    fn default() -> Self {
        Self {
            supported: vec![Locale::ja(), Locale::en()],
            default: Locale::ja(),
        }
    }
}

/// Wire form of the locale manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleManifest {
    pub supported_locales: Vec<String>,
    pub default_locale: String,
}

impl TryFrom<LocaleManifest> for LocaleSet {
    type Error = I18nError;

    fn try_from(manifest: LocaleManifest) -> Result<Self> {
        LocaleSet::from_tags(manifest.supported_locales.as_slice(), &manifest.default_locale)
    }
}

// ============================================================================
// Accept-Language Parsing
// ============================================================================

#[derive(Debug, Clone)]
struct AcceptLanguageEntry {
    locale: Locale,
    quality: f32,
}

/// Parse an Accept-Language header into locales, best first.
///
/// Wildcards, malformed tags, and `q=0` entries are skipped; equal
/// qualities keep header order.
///
/// ```
/// use gazette_i18n::parse_accept_language;
///
/// let locales = parse_accept_language("en-US,en;q=0.9,ja;q=0.95,*;q=0.1");
/// let tags: Vec<_> = locales.iter().map(|l| l.tag()).collect();
/// assert_eq!(tags, ["en-US", "ja", "en"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<Locale> {
    let mut entries: Vec<AcceptLanguageEntry> = header
        .split(',')
        .filter_map(|part| {
            let mut split = part.trim().splitn(2, ';');
            let tag = split.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let quality = split
                .next()
                .and_then(|q| q.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality <= 0.0 {
                return None;
            }

            let locale = Locale::parse(tag).ok()?;
            Some(AcceptLanguageEntry { locale, quality })
        })
        .collect();

    // stable sort keeps header order for ties
    entries.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    entries.into_iter().map(|e| e.locale).collect()
}

/// Pick the first requested locale that any available locale matches,
/// otherwise `default`.
pub fn negotiate_locale<'a>(
    requested: &[Locale],
    available: &'a [Locale],
    default: &'a Locale,
) -> &'a Locale {
    requested
        .iter()
        .find_map(|req| best_match(req, available))
        .unwrap_or(default)
}

/// Highest scoring available locale for one request, first wins on ties.
pub fn best_match<'a>(requested: &Locale, available: &'a [Locale]) -> Option<&'a Locale> {
    let mut best: Option<(&Locale, u32)> = None;

    for locale in available {
        let score = locale.match_score(requested);
        if score == 0 {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((locale, score)),
        }
    }

    best.map(|(l, _)| l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        let ja = Locale::parse("ja").unwrap();
        assert_eq!(ja.language, "ja");
        assert!(ja.region.is_none());

        let en_us = Locale::parse("EN_us").unwrap();
        assert_eq!(en_us.language, "en");
        assert_eq!(en_us.region, Some("US".to_string()));

        let zh = Locale::parse("zh-hans-CN").unwrap();
        assert_eq!(zh.tag(), "zh-Hans-CN");
    }

    #[test]
    fn test_invalid_locales() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("e").is_err());
        assert!(Locale::parse("english").is_err());
        assert!(Locale::parse("en-!!").is_err());
        assert!(Locale::parse("j1").is_err());
    }

    #[test]
    fn test_serde_uses_tag() {
        let json = serde_json::to_string(&Locale::new("en", Some("gb"))).unwrap();
        assert_eq!(json, "\"en-GB\"");

        let back: Locale = serde_json::from_str("\"ja\"").unwrap();
        assert_eq!(back, Locale::ja());
        assert!(serde_json::from_str::<Locale>("\"???\"").is_err());
    }

    #[test]
    fn test_locale_set_requires_default_member() {
        let err = LocaleSet::from_tags(&["ja", "en"], "fr").unwrap_err();
        assert!(matches!(err, I18nError::UnsupportedLocale(_)));

        let empty: [&str; 0] = [];
        assert!(LocaleSet::from_tags(&empty, "ja").is_err());
    }

    #[test]
    fn test_locale_set_dedupes() {
        let set = LocaleSet::from_tags(&["ja", "JA", "en"], "ja").unwrap();
        assert_eq!(set.supported().len(), 2);
    }

    #[test]
    fn test_default_set() {
        let set = LocaleSet::default();
        assert_eq!(set.default_locale(), &Locale::ja());
        assert!(set.contains(&Locale::en()));
    }

    #[test]
    fn test_parse_accept_language_order() {
        let locales = parse_accept_language("fr;q=0.5, en-US, ja;q=0.8, de;q=0");
        let tags: Vec<_> = locales.iter().map(Locale::tag).collect();
        assert_eq!(tags, ["en-US", "ja", "fr"]);
    }

    #[test]
    fn test_negotiate_by_language() {
        let set = LocaleSet::default();
        assert_eq!(set.negotiate("en-US,en;q=0.9"), Some(&Locale::en()));
        assert_eq!(set.negotiate("de,fr;q=0.5"), None);
    }

    #[test]
    fn test_negotiate_locale_fallback() {
        let available = vec![Locale::ja(), Locale::en()];
        let default = Locale::ja();
        let requested = parse_accept_language("de,fr");

        assert_eq!(negotiate_locale(&requested, &available, &default), &default);
    }

    #[test]
    fn test_match_score() {
        let en_us = Locale::new("en", Some("US"));
        assert_eq!(en_us.match_score(&en_us), 100);
        assert_eq!(en_us.match_score(&Locale::en()), 10);
        assert_eq!(en_us.match_score(&Locale::ja()), 0);
    }

    #[test]
    fn test_manifest_conversion() {
        let manifest: LocaleManifest =
            serde_json::from_str(r#"{"supportedLocales":["en","ja"],"defaultLocale":"en"}"#)
                .unwrap();
        let set = LocaleSet::try_from(manifest).unwrap();
        assert_eq!(set.default_locale(), &Locale::en());
        assert_eq!(set.supported(), &[Locale::en(), Locale::ja()]);
    }
}
