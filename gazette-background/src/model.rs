//! Background variants and the per-route settings document.

use crate::{BackgroundError, Result};
use gazette_log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Playback flags for a video background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoOptions {
    pub auto_play: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub muted: bool,
    pub controls: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            auto_play: true,
            looping: true,
            muted: true,
            controls: false,
        }
    }
}

/// One page's background.
///
/// Decoding never fails: an entry with an unknown `type` (such as `threejs`)
/// or without the attributes its type needs becomes [`Background::Unsupported`],
/// which renders as no decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", from = "Value")]
pub enum Background {
    Color {
        value: String,
    },
    Image {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Video {
        src: String,
        options: VideoOptions,
    },
    Unsupported,
}

fn str_field(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

impl Background {
    /// Decode one settings entry, dispatching on its `type` field.
    pub fn from_entry(entry: &Value) -> Self {
        let kind = entry.get("type").and_then(Value::as_str).unwrap_or_default();

        let decoded = match kind {
            "color" => str_field(entry, "value").map(|value| Self::Color { value }),
            "image" => str_field(entry, "src").map(|src| Self::Image {
                src,
                alt: str_field(entry, "alt"),
            }),
            "video" => str_field(entry, "src").map(|src| Self::Video {
                src,
                options: entry
                    .get("options")
                    .cloned()
                    .and_then(|o| serde_json::from_value(o).ok())
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        decoded.unwrap_or_else(|| {
            debug!("Background type {:?} is not rendered", kind);
            Self::Unsupported
        })
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Flattened description for the rendering layer.
    pub fn render_hint(&self) -> RenderHint {
        match self {
            Self::Color { value } => RenderHint::Color { css: value.clone() },
            Self::Image { src, alt } => RenderHint::Image {
                src: src.clone(),
                alt: alt.clone().unwrap_or_default(),
            },
            Self::Video { src, options } => RenderHint::Video {
                src: src.clone(),
                auto_play: options.auto_play,
                looping: options.looping,
                muted: options.muted,
                controls: options.controls,
                plays_inline: true,
            },
            Self::Unsupported => RenderHint::None,
        }
    }
}

impl From<Value> for Background {
    fn from(entry: Value) -> Self {
        Self::from_entry(&entry)
    }
}

/// What the renderer should draw behind a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderHint {
    None,
    Color {
        css: String,
    },
    Image {
        src: String,
        alt: String,
    },
    Video {
        src: String,
        auto_play: bool,
        looping: bool,
        muted: bool,
        controls: bool,
        plays_inline: bool,
    },
}

/// The route-keyed settings document. Always has a `default` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundSettings {
    default: Background,
    routes: BTreeMap<String, Background>,
}

impl BackgroundSettings {
    pub const DEFAULT_KEY: &'static str = "default";

    pub fn new(default: Background) -> Self {
        Self {
            default,
            routes: BTreeMap::new(),
        }
    }

    pub fn with_route(mut self, key: impl Into<String>, background: Background) -> Self {
        let key = key.into();
        if key == Self::DEFAULT_KEY {
            self.default = background;
        } else {
            self.routes.insert(key, background);
        }
        self
    }

    /// Decode a whole document. It must be an object with a `default` key.
    pub fn from_value(document: Value) -> Result<Self> {
        let Value::Object(entries) = document else {
            return Err(BackgroundError::Malformed(
                "settings document must be a JSON object".to_string(),
            ));
        };

        let mut default = None;
        let mut routes = BTreeMap::new();
        for (key, entry) in entries {
            let background = Background::from_entry(&entry);
            if key == Self::DEFAULT_KEY {
                default = Some(background);
            } else {
                routes.insert(key, background);
            }
        }

        let default = default.ok_or(BackgroundError::MissingDefault)?;
        Ok(Self { default, routes })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn default_background(&self) -> &Background {
        &self.default
    }

    /// The entry stored under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&Background> {
        if key == Self::DEFAULT_KEY {
            return Some(&self.default);
        }
        self.routes.get(key)
    }

    /// The entry for `key`, else the default entry.
    pub fn lookup(&self, key: &str) -> &Background {
        self.get(key).unwrap_or(&self.default)
    }

    /// Route keys other than `default`, sorted.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl TryFrom<Value> for BackgroundSettings {
    type Error = BackgroundError;

    fn try_from(document: Value) -> Result<Self> {
        Self::from_value(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variant_dispatch() {
        assert_eq!(
            Background::from(json!({"type": "color", "value": "#101820"})),
            Background::Color {
                value: "#101820".to_string()
            }
        );
        assert_eq!(
            Background::from(json!({"type": "image", "src": "/img/hero.jpg"})),
            Background::Image {
                src: "/img/hero.jpg".to_string(),
                alt: None
            }
        );
        assert_eq!(
            Background::from(json!({"type": "threejs", "sceneId": "globe"})),
            Background::Unsupported
        );
        assert_eq!(Background::from(json!({"type": "color"})), Background::Unsupported);
        assert_eq!(Background::from(json!("red")), Background::Unsupported);
    }

    #[test]
    fn test_video_options_default_per_flag() {
        let bg = Background::from(json!({
            "type": "video",
            "src": "/v/intro.mp4",
            "options": {"controls": true, "muted": false}
        }));

        assert_eq!(
            bg.render_hint(),
            RenderHint::Video {
                src: "/v/intro.mp4".to_string(),
                auto_play: true,
                looping: true,
                muted: false,
                controls: true,
                plays_inline: true,
            }
        );
    }

    #[test]
    fn test_serde_uses_type_tag() {
        let bg: Background = serde_json::from_value(json!({"type": "image", "src": "/a.png", "alt": "A"})).unwrap();
        assert_eq!(
            serde_json::to_value(&bg).unwrap(),
            json!({"type": "image", "src": "/a.png", "alt": "A"})
        );
    }

    #[test]
    fn test_settings_require_default() {
        let err = BackgroundSettings::from_value(json!({"home": {"type": "color", "value": "#fff"}}))
            .unwrap_err();
        assert!(matches!(err, BackgroundError::MissingDefault));

        let err = BackgroundSettings::from_value(json!([])).unwrap_err();
        assert!(matches!(err, BackgroundError::Malformed(_)));
    }

    #[test]
    fn test_settings_lookup_falls_back() {
        let settings = BackgroundSettings::from_json(
            r##"{
                "default": {"type": "color", "value": "#000000"},
                "home": {"type": "image", "src": "/img/home.jpg", "alt": "Skyline"}
            }"##,
        )
        .unwrap();

        assert_eq!(settings.lookup("home").render_hint(), RenderHint::Image {
            src: "/img/home.jpg".to_string(),
            alt: "Skyline".to_string(),
        });
        assert_eq!(settings.lookup("nowhere"), settings.default_background());
        assert_eq!(settings.routes().collect::<Vec<_>>(), vec!["home"]);
    }
}
