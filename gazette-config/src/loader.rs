// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format from a file path's extension.
    pub fn detect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError(format!("No file extension: {}", path.display())))?;

        Self::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse configuration from string. The result is always a JSON object
    /// with lowercased top-level keys.
    pub fn parse(&self, content: &str) -> Result<Value> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => parse_toml(content)?,
            FileFormat::Env => parse_env(content),
        };

        match value {
            Value::Object(map) => Ok(Value::Object(
                map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
            )),
            _ => Err(ConfigError::ParseError(
                "configuration root must be a table".to_string(),
            )),
        }
    }
}

fn parse_toml(content: &str) -> Result<Value> {
    let toml_value: toml::Value = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    serde_json::to_value(toml_value).map_err(|e| ConfigError::SerializationError(e.to_string()))
}

fn parse_env(content: &str) -> Value {
    let mut map = serde_json::Map::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let key = key
                .strip_prefix(crate::env::DEFAULT_PREFIX)
                .and_then(|rest| rest.strip_prefix('_'))
                .unwrap_or(key);
            let value = value.trim().trim_matches('"').trim_matches('\'');
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let result = loader.parse(r#"{"Page_Size": 20}"#).unwrap();
        assert_eq!(result["page_size"], 20);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            api_base_url = "http://localhost:4100"
            supported_locales = ["ja", "en"]
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result["api_base_url"], "http://localhost:4100");
        assert_eq!(result["supported_locales"][1], "en");
    }

    #[test]
    fn test_parse_env_strips_prefix() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let env = r#"
            GAZETTE_PAGE_SIZE=20
            # Comment
            DEFAULT_LOCALE="en"
        "#;

        let result = loader.parse(env).unwrap();
        assert_eq!(result["page_size"], "20");
        assert_eq!(result["default_locale"], "en");
    }

    #[test]
    fn test_non_table_root_is_rejected() {
        let loader = ConfigLoader::new(FileFormat::Json);
        assert!(loader.parse("[1, 2]").is_err());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::detect("gazette.toml").unwrap(), FileFormat::Toml);
        assert_eq!(FileFormat::detect("gazette.json").unwrap(), FileFormat::Json);
        assert!(FileFormat::detect("gazette").is_err());
        assert_eq!(FileFormat::from_extension("unknown"), None);
    }
}
