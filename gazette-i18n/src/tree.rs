//! Nested translation trees and key lookup.

use crate::{I18nError, Result};
use serde_json::{Map, Value};

/// A loaded translation document for one locale.
///
/// Leaves are strings; inner nodes are objects addressed with dot-delimited
/// keys (`"nav.home"`). Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationTree {
    root: Map<String, Value>,
}

impl TranslationTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a decoded document. The root must be a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(I18nError::Malformed(format!(
                "translation root must be an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Walk `key` segment by segment. `None` when a segment is missing, an
    /// intermediate node is not an object, or the leaf is not a string.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut node = self.root.get(first)?;

        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }

        node.as_str()
    }

    /// Resolve `key` and interpolate `params`, or return `key` unchanged.
    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        match self.lookup(key) {
            Some(template) => interpolate(template, params),
            None => key.to_string(),
        }
    }

    /// The raw document.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

impl TryFrom<Value> for TranslationTree {
    type Error = I18nError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Replace every `{name}` with its value in one left-to-right pass.
///
/// Values are inserted verbatim and never scanned again, so a value that
/// looks like a placeholder stays as written. Placeholders without a
/// matching parameter are left in place.
///
/// ```
/// use gazette_i18n::interpolate;
///
/// let text = interpolate("{n} new in {section}", &[("n", "3"), ("section", "$research")]);
/// assert_eq!(text, "3 new in $research");
/// ```
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
