//! Loosely typed JSON configuration.
//!
//! [`Config`] wraps a JSON object and exposes key lookups without requiring a
//! schema. Keys may be dotted paths (`"text_config.hidden_size"`); numeric
//! segments index into arrays. Each segment also matches its camelCase or
//! snake_case spelling, so `"modelType"` finds `"model_type"` and vice versa.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Parse a JSON document whose root is an object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(Error::Parse(serde::de::Error::custom(
                "configuration root is not a JSON object",
            ))),
        }
    }

    /// Read and parse the JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = lookup(&self.values, first)?;

        for segment in segments {
            current = match current {
                Value::Object(map) => lookup(map, segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.as_u64()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key)?.as_array()
    }

    /// Nested object at `key` as its own [`Config`].
    pub fn get_config(&self, key: &str) -> Option<Config> {
        self.get(key)?.as_object().cloned().map(Config::new)
    }

    /// Top-level keys, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key)
        .or_else(|| map.get(&snake_case(key)))
        .or_else(|| map.get(&camel_case(key)))
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' && !out.is_empty() {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Config {
        Config::from_value(json!({
            "model_type": "bert",
            "hiddenSize": 768,
            "is_decoder": false,
            "layer_norm_eps": 1e-12,
            "architectures": ["BertModel"],
            "text_config": { "vocab_size": 30522, "max_position_embeddings": 512 }
        }))
        .unwrap()
    }

    #[test]
    fn plain_lookups() {
        let config = sample();
        assert_eq!(config.get_str("model_type"), Some("bert"));
        assert_eq!(config.get_bool("is_decoder"), Some(false));
        assert_eq!(config.get_f64("layer_norm_eps"), Some(1e-12));
        assert!(config.get("missing").is_none());
    }

    #[test]
    fn case_insensitive_between_camel_and_snake() {
        let config = sample();
        assert_eq!(config.get_str("modelType"), Some("bert"));
        assert_eq!(config.get_i64("hidden_size"), Some(768));
        assert_eq!(config.get_i64("hiddenSize"), Some(768));
    }

    #[test]
    fn dotted_paths_and_indices() {
        let config = sample();
        assert_eq!(config.get_u64("text_config.vocab_size"), Some(30522));
        assert_eq!(config.get_u64("textConfig.maxPositionEmbeddings"), Some(512));
        assert_eq!(config.get_str("architectures.0"), Some("BertModel"));
        assert!(config.get("architectures.3").is_none());
        assert!(config.get("model_type.inner").is_none());
    }

    #[test]
    fn nested_config() {
        let nested = sample().get_config("text_config").unwrap();
        assert_eq!(nested.get_u64("vocab_size"), Some(30522));
        assert_eq!(nested.keys().count(), 2);
    }

    #[test]
    fn root_must_be_object() {
        assert!(matches!(Config::from_slice(b"[]"), Err(Error::Parse(_))));
        assert!(matches!(Config::from_slice(b"{"), Err(Error::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"torch_dtype": "float32"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.get_str("torchDtype"), Some("float32"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Config::load(dir.path().join("nope.json")), Err(Error::Io(_))));
    }

    #[test]
    fn case_conversion() {
        assert_eq!(snake_case("maxPositionEmbeddings"), "max_position_embeddings");
        assert_eq!(camel_case("max_position_embeddings"), "maxPositionEmbeddings");
        assert_eq!(camel_case("_private"), "_private");
    }
}
