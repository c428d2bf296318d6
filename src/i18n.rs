//! Translation lookup table.
//!
//! Translations are loaded once at startup into a flat key/value map. Nested
//! JSON objects are flattened with `.` separators, so
//! `{"licenses": {"MIT": "MIT License"}}` is looked up as `licenses.MIT`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

const BUILTIN_EN: &str = include_str!("../locales/en.json");

#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: HashMap<String, String>,
}

impl Translations {
    /// The built-in English table.
    pub fn builtin() -> Result<Self> {
        let mut translations = Self::default();
        translations
            .merge_json(BUILTIN_EN)
            .context("Failed to parse built-in translations")?;
        Ok(translations)
    }

    /// The built-in table with an optional override file merged on top.
    pub fn load(override_file: Option<&Path>) -> Result<Self> {
        let mut translations = Self::builtin()?;
        if let Some(path) = override_file {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read locale file {}", path.display()))?;
            translations
                .merge_json(&content)
                .with_context(|| format!("Failed to parse locale file {}", path.display()))?;
            tracing::info!("Loaded translation overrides from {}", path.display());
        }
        Ok(translations)
    }

    /// Merge a JSON document into the table. Later values win.
    pub fn merge_json(&mut self, json: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        flatten_into(&mut self.entries, String::new(), value);
        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up `key`, falling back to `default` when it is missing.
    pub fn t(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or(default).to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: String, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(entries, key, child);
            }
        }
        Value::String(s) => {
            entries.insert(prefix, s);
        }
        Value::Null => {}
        other => {
            entries.insert(prefix, other.to_string());
        }
    }
}
