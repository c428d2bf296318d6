//! Process-wide settings, loaded once at startup.
//!
//! Settings come from `<config_dir>/modelshelf/config.json` when it exists,
//! then environment variables override individual fields:
//! - `MODELSHELF_AUTO_TAG_NEW` - Tag applied to newly scanned models
//! - `MODELSHELF_DATABASE` - Path to the SQLite database file
//! - `MODELSHELF_PORT` - Port for the HTTP API
//! - `MODELSHELF_LOCALE_FILE` - JSON file with translation overrides

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "modelshelf";
const CONFIG_FILE: &str = "config.json";

/// Default tag marking a model as newly added.
pub const DEFAULT_AUTO_TAG_NEW: &str = "!new";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tag added by tag autogeneration and shown as a "new" badge.
    /// An empty string disables the behaviour.
    pub auto_tag_new: String,
    /// SQLite database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Port for the HTTP API.
    pub port: u16,
    /// Extra translations merged over the built-in English table.
    pub locale_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_tag_new: DEFAULT_AUTO_TAG_NEW.to_string(),
            database_path: None,
            port: 3000,
            locale_file: None,
        }
    }
}

impl Settings {
    /// Load settings from the user's config directory and the environment.
    pub fn load() -> Result<Self> {
        let settings = match get_config_path() {
            Ok(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply environment overrides. `lookup` is injected so tests don't touch
    /// the real process environment.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(tag) = lookup("MODELSHELF_AUTO_TAG_NEW") {
            self.auto_tag_new = tag;
        }
        if let Some(path) = lookup("MODELSHELF_DATABASE") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(port) = lookup("MODELSHELF_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid MODELSHELF_PORT: {}", port))?;
        }
        if let Some(path) = lookup("MODELSHELF_LOCALE_FILE") {
            self.locale_file = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    /// The sentinel "new" tag, or `None` when disabled.
    pub fn new_tag(&self) -> Option<&str> {
        let tag = self.auto_tag_new.trim();
        (!tag.is_empty()).then_some(tag)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
