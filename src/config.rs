//! Stager configuration.
//!
//! Handles loading, validating, and merging `stager.toml`. The file lives at
//! the blog root and is optional: stock defaults match the common Astro blog
//! layout, and a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! posts_dir = "src/content/posts"   # Staged documents, relative to the root
//! images_dir = "src/assets/images"  # Images root; per-post images go in posts/
//!
//! [defaults]
//! tags = ["未分类"]                  # Tags when none are given on the command line
//! lang = "zh"                       # Front matter `lang`
//! toc = true                        # Front matter `toc`
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the configuration file at the blog root.
pub const CONFIG_FILENAME: &str = "stager.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Stager configuration loaded from `stager.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StagerConfig {
    /// Directory of staged posts, relative to the blog root.
    pub posts_dir: String,
    /// Images root, relative to the blog root. Per-post images live in its
    /// `posts/` subdirectory and are referenced as `/<images_dir>/posts/...`.
    pub images_dir: String,
    /// Front matter defaults for newly staged posts.
    pub defaults: FrontMatterDefaults,
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            posts_dir: "src/content/posts".to_string(),
            images_dir: "src/assets/images".to_string(),
            defaults: FrontMatterDefaults::default(),
        }
    }
}

impl StagerConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("posts_dir", &self.posts_dir), ("images_dir", &self.images_dir)] {
            if value.trim().trim_matches('/').is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
            if Path::new(value).is_absolute() {
                return Err(ConfigError::Validation(format!(
                    "{key} must be relative to the blog root"
                )));
            }
        }
        if self.defaults.tags.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "defaults.tags must contain at least one tag".into(),
            ));
        }
        if self.defaults.lang.trim().is_empty() {
            return Err(ConfigError::Validation(
                "defaults.lang must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Front matter values used when the command line doesn't supply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatterDefaults {
    pub tags: Vec<String>,
    pub lang: String,
    pub toc: bool,
}

impl Default for FrontMatterDefaults {
    fn default() -> Self {
        Self {
            tags: vec!["未分类".to_string()],
            lang: "zh".to_string(),
            toc: true,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StagerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `stager.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from the blog root: stock defaults overlaid with `stager.toml`,
/// unknown keys rejected, result validated.
pub fn load_config(root: &Path) -> Result<StagerConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: StagerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// A fully-commented stock `stager.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# post-stager configuration
# =========================
# All settings are optional. Values shown below are the defaults.
# Place this file at the blog root as stager.toml.
# Unknown keys will cause an error.

# Where staged posts are written, relative to the blog root.
# `add` places each post in a subdirectory of this (YYYY/MM by default).
posts_dir = "src/content/posts"

# Images root, relative to the blog root.
# Each post gets its own directory: <images_dir>/posts/<abbrlink>/
# and documents reference images as /<images_dir>/posts/<abbrlink>/<file>.
images_dir = "src/assets/images"

# ---------------------------------------------------------------------------
# Front matter defaults for newly staged posts
# ---------------------------------------------------------------------------
[defaults]
# Tags used when none are given with --tags.
tags = ["未分类"]

# Value of the `lang` field.
lang = "zh"

# Value of the `toc` field.
toc = true
"##
}
