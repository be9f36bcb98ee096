//! Shared configuration for rfgate tools.
//!
//! A TOML file under the platform config dir, overlaid with `RFGATE_*`
//! environment variables, translated into `rfgate_core::StoreConfig` and
//! an undo history limit. The CLI adds flag-aware wrappers on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rfgate_core::undo::DEFAULT_UNDO_LIMIT;
use rfgate_core::{LayoutConfig, StoreConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Tray and cabinet geometry.
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub history: History,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct History {
    /// Undo groups kept before the oldest is dropped.
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_limit: default_undo_limit(),
        }
    }
}

fn default_undo_limit() -> usize {
    DEFAULT_UNDO_LIMIT
}

impl Config {
    /// Reject values the store cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.undo_limit == 0 {
            return Err(ConfigError::Validation {
                field: "history.undo_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        let layout = &self.layout;
        for (field, value) in [
            ("layout.tray_step", layout.tray_step),
            ("layout.cabinet_row_height", layout.cabinet_row_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if !matches!(self.defaults.color.as_str(), "auto" | "always" | "never") {
            return Err(ConfigError::Validation {
                field: "defaults.color".into(),
                reason: format!("expected 'auto', 'always', or 'never', got '{}'", self.defaults.color),
            });
        }
        Ok(())
    }

    /// The store settings this config describes.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            layout: self.layout,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "rfgate", "rfgate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rfgate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an
/// error; nested keys use `__` in env names (`RFGATE_LAYOUT__TRAY_STEP`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RFGATE_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
