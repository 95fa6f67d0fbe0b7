//! Configuration loading and parsing.
//!
//! `oxmodal.toml` is looked up in the working directory first, then under the
//! platform config dir (`<config_dir>/oxmodal/oxmodal.toml`). A missing file or
//! a file that fails to parse yields defaults; unknown fields are ignored so the
//! file can grow without breaking older builds.
//!
//! `ConfigFile` mirrors the TOML layout verbatim. `EngineConfig` is the resolved
//! view handed to the engine, with every bound clamped to at least one.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "oxmodal.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UndoConfig {
    #[serde(default = "UndoConfig::default_max_snapshots")]
    pub max_snapshots: usize,
}

impl UndoConfig {
    const fn default_max_snapshots() -> usize {
        200
    }
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_snapshots: Self::default_max_snapshots(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct JumpsConfig {
    #[serde(default = "JumpsConfig::default_max_entries")]
    pub max_entries: usize,
}

impl JumpsConfig {
    const fn default_max_entries() -> usize {
        100
    }
}

impl Default for JumpsConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::default_max_entries(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ModesConfig {
    #[serde(default = "ModesConfig::default_history_len")]
    pub history_len: usize,
}

impl ModesConfig {
    const fn default_history_len() -> usize {
        32
    }
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            history_len: Self::default_history_len(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Counts saturate at this value.
    #[serde(default = "InputConfig::default_max_count")]
    pub max_count: usize,
}

impl InputConfig {
    const fn default_max_count() -> usize {
        999_999
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_count: Self::default_max_count(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InsertConfig {
    #[serde(default)]
    pub expand_tab: bool,
    #[serde(default = "InsertConfig::default_tab_width")]
    pub tab_width: usize,
}

impl InsertConfig {
    const fn default_tab_width() -> usize {
        4
    }
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            expand_tab: false,
            tab_width: Self::default_tab_width(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub undo: UndoConfig,
    #[serde(default)]
    pub jumps: JumpsConfig,
    #[serde(default)]
    pub modes: ModesConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub insert: InsertConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Resolved engine limits and insert behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub undo_max: usize,
    pub jump_max: usize,
    pub mode_history: usize,
    pub max_count: usize,
    pub expand_tab: bool,
    pub tab_width: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        ConfigFile::default().resolve()
    }
}

impl ConfigFile {
    /// Clamp every bound to at least one.
    pub fn resolve(&self) -> EngineConfig {
        let clamp = |name: &'static str, value: usize| {
            if value == 0 {
                info!(target: "config", field = name, "zero_bound_clamped_to_one");
            }
            value.max(1)
        };
        EngineConfig {
            undo_max: clamp("undo.max_snapshots", self.undo.max_snapshots),
            jump_max: clamp("jumps.max_entries", self.jumps.max_entries),
            mode_history: clamp("modes.history_len", self.modes.history_len),
            max_count: clamp("input.max_count", self.input.max_count),
            expand_tab: self.insert.expand_tab,
            tab_width: clamp("insert.tab_width", self.insert.tab_width),
        }
    }
}

impl Config {
    pub fn engine(&self) -> EngineConfig {
        self.file.resolve()
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxmodal").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Parse configuration text. Errors carry the TOML diagnostic.
pub fn parse(content: &str) -> Result<ConfigFile> {
    toml::from_str::<ConfigFile>(content).context("invalid oxmodal configuration")
}

/// Load from an explicit path or the discovered one, falling back to defaults.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match parse(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                path: Some(path),
                file,
            })
        }
        Err(err) => {
            warn!(target: "config", path = %path.display(), error = %format!("{err:#}"), "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}
