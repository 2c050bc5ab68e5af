//! Configuration loading and parsing.
//!
//! Parses `sommark-playground.toml` (or an override path provided by the
//! binary). Every section and key is optional; absent values take the
//! defaults below. A missing file or a parse error yields the default
//! configuration (parse errors are logged at `warn`, target `config`).
//!
//! ```toml
//! [scheduler]
//! debounce_ms = 500
//!
//! [engine]
//! program = "sommark"
//! args = []
//!
//! [output]
//! dir = "playground-out"
//!
//! [storage]
//! path = "/custom/state.json"   # default: <data_dir>/sommark-playground/state.json
//!
//! [editor]
//! default_format = "html"
//!
//! [highlight.classes]
//! keyword = "kw"
//! ```
//!
//! The debounce window is clamped to `MAX_DEBOUNCE_MS`; the raw parsed value
//! is kept in `file` and the clamped one in `effective_debounce_ms`.
//! Unknown fields are ignored.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "sommark-playground.toml";
pub const APP_DIR_NAME: &str = "sommark-playground";
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "SchedulerConfig::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

impl SchedulerConfig {
    const fn default_debounce_ms() -> u64 {
        500
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_program")]
    pub program: String,
    /// Extra arguments placed before the subcommand.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
            args: Vec::new(),
        }
    }
}

impl EngineConfig {
    fn default_program() -> String {
        "sommark".to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

impl OutputConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("playground-out")
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_format")]
    pub default_format: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_format: Self::default_format(),
        }
    }
}

impl EditorConfig {
    fn default_format() -> String {
        "html".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct HighlightConfig {
    /// Category key (`operator`, `keyword`, ...) -> CSS class name override.
    #[serde(default)]
    pub classes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>,        // original file string (optional)
    pub path: Option<PathBuf>,      // file the config was read from
    pub file: ConfigFile,           // parsed (or default) data
    pub effective_debounce_ms: u64, // clamped to MAX_DEBOUNCE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(None, None, ConfigFile::default())
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Prefer a local working directory file before the platform config dir.
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config::from_file(Some(content), Some(path), file))
        }
        Err(e) => {
            // Resilience: a broken file never blocks startup.
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    fn from_file(raw: Option<String>, path: Option<PathBuf>, file: ConfigFile) -> Self {
        let requested = file.scheduler.debounce_ms;
        let effective_debounce_ms = requested.min(MAX_DEBOUNCE_MS);
        if effective_debounce_ms != requested {
            info!(
                target: "config",
                requested,
                clamped = effective_debounce_ms,
                max = MAX_DEBOUNCE_MS,
                "debounce_ms_clamped"
            );
        }
        Self {
            raw,
            path,
            file,
            effective_debounce_ms,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.effective_debounce_ms)
    }

    /// Persisted-state file: configured override or the platform data dir.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.file.storage.path.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join("state.json"))
        })
    }
}
