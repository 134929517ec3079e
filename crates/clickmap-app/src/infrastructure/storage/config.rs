//! TOML-based application configuration.
//!
//! Read from the platform-appropriate config file unless `--config` names
//! another one:
//! - Windows:  `%APPDATA%\ClickMap\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/clickmap/config.toml` or `~/.config/clickmap/config.toml`
//! - macOS:    `~/Library/Application Support/ClickMap/config.toml`
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [canvas]
//! # origin_x / origin_y omitted => top-left of the virtual desktop
//! target_width = 40.0
//! target_height = 40.0
//!
//! [click]
//! settle_delay_ms = 10
//! restore_cursor = false
//! restore_delay_ms = 10
//!
//! [listener]
//! decision_budget_ms = 150
//!
//! [profiles]
//! # directory omitted => <config dir>/profiles
//! ```
//!
//! Every section and field is optional; absent values take the defaults
//! shown above. A missing file is the same as an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clickmap_core::{CanvasGeometry, ScreenPoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::synthesize_click::ClickSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub click: ClickConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Placement of the target canvas on the virtual desktop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasConfig {
    /// Canvas left edge in virtual-desktop pixels; the desktop's left edge
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<i32>,
    /// Canvas top edge in virtual-desktop pixels; the desktop's top edge
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<i32>,
    #[serde(default = "default_target_size")]
    pub target_width: f64,
    #[serde(default = "default_target_size")]
    pub target_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClickConfig {
    #[serde(default = "default_click_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub restore_cursor: bool,
    #[serde(default = "default_click_delay_ms")]
    pub restore_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenerConfig {
    /// How long the keyboard hook waits for the controller's decision before
    /// letting the key through.
    #[serde(default = "default_decision_budget_ms")]
    pub decision_budget_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfilesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_target_size() -> f64 {
    40.0
}
fn default_click_delay_ms() -> u64 {
    10
}
fn default_decision_budget_ms() -> u64 {
    150
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            origin_x: None,
            origin_y: None,
            target_width: default_target_size(),
            target_height: default_target_size(),
        }
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_click_delay_ms(),
            restore_cursor: false,
            restore_delay_ms: default_click_delay_ms(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            decision_budget_ms: default_decision_budget_ms(),
        }
    }
}

// ── Derived runtime settings ──────────────────────────────────────────────────

impl AppConfig {
    /// Rejects values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size_ok = |v: f64| v.is_finite() && v > 0.0;
        if !size_ok(self.canvas.target_width) || !size_ok(self.canvas.target_height) {
            return Err(ConfigError::Invalid(format!(
                "canvas target size must be positive, got {}x{}",
                self.canvas.target_width, self.canvas.target_height
            )));
        }
        if self.listener.decision_budget_ms == 0 {
            return Err(ConfigError::Invalid(
                "listener.decision_budget_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn click_settings(&self) -> ClickSettings {
        ClickSettings {
            settle_delay: Duration::from_millis(self.click.settle_delay_ms),
            restore_cursor: self.click.restore_cursor,
            restore_delay: Duration::from_millis(self.click.restore_delay_ms),
        }
    }

    pub fn decision_budget(&self) -> Duration {
        Duration::from_millis(self.listener.decision_budget_ms)
    }

    /// Canvas geometry, taking each missing origin axis from `desktop_origin`.
    pub fn geometry(&self, desktop_origin: ScreenPoint) -> CanvasGeometry {
        CanvasGeometry {
            origin: ScreenPoint::new(
                self.canvas.origin_x.unwrap_or(desktop_origin.x),
                self.canvas.origin_y.unwrap_or(desktop_origin.y),
            ),
            target_width: self.canvas.target_width,
            target_height: self.canvas.target_height,
        }
    }

    /// Directory holding profile files.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoPlatformConfigDir`] if no directory is configured and
    /// the platform default cannot be determined.
    pub fn profile_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.profiles.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("profiles")),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<AppConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `ClickMap` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("ClickMap"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("clickmap"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ClickMap")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
