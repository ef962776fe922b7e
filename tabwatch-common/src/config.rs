//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration comes from a small TOML file. Every field has a
//! compiled default, so a missing file never prevents startup.
//!
//! # Data folder priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `TABWATCH_DATA_FOLDER`
//! 3. TOML `data_folder` key
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "TABWATCH_DATA_FOLDER";

/// Environment variable pointing at the TOML config file
pub const CONFIG_PATH_ENV: &str = "TABWATCH_CONFIG";

/// Listing page crawled by a full sync
pub const DEFAULT_LISTING_URL: &str = "https://www.ufret.jp/new.php";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the pipeline stores and list files (optional)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Listing page fetched by every full sync
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Local wall-clock hour (0..=23) of the daily sync
    #[serde(default = "default_sync_hour")]
    pub sync_hour: u32,

    /// Hard timeout for a single page fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum listing items extracted per sync
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Retention cap of the general store
    #[serde(default = "default_general_cap")]
    pub general_cap: usize,

    /// Retention cap of the video store
    #[serde(default = "default_video_cap")]
    pub video_cap: usize,

    /// Badge markers used for classification
    #[serde(default)]
    pub markers: MarkerConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Badge substrings that drive classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    #[serde(default = "default_piano_marker")]
    pub piano: String,

    #[serde(default = "default_video_marker")]
    pub video: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    5780
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_listing_url() -> String {
    DEFAULT_LISTING_URL.to_string()
}

fn default_sync_hour() -> u32 {
    12
}

fn default_fetch_timeout_secs() -> u64 {
    12
}

fn default_max_items() -> usize {
    100
}

fn default_general_cap() -> usize {
    50
}

fn default_video_cap() -> usize {
    20
}

fn default_piano_marker() -> String {
    "ピアノ".to_string()
}

fn default_video_marker() -> String {
    "動画".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_folder: None,
            port: default_port(),
            bind_address: default_bind_address(),
            listing_url: default_listing_url(),
            sync_hour: default_sync_hour(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_items: default_max_items(),
            general_cap: default_general_cap(),
            video_cap: default_video_cap(),
            markers: MarkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            piano: default_piano_marker(),
            video: default_video_marker(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sync_hour > 23 {
            return Err(Error::Config(format!(
                "sync_hour must be within 0..=23, got {}",
                self.sync_hour
            )));
        }
        if self.general_cap == 0 || self.video_cap == 0 {
            return Err(Error::Config(
                "general_cap and video_cap must be greater than zero".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::Config(
                "fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.markers.piano.is_empty() || self.markers.video.is_empty() {
            return Err(Error::Config("badge markers must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Parse and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load config, falling back to compiled defaults when the file is missing
///
/// A present but invalid file is still an error: silently ignoring a typo in
/// `sync_hour` would schedule syncs at the wrong time.
pub fn load_or_default(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        Some(path) if path.exists() => {
            let config = load_toml_config(path)?;
            info!("Loaded TOML configuration from {}", path.display());
            Ok(config)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            info!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Replace `path` with `bytes` via a sibling temp file and rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Locate the config file: CLI path, then env var, then the user config dir
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("tabwatch").join("config.toml"))
        .filter(|p| p.exists())
}

/// Get OS-dependent default data folder path
pub fn get_default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tabwatch"))
        .unwrap_or_else(|| PathBuf::from("./tabwatch_data"))
}

/// Data folder resolution (CLI > env > TOML > OS default)
#[derive(Debug, Clone, Default)]
pub struct DataFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl DataFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_value = config.data_folder.clone();
        self
    }

    /// Resolve the folder; never fails
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Data folder: {} (from command line)", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            if !path.is_empty() {
                info!("Data folder: {} (from {})", path, DATA_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            info!("Data folder: {} (from TOML config)", path.display());
            return path.clone();
        }

        let path = get_default_data_folder();
        info!("Data folder: {} (compiled default)", path.display());
        path
    }
}

/// Create the data folder if it does not exist yet
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created data folder: {}", path.display());
    }
    Ok(())
}
