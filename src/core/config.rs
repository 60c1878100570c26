//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatview/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::archive::ARCHIVE_FILE_NAME;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatviewConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub archive_path: Option<String>,
    pub export_dir: Option<String>,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Width of the chat list pane, in percent of the terminal width.
    pub chat_list_width: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_EXPORT_DIR: &str = "export";
pub const DEFAULT_CHAT_LIST_WIDTH: u16 = 32;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub archive_path: PathBuf,
    pub export_path: PathBuf,
    pub chat_list_width: u16,
    pub log_level: LevelFilter,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.chatview/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatview").join("config.toml"))
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# chatview configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# archive_path = "processed_data.json"   # Or set CHATVIEW_ARCHIVE env var
# export_dir = "export"                  # Or set CHATVIEW_EXPORT_DIR env var
# log_level = "debug"                    # off, error, warn, info, debug, trace

# [display]
# chat_list_width = 32                   # Percent of the terminal width (15-70)
"#;

/// Load config from `~/.chatview/config.toml`.
///
/// A missing file (or home directory) yields `ChatviewConfig::default()`;
/// the commented template is written in its place for next time. A malformed
/// file is an error so a typo never silently resets settings.
pub fn load_config() -> Result<ChatviewConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("No home directory, running with default settings");
        return Ok(ChatviewConfig::default());
    };

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            match write_default_config(&path) {
                Ok(()) => info!("Wrote config template to {}", path.display()),
                Err(e) => warn!("Could not write config template {}: {}", path.display(), e),
            }
            return Ok(ChatviewConfig::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let config = parse_config(&contents)?;
    debug!("Config from {}: {:?}", path.display(), config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ChatviewConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_archive` and `cli_export_dir` are from CLI arguments (None = not specified).
pub fn resolve(
    config: &ChatviewConfig,
    cli_archive: Option<&Path>,
    cli_export_dir: Option<&Path>,
) -> ResolvedConfig {
    // Archive: CLI → env → config → default
    let archive_path = cli_archive
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("CHATVIEW_ARCHIVE").ok().map(PathBuf::from))
        .or_else(|| config.general.archive_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(ARCHIVE_FILE_NAME));

    // Export directory: CLI → env → config → default
    let export_dir = cli_export_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("CHATVIEW_EXPORT_DIR").ok().map(PathBuf::from))
        .or_else(|| config.general.export_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));

    let chat_list_width = config
        .display
        .chat_list_width
        .unwrap_or(DEFAULT_CHAT_LIST_WIDTH)
        .clamp(15, 70);

    let log_level = match config.general.log_level.as_deref() {
        Some(level) => level.parse().unwrap_or_else(|_| {
            warn!("Unknown log level {:?}, using {}", level, DEFAULT_LOG_LEVEL);
            DEFAULT_LOG_LEVEL
        }),
        None => DEFAULT_LOG_LEVEL,
    };

    ResolvedConfig {
        archive_path,
        export_path: export_dir.join(ARCHIVE_FILE_NAME),
        chat_list_width,
        log_level,
    }
}
