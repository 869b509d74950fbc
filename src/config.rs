//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\discog-mediator\config.toml
//! - macOS: ~/Library/Application Support/discog-mediator/config.toml
//! - Linux: ~/.config/discog-mediator/config.toml
//!
//! The config file is human-readable and editable. CLI flags override
//! individual settings for a single run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entity;
use crate::provider::{discogs, musicbrainz::CoverSize};
use crate::registry::Selection;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Which adapters drive an import
    pub import: ImportConfig,

    /// Category resolution
    pub categories: CategoryConfig,

    /// Image resolution
    pub images: ImageConfig,

    /// Release database
    pub storage: StorageConfig,
}

impl Config {
    /// The provider/entity pair to import with.
    pub fn selection(&self) -> Selection {
        Selection {
            provider: self.import.provider.clone(),
            entity: self.import.entity.clone(),
        }
    }
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Discogs personal access token
    pub discogs_token: Option<String>,
}

/// Adapter selection and paging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Provider adapter id ("discogs", "musicbrainz")
    pub provider: String,

    /// Entity adapter id ("sqlite")
    pub entity: String,

    /// Rows per search/browse page
    pub per_page: usize,

    /// Cover Art Archive size used for MusicBrainz releases
    pub musicbrainz_cover_size: CoverSize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            provider: discogs::PROVIDER_ID.to_string(),
            entity: entity::ENTITY_ID.to_string(),
            per_page: 25,
            musicbrainz_cover_size: CoverSize::default(),
        }
    }
}

/// Category resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub enabled: bool,

    /// Taxonomy vocabulary categories are filed under
    pub vocabulary: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vocabulary: "genres".to_string(),
        }
    }
}

/// Image resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub enabled: bool,

    /// Where images are stored (None = user data directory)
    pub directory: Option<PathBuf>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file (None = discog_mediator.db in the working directory)
    pub database: Option<PathBuf>,
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("discog-mediator"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`].
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
