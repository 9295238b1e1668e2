//! Configuration module for sadpanda
//!
//! Holds the site cookies used by the metadata client and the list of
//! directories watched for galleries. Settings are stored as TOML in the
//! user's config directory (`~/.config/sadpanda/config.toml` on Linux).

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Login cookies for the remote metadata service
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    #[serde(default)]
    pub ipb_member_id: String,

    #[serde(default)]
    pub ipb_pass_hash: String,
}

impl Cookies {
    /// Both cookies are filled in
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.ipb_member_id.is_empty() && !self.ipb_pass_hash.is_empty()
    }
}

/// Persisted application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Directories scanned for galleries
    #[serde(default)]
    pub dirs: Vec<PathBuf>,

    /// Cookies sent with metadata requests
    #[serde(default)]
    pub cookies: Cookies,
}

impl Settings {
    /// Add a watched directory; returns false if it was already present
    pub fn add_dir(&mut self, dir: PathBuf) -> bool {
        if self.dirs.contains(&dir) {
            return false;
        }
        self.dirs.push(dir);
        true
    }

    /// Remove a watched directory; returns false if it was not present
    pub fn remove_dir(&mut self, dir: &Path) -> bool {
        let before = self.dirs.len();
        self.dirs.retain(|d| d != dir);
        self.dirs.len() != before
    }

    pub fn set_cookies(&mut self, member_id: impl Into<String>, pass_hash: impl Into<String>) {
        self.cookies = Cookies {
            ipb_member_id: member_id.into(),
            ipb_pass_hash: pass_hash.into(),
        };
    }
}

/// Where settings are loaded from and saved to
pub trait ConfigStore {
    /// Load settings, falling back to defaults when none were saved yet
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if stored settings exist but cannot be read.
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Persist settings
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the settings cannot be written.
    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError>;
}

/// TOML file backed settings store
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn at_default_path() -> Result<Self, ConfigError> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Get the path to the default config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("sadpanda").join("config.toml"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing files are created with default settings
    fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            let defaults = Settings::default();
            write_settings(&self.path, &defaults)?;
            return Ok(defaults);
        }

        let settings = Config::builder()
            .add_source(File::from(self.path.clone()).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        write_settings(&self.path, settings)
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    debug!(path = %path.display(), "saving settings");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
    }

    let toml_string = toml::to_string_pretty(settings)
        .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

    fs::write(path, toml_string)
        .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

    Ok(())
}

/// In-memory settings store
///
/// Useful for embedding and tests where nothing should touch the disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    pub settings: Settings,
    pub saves: usize,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings, saves: 0 }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.settings.clone())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        self.settings = settings.clone();
        self.saves += 1;
        Ok(())
    }
}
