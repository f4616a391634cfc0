//! # Audio Configuration
//!
//! Typed configuration for the sound subsystem: which backend to open and
//! with what output format, where game data lives, and how background music
//! is set up. Loaded from TOML or RON through the [`Config`] trait.
//!
//! ```toml
//! log_level = "debug"
//!
//! [backend]
//! kind = "silent"
//! sample_rate = 22050
//!
//! [data]
//! local_data = "/home/pilot/.config/sar2"
//! global_data = "/usr/share/games/sar2"
//!
//! [music]
//! enabled = true
//! list_file = "music.ini"
//! ```

use serde::{Deserialize, Serialize};

use crate::assets::DataDirs;
use crate::audio::backend::{BackendConfig, BackendKind};

pub use crate::config::{Config, ConfigError};

/// Default music list file name, under the global data root
pub const DEFAULT_MUSIC_LIST_FILE: &str = "music.ini";

/// # Music Configuration
///
/// The music option switch and the music list to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Whether background music plays at startup
    pub enabled: bool,
    /// Music list file, relative to the global data root
    pub list_file: String,
}

impl MusicConfig {
    /// Create a music configuration with music switched on
    pub fn new() -> Self {
        Self {
            enabled: true,
            list_file: DEFAULT_MUSIC_LIST_FILE.to_string(),
        }
    }

    /// Switch music on or off
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the music list file
    pub fn with_list_file(mut self, list_file: impl Into<String>) -> Self {
        self.list_file = list_file.into();
        self
    }
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Audio Configuration
///
/// Top level configuration of the sound subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Backend selection and output format
    pub backend: BackendConfig,
    /// Data directories used to resolve assets
    pub data: DataDirs,
    /// Background music settings
    pub music: MusicConfig,
    /// Log level filter (error, warn, info, debug, trace)
    pub log_level: String,
}

impl AudioConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            backend: BackendConfig::default(),
            data: DataDirs::default(),
            music: MusicConfig::default(),
            log_level: "info".to_string(),
        }
    }

    /// Set the backend configuration
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    /// Select a backend, keeping the output format
    pub fn with_backend_kind(mut self, kind: BackendKind) -> Self {
        self.backend.kind = kind;
        self
    }

    /// Set the data directories
    pub fn with_data_dirs(mut self, data: DataDirs) -> Self {
        self.data = data;
        self
    }

    /// Set the music configuration
    pub fn with_music(mut self, music: MusicConfig) -> Self {
        self.music = music;
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate().map_err(ConfigError::Invalid)?;

        if self.music.list_file.trim().is_empty() {
            return Err(ConfigError::Invalid("Music list file cannot be empty".to_string()));
        }

        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("Unknown log level \"{}\"", self.log_level)));
        }

        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for AudioConfig {}
