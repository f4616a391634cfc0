//! Data directory layout and asset path resolution
//!
//! Game data lives in two roots: a per-user local directory that may shadow
//! files, and a shared global directory installed with the game. Relative
//! asset paths are looked up in that order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Local data directory, relative to the user's home
const DEFAULT_LOCAL_DATA_DIR: &str = ".config/sar2";

/// Global data directory of a system-wide install
const DEFAULT_GLOBAL_DATA_DIR: &str = "/usr/share/games/sar2";

/// The two data roots used to resolve relative asset paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDirs {
    /// Per-user data root, searched first
    pub local_data: PathBuf,
    /// Shared data root, searched second
    pub global_data: PathBuf,
}

impl DataDirs {
    /// Create data directories from explicit roots
    pub fn new(local_data: impl Into<PathBuf>, global_data: impl Into<PathBuf>) -> Self {
        Self {
            local_data: local_data.into(),
            global_data: global_data.into(),
        }
    }

    /// Resolve a relative asset path against the data roots
    ///
    /// The local root wins when the file exists in both. Returns an empty
    /// path when the asset exists in neither root, callers hand that to the
    /// backend which then fails to open it.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.find(relative).unwrap_or_default()
    }

    /// Like [`DataDirs::resolve`] but reports a missing asset as `None`
    pub fn find(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = relative.as_ref();
        if relative.as_os_str().is_empty() {
            return None;
        }

        [&self.local_data, &self.global_data]
            .into_iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.exists())
    }

    /// Path of a file directly under the global data root
    pub fn global_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.global_data.join(name)
    }
}

impl Default for DataDirs {
    fn default() -> Self {
        let local_data = dirs::home_dir()
            .map(|home| home.join(DEFAULT_LOCAL_DATA_DIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_DATA_DIR));
        Self::new(local_data, DEFAULT_GLOBAL_DATA_DIR)
    }
}
