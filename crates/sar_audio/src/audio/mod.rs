//! Audio system
//!
//! Layered from the backend up:
//!
//! - [`backend`]: the capability trait over a sound library, with a rodio
//!   implementation and a headless one
//! - [`session`]: one playing sound and its volume / rate / mute controls
//! - [`channel`]: the single background music slot
//! - [`recorder`]: the process-wide backend connection that owns the slot
//! - [`music_list`]: music track references loaded from the music list file
//! - [`music`]: per-tick selection of the background track from game state

pub mod asset;
pub mod backend;
pub mod channel;
pub mod mixer;
pub mod music;
pub mod music_list;
pub mod recorder;
pub mod session;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use backend::{BackendConfig, BackendKind, SessionHandle, SoundBackend};
pub use channel::BackgroundMusicChannel;
pub use mixer::MixerChannel;
pub use music::{MusicId, MusicOutcome, MusicSelection, MusicState, SelectionContext};
pub use music_list::{LoadError, MusicFlags, MusicReference, MusicRegistry};
pub use recorder::Recorder;
pub use session::{PlayOptions, PlaybackSession, ReleaseQueue};

/// Backend connection level errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// The sound library could not be brought up
    #[error("Audio backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// The requested backend is not compiled into this build
    #[error("Unsupported audio backend: {0}")]
    UnsupportedBackend(String),
}

/// Errors starting playback of a sound
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// The asset could not be opened or decoded
    #[error("{}: unable to load audio asset: {reason}", path.display())]
    AssetLoadFailed {
        /// Asset that failed
        path: PathBuf,
        /// Backend supplied detail
        reason: String,
    },

    /// The backend had no voice, sink or connection left for the sound
    #[error("{}: no audio backend resources available: {reason}", path.display())]
    BackendResourceExhausted {
        /// Asset that failed
        path: PathBuf,
        /// Backend supplied detail
        reason: String,
    },
}

impl PlayError {
    pub(crate) fn asset(path: &Path, reason: impl Into<String>) -> Self {
        Self::AssetLoadFailed { path: path.to_path_buf(), reason: reason.into() }
    }

    pub(crate) fn exhausted(path: &Path, reason: impl Into<String>) -> Self {
        Self::BackendResourceExhausted { path: path.to_path_buf(), reason: reason.into() }
    }

    /// Path of the asset that failed to play
    pub fn path(&self) -> &Path {
        match self {
            Self::AssetLoadFailed { path, .. } | Self::BackendResourceExhausted { path, .. } => path,
        }
    }
}
