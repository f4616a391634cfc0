//! Audio backend implementations
//!
//! Platform-independent abstraction over audio playback libraries. The
//! backend is picked once, when the recorder is created; nothing above this
//! module knows which library is underneath.

#[cfg(feature = "rodio")]
pub mod rodio_backend;
pub mod silent_backend;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::audio::mixer::MixerChannel;
use crate::audio::session::PlayOptions;
use crate::audio::{AudioError, PlayError};
use crate::foundation::collections::SessionKey;

pub use silent_backend::{SilentBackend, SilentMonitor};

/// Handle to a sound started on a backend
pub type SessionHandle = SessionKey;

/// Playback parameters handed to [`SoundBackend::start`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    /// Left volume (0.0 to 1.0)
    pub volume_left: f32,
    /// Right volume (0.0 to 1.0)
    pub volume_right: f32,
    /// Applied sample rate in Hz, 0.0 plays at the asset's own rate
    pub sample_rate: f32,
    /// Mute and repeat options
    pub options: PlayOptions,
}

impl PlayParams {
    /// Gain the backend should apply, honoring MUTE
    pub fn audible_gain(&self) -> (f32, f32) {
        if self.options.contains(PlayOptions::MUTE) {
            (0.0, 0.0)
        } else {
            (self.volume_left.clamp(0.0, 1.0), self.volume_right.clamp(0.0, 1.0))
        }
    }
}

/// Audio backend trait for platform abstraction
///
/// # Threading
/// Not Send + Sync. The recorder and everything above it run on the
/// simulation thread, once per tick.
pub trait SoundBackend {
    /// Which implementation this is
    fn kind(&self) -> BackendKind;

    /// Initialize the audio backend
    fn initialize(&mut self, config: &BackendConfig) -> Result<(), AudioError>;

    /// Release every sound and the connection to the sound library
    fn shutdown(&mut self);

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;

    /// Release sounds that finished on their own, returns how many
    fn update(&mut self) -> usize;

    /// Start playing an asset immediately
    fn start(&mut self, path: &Path, params: &PlayParams) -> Result<SessionHandle, PlayError>;

    /// Stop a sound and release its resources, unknown handles are ignored
    fn stop(&mut self, handle: SessionHandle);

    /// Stop all playing sounds
    fn stop_all(&mut self);

    /// Apply an audible gain to a playing sound
    fn set_gain(&mut self, handle: SessionHandle, left: f32, right: f32);

    /// Change the playback rate, backends without rate control ignore this
    fn set_sample_rate(&mut self, handle: SessionHandle, sample_rate: f32);

    /// Check if a sound is still playing
    fn is_active(&self, handle: SessionHandle) -> bool;

    /// Number of sounds currently holding backend resources
    fn active_count(&self) -> usize;

    /// Read a mixer channel
    fn mixer_get(&self, channel: MixerChannel) -> (f32, f32);

    /// Write a mixer channel
    fn mixer_set(&mut self, channel: MixerChannel, left: f32, right: f32);
}

/// Available backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Best backend compiled into this build
    #[default]
    Default,
    /// Headless backend, no audio output
    Silent,
    /// Rodio output stream
    Rodio,
}

/// Configuration for audio backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend to create
    pub kind: BackendKind,
    /// Sample rate (e.g., 22050, 44100)
    pub sample_rate: u32,
    /// Number of output channels (1=mono, 2=stereo)
    pub channels: u16,
    /// Buffer size for audio processing
    pub buffer_size: usize,
    /// Maximum simultaneous sounds, 0 means unlimited
    pub max_voices: usize,
}

impl BackendConfig {
    /// Configuration for a specific backend with default audio parameters
    pub fn with_kind(kind: BackendKind) -> Self {
        Self { kind, ..Self::default() }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("Sample rate must be positive".to_string());
        }
        if self.channels == 0 || self.channels > 2 {
            return Err(format!("Unsupported channel count {}", self.channels));
        }
        if self.buffer_size == 0 {
            return Err("Buffer size must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Default,
            sample_rate: 22050,
            channels: 2,
            buffer_size: 4096,
            max_voices: 0,
        }
    }
}

/// Create and initialize the backend named by the configuration
pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn SoundBackend>, AudioError> {
    let mut backend: Box<dyn SoundBackend> = match config.kind {
        BackendKind::Silent => Box::new(SilentBackend::new()),
        #[cfg(feature = "rodio")]
        BackendKind::Default | BackendKind::Rodio => Box::new(rodio_backend::RodioBackend::new()),
        #[cfg(not(feature = "rodio"))]
        BackendKind::Default => {
            return Err(AudioError::UnsupportedBackend("no sound support compiled in".to_string()));
        }
        #[cfg(not(feature = "rodio"))]
        BackendKind::Rodio => {
            return Err(AudioError::UnsupportedBackend("rodio support not compiled in".to_string()));
        }
    };

    backend.initialize(config)?;
    log::debug!("Created {:?} audio backend", backend.kind());
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BackendConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = BackendConfig { channels: 6, ..BackendConfig::default() };
        assert!(config.validate().is_err());

        let config = BackendConfig { sample_rate: 0, ..BackendConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_create_silent_backend() {
        let backend = create_backend(&BackendConfig::with_kind(BackendKind::Silent)).unwrap();
        assert_eq!(backend.kind(), BackendKind::Silent);
        assert!(backend.is_initialized());
    }

    #[test]
    fn test_mute_zeroes_audible_gain() {
        let params = PlayParams {
            volume_left: 0.7,
            volume_right: 1.5,
            sample_rate: 0.0,
            options: PlayOptions::MUTE,
        };
        assert_eq!(params.audible_gain(), (0.0, 0.0));

        let params = PlayParams { options: PlayOptions::empty(), ..params };
        assert_eq!(params.audible_gain(), (0.7, 1.0));
    }
}
