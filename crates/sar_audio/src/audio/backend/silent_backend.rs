//! Headless audio backend
//!
//! Accepts the same assets a real backend would (the file must exist and
//! carry a known audio signature) but produces no output. Sounds stay
//! "playing" until they are stopped or finished through a [`SilentMonitor`],
//! which makes the backend usable for dedicated runs without an audio device
//! and for driving the music logic deterministically.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{BackendConfig, BackendKind, PlayParams, SessionHandle, SoundBackend};
use crate::audio::asset::AudioFormat;
use crate::audio::mixer::{MixerChannel, MixerLevels};
use crate::audio::session::PlayOptions;
use crate::audio::{AudioError, PlayError};
use crate::foundation::collections::SessionMap;

#[derive(Debug, Clone)]
struct SilentVoice {
    path: PathBuf,
    format: AudioFormat,
    gain: (f32, f32),
    sample_rate: f32,
    repeating: bool,
    finished: bool,
}

#[derive(Debug, Default)]
struct SilentState {
    voices: SessionMap<SilentVoice>,
    mixer: MixerLevels,
    max_voices: usize,
    started: usize,
    released: usize,
    gain_updates: usize,
    rate_updates: usize,
}

impl SilentState {
    fn release(&mut self, handle: SessionHandle) -> bool {
        if self.voices.remove(handle).is_some() {
            self.released += 1;
            true
        } else {
            false
        }
    }
}

/// Observer and remote control for a [`SilentBackend`]
///
/// Cloned out of the backend before it is boxed into a recorder.
#[derive(Debug, Clone)]
pub struct SilentMonitor {
    state: Rc<RefCell<SilentState>>,
}

impl SilentMonitor {
    /// Let every non-repeating sound reach its end, returns how many did
    pub fn finish_playing(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let mut finished = 0;
        for (_, voice) in state.voices.iter_mut() {
            if !voice.repeating && !voice.finished {
                voice.finished = true;
                finished += 1;
            }
        }
        finished
    }

    /// Assets of the sounds that are still playing
    pub fn playing_assets(&self) -> Vec<PathBuf> {
        self.state
            .borrow()
            .voices
            .values()
            .filter(|voice| !voice.finished)
            .map(|voice| voice.path.clone())
            .collect()
    }

    /// Sounds holding backend resources, finished or not
    pub fn live_sessions(&self) -> usize {
        self.state.borrow().voices.len()
    }

    /// Total sounds started since creation
    pub fn started(&self) -> usize {
        self.state.borrow().started
    }

    /// Total sounds released since creation
    pub fn released(&self) -> usize {
        self.state.borrow().released
    }

    /// Number of gain changes the backend applied
    pub fn gain_updates(&self) -> usize {
        self.state.borrow().gain_updates
    }

    /// Number of sample rate changes the backend applied
    pub fn rate_updates(&self) -> usize {
        self.state.borrow().rate_updates
    }

    /// Gain currently applied to a sound
    pub fn gain(&self, handle: SessionHandle) -> Option<(f32, f32)> {
        self.state.borrow().voices.get(handle).map(|voice| voice.gain)
    }

    /// Sample rate currently applied to a sound
    pub fn sample_rate(&self, handle: SessionHandle) -> Option<f32> {
        self.state.borrow().voices.get(handle).map(|voice| voice.sample_rate)
    }

    /// Whether a sound was started looping
    pub fn is_repeating(&self, handle: SessionHandle) -> Option<bool> {
        self.state.borrow().voices.get(handle).map(|voice| voice.repeating)
    }

    /// Detected container format of a sound
    pub fn format(&self, handle: SessionHandle) -> Option<AudioFormat> {
        self.state.borrow().voices.get(handle).map(|voice| voice.format)
    }

    /// Limit the number of simultaneous sounds, 0 means unlimited
    pub fn set_max_voices(&self, max_voices: usize) {
        self.state.borrow_mut().max_voices = max_voices;
    }
}

/// Audio backend without output
#[derive(Debug)]
pub struct SilentBackend {
    state: Rc<RefCell<SilentState>>,
    initialized: bool,
}

impl SilentBackend {
    /// Create a new silent backend
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SilentState::default())),
            initialized: false,
        }
    }

    /// Get a monitor sharing this backend's state
    pub fn monitor(&self) -> SilentMonitor {
        SilentMonitor { state: Rc::clone(&self.state) }
    }
}

impl SoundBackend for SilentBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Silent
    }

    fn initialize(&mut self, config: &BackendConfig) -> Result<(), AudioError> {
        if self.initialized {
            return Ok(());
        }
        config.validate().map_err(AudioError::BackendInitFailed)?;

        self.state.borrow_mut().max_voices = config.max_voices;
        self.initialized = true;
        log::info!("Silent audio backend initialized");
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        self.stop_all();
        self.initialized = false;
        log::info!("Silent audio backend shutdown");
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn update(&mut self) -> usize {
        let mut state = self.state.borrow_mut();
        let finished: Vec<SessionHandle> = state
            .voices
            .iter()
            .filter(|(_, voice)| voice.finished)
            .map(|(handle, _)| handle)
            .collect();
        for handle in &finished {
            state.release(*handle);
        }
        finished.len()
    }

    fn start(&mut self, path: &Path, params: &PlayParams) -> Result<SessionHandle, PlayError> {
        if !self.initialized {
            return Err(PlayError::exhausted(path, "backend not initialized"));
        }

        let format = AudioFormat::probe(path)?;

        let mut state = self.state.borrow_mut();
        if state.max_voices > 0 && state.voices.len() >= state.max_voices {
            return Err(PlayError::exhausted(path, format!("all {} voices in use", state.max_voices)));
        }

        let handle = state.voices.insert(SilentVoice {
            path: path.to_path_buf(),
            format,
            gain: params.audible_gain(),
            sample_rate: params.sample_rate.max(0.0),
            repeating: params.options.contains(PlayOptions::REPEATING),
            finished: false,
        });
        state.started += 1;
        Ok(handle)
    }

    fn stop(&mut self, handle: SessionHandle) {
        self.state.borrow_mut().release(handle);
    }

    fn stop_all(&mut self) {
        let mut state = self.state.borrow_mut();
        let handles: Vec<SessionHandle> = state.voices.keys().collect();
        for handle in handles {
            state.release(handle);
        }
    }

    fn set_gain(&mut self, handle: SessionHandle, left: f32, right: f32) {
        let mut state = self.state.borrow_mut();
        if let Some(voice) = state.voices.get_mut(handle) {
            voice.gain = (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0));
            state.gain_updates += 1;
        }
    }

    fn set_sample_rate(&mut self, handle: SessionHandle, sample_rate: f32) {
        let mut state = self.state.borrow_mut();
        if let Some(voice) = state.voices.get_mut(handle) {
            voice.sample_rate = sample_rate.max(0.0);
            state.rate_updates += 1;
        }
    }

    fn is_active(&self, handle: SessionHandle) -> bool {
        self.state
            .borrow()
            .voices
            .get(handle)
            .is_some_and(|voice| !voice.finished)
    }

    fn active_count(&self) -> usize {
        self.state.borrow().voices.len()
    }

    fn mixer_get(&self, channel: MixerChannel) -> (f32, f32) {
        self.state.borrow().mixer.get(channel)
    }

    fn mixer_set(&mut self, channel: MixerChannel, left: f32, right: f32) {
        self.state.borrow_mut().mixer.set(channel, left, right);
    }
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(options: PlayOptions) -> PlayParams {
        PlayParams { volume_left: 1.0, volume_right: 1.0, sample_rate: 0.0, options }
    }

    fn backend() -> (SilentBackend, SilentMonitor) {
        let mut backend = SilentBackend::new();
        backend.initialize(&BackendConfig::with_kind(BackendKind::Silent)).unwrap();
        let monitor = backend.monitor();
        (backend, monitor)
    }

    fn ogg(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"OggS\0\x02page").unwrap();
        path
    }

    #[test]
    fn test_playback_without_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = SilentBackend::new();

        let result = backend.start(&ogg(&dir, "a.ogg"), &params(PlayOptions::empty()));
        assert!(matches!(result, Err(PlayError::BackendResourceExhausted { .. })));
    }

    #[test]
    fn test_missing_asset_fails_to_load() {
        let (mut backend, monitor) = backend();
        let result = backend.start(Path::new(""), &params(PlayOptions::empty()));

        assert!(matches!(result, Err(PlayError::AssetLoadFailed { .. })));
        assert_eq!(monitor.started(), 0);
    }

    #[test]
    fn test_finished_sounds_are_reaped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut backend, monitor) = backend();
        let once = backend.start(&ogg(&dir, "once.ogg"), &params(PlayOptions::empty())).unwrap();
        let looped = backend.start(&ogg(&dir, "loop.ogg"), &params(PlayOptions::REPEATING)).unwrap();

        assert_eq!(monitor.finish_playing(), 1);
        assert!(!backend.is_active(once));
        assert!(backend.is_active(looped));

        assert_eq!(backend.update(), 1);
        assert_eq!(backend.active_count(), 1);
        assert_eq!(monitor.released(), 1);
    }

    #[test]
    fn test_voice_limit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut backend, monitor) = backend();
        monitor.set_max_voices(1);
        let path = ogg(&dir, "a.ogg");

        backend.start(&path, &params(PlayOptions::empty())).unwrap();
        let result = backend.start(&path, &params(PlayOptions::empty()));
        assert!(matches!(result, Err(PlayError::BackendResourceExhausted { .. })));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (mut backend, monitor) = backend();
        let path = ogg(&dir, "a.ogg");
        backend.start(&path, &params(PlayOptions::empty())).unwrap();
        backend.start(&path, &params(PlayOptions::REPEATING)).unwrap();

        backend.shutdown();
        assert!(!backend.is_initialized());
        assert_eq!(monitor.live_sessions(), 0);
        assert_eq!(monitor.released(), 2);

        // Second shutdown is a no-op
        backend.shutdown();
        assert_eq!(monitor.released(), 2);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut backend, monitor) = backend();
        let handle = backend.start(&ogg(&dir, "a.ogg"), &params(PlayOptions::empty())).unwrap();

        backend.stop(handle);
        backend.stop(handle);
        backend.set_gain(handle, 0.5, 0.5);
        assert!(!backend.is_active(handle));
        assert_eq!(monitor.released(), 1);
        assert_eq!(monitor.gain_updates(), 0);
    }
}
