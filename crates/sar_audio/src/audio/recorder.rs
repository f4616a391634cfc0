//! Sound recorder
//!
//! The process-wide connection to the sound backend. It is created once at
//! startup, owns the background music slot, and releases every outstanding
//! sound before closing the backend at shutdown.
//!
//! # Example
//!
//! ```no_run
//! use sar_audio::audio::{BackendConfig, BackendKind, Recorder};
//! use std::path::Path;
//!
//! let mut recorder = Recorder::init(&BackendConfig::with_kind(BackendKind::Silent)).unwrap();
//! recorder.music_start_play(Path::new("music/menus.ogg"), true).unwrap();
//!
//! // Once per tick
//! recorder.manage_events();
//!
//! recorder.shutdown();
//! ```

use std::path::Path;

use crate::audio::backend::{self, BackendConfig, BackendKind, PlayParams, SoundBackend};
use crate::audio::channel::BackgroundMusicChannel;
use crate::audio::mixer::MixerChannel;
use crate::audio::session::{PlayOptions, PlaybackSession, ReleaseQueue};
use crate::audio::{AudioError, PlayError};

/// Connection to the sound backend
pub struct Recorder {
    backend: Box<dyn SoundBackend>,
    music: BackgroundMusicChannel,
    /// Sessions dropped without being stopped
    releases: ReleaseQueue,
    sample_rate: u32,
    channels: u16,
    buffer_size: usize,
    shut_down: bool,
}

impl Recorder {
    /// Connect to the backend named by the configuration
    pub fn init(config: &BackendConfig) -> Result<Self, AudioError> {
        let backend = backend::create_backend(config)?;
        Self::with_backend(backend, config)
    }

    /// Wrap an already created backend, initializing it if needed
    pub fn with_backend(mut backend: Box<dyn SoundBackend>, config: &BackendConfig) -> Result<Self, AudioError> {
        if !backend.is_initialized() {
            backend.initialize(config)?;
        }

        log::info!(
            "Sound recorder connected: {:?}, {} Hz, {} channel(s), {} frame buffer",
            backend.kind(),
            config.sample_rate,
            config.channels,
            config.buffer_size
        );

        let releases = ReleaseQueue::new();
        Ok(Self {
            backend,
            music: BackgroundMusicChannel::with_release_queue(releases.clone()),
            releases,
            sample_rate: config.sample_rate,
            channels: config.channels,
            buffer_size: config.buffer_size,
            shut_down: false,
        })
    }

    /// Backend implementation in use
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Output buffer size in frames
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Read access to the backend
    pub fn backend(&self) -> &dyn SoundBackend {
        self.backend.as_ref()
    }

    /// Write access to the backend, for adjusting tracked sessions
    pub fn backend_mut(&mut self) -> &mut dyn SoundBackend {
        self.backend.as_mut()
    }

    /// Handle backend events, called once per tick
    ///
    /// Releases sounds that finished on their own, sessions that were
    /// dropped without being stopped, and a finished background track.
    /// Returns the number of sounds released.
    pub fn manage_events(&mut self) -> usize {
        let mut released = self.backend.update();
        released += self.releases.drain(self.backend.as_mut());

        let before = self.backend.active_count();
        self.music.reap_finished(self.backend.as_mut());
        released + before.saturating_sub(self.backend.active_count())
    }

    /// Start a sound the caller keeps track of
    ///
    /// Dropping the session instead of passing it to
    /// [`Recorder::stop_play`] releases it at the next
    /// [`Recorder::manage_events`].
    pub fn start_play(
        &mut self,
        path: &Path,
        volume_left: f32,
        volume_right: f32,
        sample_rate: f32,
        options: PlayOptions,
    ) -> Result<PlaybackSession, PlayError> {
        PlaybackSession::start(self.backend.as_mut(), &self.releases, path, volume_left, volume_right, sample_rate, options)
    }

    /// Start a sound nobody keeps track of
    ///
    /// The backend releases it when it finishes, or at shutdown.
    pub fn start_play_void(
        &mut self,
        path: &Path,
        volume_left: f32,
        volume_right: f32,
        sample_rate: f32,
        options: PlayOptions,
    ) -> Result<(), PlayError> {
        let params = PlayParams {
            volume_left: volume_left.clamp(0.0, 1.0),
            volume_right: volume_right.clamp(0.0, 1.0),
            sample_rate: sample_rate.max(0.0),
            options,
        };
        self.backend.start(path, &params).map(|_| ())
    }

    /// Stop a tracked sound
    pub fn stop_play(&mut self, session: PlaybackSession) {
        session.stop(self.backend.as_mut());
    }

    /// Replace the background music with `path`
    pub fn music_start_play(&mut self, path: &Path, looping: bool) -> Result<(), PlayError> {
        self.music.start_or_replace(self.backend.as_mut(), path, looping, 0.0)
    }

    /// Whether background music is playing
    pub fn music_is_playing(&self) -> bool {
        self.music.is_playing(self.backend.as_ref())
    }

    /// Stop the background music, if any
    pub fn music_stop_play(&mut self) {
        self.music.stop(self.backend.as_mut());
    }

    /// The background music slot
    pub fn music_channel(&self) -> &BackgroundMusicChannel {
        &self.music
    }

    /// Read a mixer channel by name, (0, 0) for unknown names
    pub fn mixer_get(&self, name: &str) -> (f32, f32) {
        MixerChannel::from_name(name)
            .map_or((0.0, 0.0), |channel| self.backend.mixer_get(channel))
    }

    /// Write a mixer channel by name, unknown names are ignored
    pub fn mixer_set(&mut self, name: &str, left: f32, right: f32) {
        match MixerChannel::from_name(name) {
            Some(channel) => self.backend.mixer_set(channel, left, right),
            None => log::warn!("Unknown mixer channel \"{name}\""),
        }
    }

    /// Stop all sounds and disconnect from the backend
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.shut_down {
            return;
        }
        self.music.stop(self.backend.as_mut());
        self.releases.drain(self.backend.as_mut());
        self.backend.stop_all();
        self.backend.shutdown();
        self.shut_down = true;
        log::info!("Sound recorder disconnected");
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("kind", &self.backend.kind())
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("buffer_size", &self.buffer_size)
            .field("music", &self.music)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::{SilentBackend, SilentMonitor};
    use std::path::PathBuf;

    fn recorder() -> (Recorder, SilentMonitor) {
        let backend = SilentBackend::new();
        let monitor = backend.monitor();
        let config = BackendConfig::with_kind(BackendKind::Silent);
        (Recorder::with_backend(Box::new(backend), &config).unwrap(), monitor)
    }

    fn track(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"RIFF\x24\0\0\0WAVEfmt ").unwrap();
        path
    }

    #[test]
    fn test_init_silent() {
        let recorder = Recorder::init(&BackendConfig::with_kind(BackendKind::Silent)).unwrap();
        assert_eq!(recorder.kind(), BackendKind::Silent);
        assert_eq!(recorder.sample_rate(), 22050);
        assert_eq!(recorder.channels(), 2);
        assert_eq!(recorder.buffer_size(), 4096);
        assert!(!recorder.music_is_playing());
    }

    #[test]
    fn test_invalid_config_fails() {
        let config = BackendConfig { channels: 0, ..BackendConfig::with_kind(BackendKind::Silent) };
        assert!(matches!(Recorder::init(&config), Err(AudioError::BackendInitFailed(_))));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, monitor) = recorder();

        recorder.music_start_play(&track(&dir, "menus.wav"), true).unwrap();
        recorder.start_play_void(&track(&dir, "click.wav"), 1.0, 1.0, 0.0, PlayOptions::empty()).unwrap();
        let tracked = recorder.start_play(&track(&dir, "rotor.wav"), 0.5, 0.5, 0.0, PlayOptions::REPEATING).unwrap();
        assert_eq!(monitor.live_sessions(), 3);

        recorder.stop_play(tracked);
        recorder.shutdown();
        assert_eq!(monitor.live_sessions(), 0);
        assert_eq!(monitor.released(), 3);
    }

    #[test]
    fn test_drop_releases_once() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, monitor) = recorder();
        recorder.music_start_play(&track(&dir, "menus.wav"), true).unwrap();

        drop(recorder);
        assert_eq!(monitor.live_sessions(), 0);
        assert_eq!(monitor.released(), 1);
    }

    #[test]
    fn test_manage_events_reaps_finished_music() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, monitor) = recorder();
        recorder.music_start_play(&track(&dir, "enter.wav"), false).unwrap();

        assert_eq!(recorder.manage_events(), 0);
        assert!(recorder.music_is_playing());

        monitor.finish_playing();
        assert!(!recorder.music_is_playing());
        assert_eq!(recorder.manage_events(), 1);
        assert!(!recorder.music_channel().is_held());
        assert_eq!(monitor.released(), 1);

        // Nothing left to release
        assert_eq!(recorder.manage_events(), 0);
    }

    #[test]
    fn test_dropped_session_released_at_next_poll() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, monitor) = recorder();
        {
            let _rotor = recorder.start_play(&track(&dir, "rotor.wav"), 1.0, 1.0, 0.0, PlayOptions::REPEATING).unwrap();
        }
        assert_eq!(monitor.live_sessions(), 1);

        assert_eq!(recorder.manage_events(), 1);
        assert_eq!(monitor.live_sessions(), 0);
        assert_eq!(monitor.released(), 1);
        assert_eq!(recorder.manage_events(), 0);
    }

    #[test]
    fn test_dropped_session_released_at_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, monitor) = recorder();
        let rotor = recorder.start_play(&track(&dir, "rotor.wav"), 1.0, 1.0, 0.0, PlayOptions::REPEATING).unwrap();
        drop(rotor);

        recorder.shutdown();
        assert_eq!(monitor.live_sessions(), 0);
        assert_eq!(monitor.released(), 1);
    }

    #[test]
    fn test_music_replaces_previous_track() {
        let dir = tempfile::tempdir().unwrap();
        let (mut recorder, monitor) = recorder();

        recorder.music_start_play(&track(&dir, "menus.wav"), true).unwrap();
        recorder.music_start_play(&track(&dir, "loading.wav"), true).unwrap();
        assert_eq!(monitor.playing_assets(), vec![dir.path().join("loading.wav")]);

        recorder.music_stop_play();
        recorder.music_stop_play();
        assert!(!recorder.music_is_playing());
        assert_eq!(monitor.live_sessions(), 0);
    }

    #[test]
    fn test_mixer_by_name() {
        let (mut recorder, _monitor) = recorder();

        recorder.mixer_set("WAV", 0.25, 0.5);
        assert_eq!(recorder.mixer_get("wav"), (0.25, 0.5));
        assert_eq!(recorder.mixer_get("volume"), (1.0, 1.0));

        recorder.mixer_set("cd", 0.1, 0.1);
        assert_eq!(recorder.mixer_get("cd"), (0.0, 0.0));
    }
}
