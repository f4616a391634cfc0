//! Background music slot
//!
//! Holds zero or one [`PlaybackSession`] designated as the background track.
//! Starting a track always releases the previous one first. A channel
//! dropped while holding a track hands it to its [`ReleaseQueue`].

use std::path::Path;

use crate::audio::backend::SoundBackend;
use crate::audio::session::{PlayOptions, PlaybackSession, ReleaseQueue};
use crate::audio::PlayError;

/// Single-slot holder for the current background track
#[derive(Debug, Default)]
pub struct BackgroundMusicChannel {
    session: Option<PlaybackSession>,
    releases: ReleaseQueue,
}

impl BackgroundMusicChannel {
    /// Create an empty channel with its own release queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty channel whose dropped tracks go to `releases`
    pub fn with_release_queue(releases: ReleaseQueue) -> Self {
        Self { session: None, releases }
    }

    /// Stop whatever is playing, then start `asset_path` at full volume
    ///
    /// On failure the channel is left empty and the error is returned.
    pub fn start_or_replace(
        &mut self,
        backend: &mut dyn SoundBackend,
        asset_path: &Path,
        looping: bool,
        sample_rate: f32,
    ) -> Result<(), PlayError> {
        self.stop(backend);

        let options = if looping { PlayOptions::REPEATING } else { PlayOptions::empty() };
        let session = PlaybackSession::start(backend, &self.releases, asset_path, 1.0, 1.0, sample_rate, options)?;
        log::debug!("Background music {} started", asset_path.display());
        self.session = Some(session);
        Ok(())
    }

    /// Whether the held track is still playing, false when nothing is held
    pub fn is_playing(&self, backend: &dyn SoundBackend) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_active(backend))
    }

    /// Stop and release the held track, if any
    pub fn stop(&mut self, backend: &mut dyn SoundBackend) {
        if let Some(session) = self.session.take() {
            log::debug!("Background music {} stopped", session.asset().display());
            session.stop(backend);
        }
    }

    /// Release the held track if it has finished on its own
    ///
    /// Returns true when a session was reaped.
    pub fn reap_finished(&mut self, backend: &mut dyn SoundBackend) -> bool {
        if self.session.is_some() && !self.is_playing(backend) {
            self.stop(backend);
            true
        } else {
            false
        }
    }

    /// The held session
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Mutable access to the held session for volume and rate changes
    pub fn session_mut(&mut self) -> Option<&mut PlaybackSession> {
        self.session.as_mut()
    }

    /// Whether a session is held, playing or not
    pub fn is_held(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::{BackendConfig, BackendKind, SilentBackend, SilentMonitor};
    use std::path::PathBuf;

    fn setup() -> (SilentBackend, SilentMonitor, tempfile::TempDir) {
        let mut backend = SilentBackend::new();
        backend.initialize(&BackendConfig::with_kind(BackendKind::Silent)).unwrap();
        let monitor = backend.monitor();
        (backend, monitor, tempfile::tempdir().unwrap())
    }

    fn track(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"OggS\0\x02vorbis").unwrap();
        path
    }

    #[test]
    fn test_single_session_invariant() {
        let (mut backend, monitor, dir) = setup();
        let mut channel = BackgroundMusicChannel::new();
        let first = track(&dir, "menus.ogg");
        let second = track(&dir, "ground.ogg");
        let third = track(&dir, "flight.ogg");

        channel.start_or_replace(&mut backend, &first, true, 0.0).unwrap();
        channel.start_or_replace(&mut backend, &second, false, 0.0).unwrap();
        channel.start_or_replace(&mut backend, &third, true, 0.0).unwrap();

        assert_eq!(monitor.live_sessions(), 1);
        assert_eq!(monitor.playing_assets(), vec![third.clone()]);
        assert_eq!(monitor.released(), 2);
        assert_eq!(channel.session().map(PlaybackSession::asset), Some(third.as_path()));
        assert!(channel.is_playing(&backend));
    }

    #[test]
    fn test_failed_start_leaves_channel_empty() {
        let (mut backend, monitor, dir) = setup();
        let mut channel = BackgroundMusicChannel::new();
        channel.start_or_replace(&mut backend, &track(&dir, "menus.ogg"), true, 0.0).unwrap();

        let result = channel.start_or_replace(&mut backend, Path::new(""), true, 0.0);
        assert!(matches!(result, Err(PlayError::AssetLoadFailed { .. })));
        assert!(!channel.is_held());
        assert!(!channel.is_playing(&backend));
        assert_eq!(monitor.live_sessions(), 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut backend, monitor, dir) = setup();
        let mut channel = BackgroundMusicChannel::new();
        channel.stop(&mut backend);

        channel.start_or_replace(&mut backend, &track(&dir, "menus.ogg"), false, 0.0).unwrap();
        channel.stop(&mut backend);
        channel.stop(&mut backend);

        assert!(!channel.is_held());
        assert_eq!(monitor.released(), 1);
    }

    #[test]
    fn test_loop_flag_maps_to_repeating() {
        let (mut backend, monitor, dir) = setup();
        let mut channel = BackgroundMusicChannel::new();

        channel.start_or_replace(&mut backend, &track(&dir, "rescue.ogg"), true, 0.0).unwrap();
        let handle = channel.session().map(PlaybackSession::handle).unwrap();
        assert_eq!(monitor.is_repeating(handle), Some(true));

        // Looping music never finishes on its own
        assert_eq!(monitor.finish_playing(), 0);
        assert!(channel.is_playing(&backend));
    }

    #[test]
    fn test_finished_track_is_reaped() {
        let (mut backend, monitor, dir) = setup();
        let mut channel = BackgroundMusicChannel::new();
        channel.start_or_replace(&mut backend, &track(&dir, "enter.ogg"), false, 0.0).unwrap();

        assert!(!channel.reap_finished(&mut backend));
        monitor.finish_playing();
        assert!(!channel.is_playing(&backend));
        assert!(channel.is_held());

        assert!(channel.reap_finished(&mut backend));
        assert!(!channel.is_held());
        assert_eq!(monitor.live_sessions(), 0);
    }

    #[test]
    fn test_dropped_channel_queues_held_track() {
        let (mut backend, monitor, dir) = setup();
        let releases = ReleaseQueue::new();
        let mut channel = BackgroundMusicChannel::with_release_queue(releases.clone());
        channel.start_or_replace(&mut backend, &track(&dir, "rescue.ogg"), true, 0.0).unwrap();

        drop(channel);
        assert_eq!(monitor.live_sessions(), 1);

        assert_eq!(releases.drain(&mut backend), 1);
        assert_eq!(monitor.live_sessions(), 0);
    }
}
