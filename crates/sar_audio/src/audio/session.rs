//! Playback sessions
//!
//! A [`PlaybackSession`] is one sound started on a backend. It remembers the
//! last values applied so repeated requests do not reach the backend, and it
//! is released by consuming it in [`PlaybackSession::stop`], so a stopped
//! session can not be touched again.
//!
//! A session dropped without `stop` queues its handle on a [`ReleaseQueue`];
//! the owner of the backend drains the queue on its next event poll.

use bitflags::bitflags;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::audio::backend::{PlayParams, SessionHandle, SoundBackend};
use crate::audio::PlayError;

bitflags! {
    /// Sound play options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlayOptions: u32 {
        /// Play at zero gain regardless of the requested volume
        const MUTE = 1 << 0;
        /// Loop until stopped
        const REPEATING = 1 << 1;
    }
}

/// Handles of sessions dropped without being stopped
#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue {
    pending: Rc<RefCell<Vec<SessionHandle>>>,
}

impl ReleaseQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, handle: SessionHandle) {
        self.pending.borrow_mut().push(handle);
    }

    /// Number of handles waiting to be released
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether nothing is waiting to be released
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Stop every queued sound, returns how many still held backend resources
    pub fn drain(&self, backend: &mut dyn SoundBackend) -> usize {
        let pending: Vec<SessionHandle> = self.pending.borrow_mut().drain(..).collect();
        let before = backend.active_count();
        for handle in pending {
            backend.stop(handle);
        }
        before.saturating_sub(backend.active_count())
    }
}

/// One actively playing sound
#[must_use = "a dropped playback session is only released at the next event poll"]
#[derive(Debug)]
pub struct PlaybackSession {
    handle: SessionHandle,
    releases: ReleaseQueue,
    released: bool,
    asset: PathBuf,
    /// Last requested volume (0.0 to 1.0), before muting
    volume_left: f32,
    volume_right: f32,
    /// Applied sample rate, 0.0 for the asset's own rate
    sample_rate: f32,
    options: PlayOptions,
}

impl PlaybackSession {
    /// Load an asset and start playing it immediately
    ///
    /// If the session is dropped without [`PlaybackSession::stop`], its
    /// handle goes to `releases`.
    pub fn start(
        backend: &mut dyn SoundBackend,
        releases: &ReleaseQueue,
        asset_path: &Path,
        volume_left: f32,
        volume_right: f32,
        sample_rate: f32,
        options: PlayOptions,
    ) -> Result<Self, PlayError> {
        let params = PlayParams {
            volume_left: volume_left.clamp(0.0, 1.0),
            volume_right: volume_right.clamp(0.0, 1.0),
            sample_rate: sample_rate.max(0.0),
            options,
        };

        let handle = backend.start(asset_path, &params).map_err(|e| {
            log::warn!("{e}");
            e
        })?;

        log::trace!("Started {} ({options:?})", asset_path.display());
        Ok(Self {
            handle,
            releases: releases.clone(),
            released: false,
            asset: asset_path.to_path_buf(),
            volume_left: params.volume_left,
            volume_right: params.volume_right,
            sample_rate: params.sample_rate,
            options,
        })
    }

    /// Halt playback and release the backend resources
    ///
    /// The session is consumed even when the backend has already been shut
    /// down or has reaped the sound itself.
    pub fn stop(mut self, backend: &mut dyn SoundBackend) {
        backend.stop(self.handle);
        self.released = true;
        log::trace!("Stopped {}", self.asset.display());
    }

    /// Change the volume, a no-op when it matches the last applied value
    #[allow(clippy::float_cmp)]
    pub fn set_volume(&mut self, backend: &mut dyn SoundBackend, volume_left: f32, volume_right: f32) {
        let left = volume_left.clamp(0.0, 1.0);
        let right = volume_right.clamp(0.0, 1.0);
        if left == self.volume_left && right == self.volume_right {
            return;
        }

        self.volume_left = left;
        self.volume_right = right;
        self.apply_gain(backend);
    }

    /// Mute or unmute, keeping the requested volume for when it is unmuted
    pub fn set_mute(&mut self, backend: &mut dyn SoundBackend, mute: bool) {
        if self.options.contains(PlayOptions::MUTE) == mute {
            return;
        }
        self.options.set(PlayOptions::MUTE, mute);
        self.apply_gain(backend);
    }

    /// Change the applied sample rate, a no-op when unchanged
    ///
    /// Negative rates are treated as 0.0 (the asset's own rate).
    #[allow(clippy::float_cmp)]
    pub fn set_sample_rate(&mut self, backend: &mut dyn SoundBackend, sample_rate: f32) {
        let sample_rate = sample_rate.max(0.0);
        if sample_rate == self.sample_rate {
            return;
        }

        backend.set_sample_rate(self.handle, sample_rate);
        self.sample_rate = sample_rate;
    }

    /// Check whether the backend is still playing this sound
    pub fn is_active(&self, backend: &dyn SoundBackend) -> bool {
        backend.is_active(self.handle)
    }

    fn apply_gain(&self, backend: &mut dyn SoundBackend) {
        let (left, right) = if self.is_muted() {
            (0.0, 0.0)
        } else {
            (self.volume_left, self.volume_right)
        };
        backend.set_gain(self.handle, left, right);
    }

    /// Backend handle of this sound
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    /// Asset this session plays
    pub fn asset(&self) -> &Path {
        &self.asset
    }

    /// Last requested volume as (left, right)
    pub fn volume(&self) -> (f32, f32) {
        (self.volume_left, self.volume_right)
    }

    /// Applied sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Current play options
    pub fn options(&self) -> PlayOptions {
        self.options
    }

    /// Whether the session is muted
    pub fn is_muted(&self) -> bool {
        self.options.contains(PlayOptions::MUTE)
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if !self.released {
            log::trace!("Dropped {}, releasing at next poll", self.asset.display());
            self.releases.push(self.handle);
        }
    }
}
