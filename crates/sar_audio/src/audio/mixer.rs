//! Audio mixer channels
//!
//! Backend-wide stereo levels, addressed by the channel names used in the
//! game's sound options ("volume", "midi", "wav").

use std::collections::HashMap;

/// Mixer channels exposed to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixerChannel {
    /// Master output volume
    Volume,
    /// Synthesizer output, stored but not applied to sampled sounds
    Synth,
    /// Sampled (PCM) sound output
    Pcm,
}

impl MixerChannel {
    /// Look up a channel by its option name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("volume") {
            Some(Self::Volume)
        } else if name.eq_ignore_ascii_case("midi") {
            Some(Self::Synth)
        } else if name.eq_ignore_ascii_case("wav") {
            Some(Self::Pcm)
        } else {
            None
        }
    }
}

/// Per-channel stereo levels (0.0 to 1.0)
#[derive(Debug, Clone)]
pub struct MixerLevels {
    levels: HashMap<MixerChannel, (f32, f32)>,
}

impl MixerLevels {
    /// Create mixer levels with every channel at full volume
    pub fn new() -> Self {
        let mut levels = HashMap::new();
        levels.insert(MixerChannel::Volume, (1.0, 1.0));
        levels.insert(MixerChannel::Synth, (1.0, 1.0));
        levels.insert(MixerChannel::Pcm, (1.0, 1.0));
        Self { levels }
    }

    /// Get the levels of a channel
    pub fn get(&self, channel: MixerChannel) -> (f32, f32) {
        self.levels.get(&channel).copied().unwrap_or((1.0, 1.0))
    }

    /// Set the levels of a channel, clamped to 0.0..=1.0
    pub fn set(&mut self, channel: MixerChannel, left: f32, right: f32) {
        self.levels.insert(channel, (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0)));
    }

    /// Gain applied on top of every sampled sound
    pub fn master_gain(&self) -> (f32, f32) {
        let (vl, vr) = self.get(MixerChannel::Volume);
        let (pl, pr) = self.get(MixerChannel::Pcm);
        (vl * pl, vr * pr)
    }
}

impl Default for MixerLevels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_channel_names() {
        assert_eq!(MixerChannel::from_name("Volume"), Some(MixerChannel::Volume));
        assert_eq!(MixerChannel::from_name("midi"), Some(MixerChannel::Synth));
        assert_eq!(MixerChannel::from_name("WAV"), Some(MixerChannel::Pcm));
        assert_eq!(MixerChannel::from_name("cd"), None);
    }

    #[test]
    fn test_level_clamping() {
        let mut mixer = MixerLevels::new();
        mixer.set(MixerChannel::Pcm, 2.0, -0.5);
        assert_eq!(mixer.get(MixerChannel::Pcm), (1.0, 0.0));
    }

    #[test]
    fn test_master_gain_combines_volume_and_pcm() {
        let mut mixer = MixerLevels::new();
        mixer.set(MixerChannel::Volume, 0.5, 1.0);
        mixer.set(MixerChannel::Pcm, 0.8, 0.25);
        mixer.set(MixerChannel::Synth, 0.0, 0.0);

        let (left, right) = mixer.master_gain();
        assert_relative_eq!(left, 0.4);
        assert_relative_eq!(right, 0.25);
    }
}
