//! SAR jukebox
//!
//! Plays the background music of a scripted sortie through the sound
//! subsystem, logging every music decision.
//!
//! Usage: `sar_jukebox [config.toml|config.ron]`

mod scenes;

use std::path::Path;
use std::time::Duration;

use sar_audio::audio::backend::{SilentBackend, SilentMonitor};
use sar_audio::foundation::logging;
use sar_audio::prelude::*;
use thiserror::Error;

use scenes::Scene;

/// Configuration file read when none is given
const DEFAULT_CONFIG_PATH: &str = "sar_audio.toml";

/// Simulation tick length when sound is audible
const TICK: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
enum JukeboxError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

struct Jukebox {
    recorder: Recorder,
    registry: MusicRegistry,
    music: MusicState,
    data: DataDirs,
    /// Present with the headless backend, used to let tracks end
    monitor: Option<SilentMonitor>,
}

impl Jukebox {
    fn new(config: &AudioConfig) -> Result<Self, JukeboxError> {
        let (recorder, monitor) = if config.backend.kind == BackendKind::Silent {
            let backend = SilentBackend::new();
            let monitor = backend.monitor();
            (Recorder::with_backend(Box::new(backend), &config.backend)?, Some(monitor))
        } else {
            (Recorder::init(&config.backend)?, None)
        };

        let mut registry = MusicRegistry::new();
        if registry.load_from_config(&config.music, &config.data).is_err() {
            log::warn!("Continuing without background music");
        }

        Ok(Self {
            recorder,
            registry,
            music: MusicState::new(config.music.enabled),
            data: config.data.clone(),
            monitor,
        })
    }

    /// Play the scenes in order, returning every decision that changed something
    fn play(&mut self, scenes: &[Scene]) -> Vec<MusicOutcome> {
        let mut decisions = Vec::new();

        for scene in scenes {
            log::info!("Scene: {}", scene.label);

            for tick in 0..scene.ticks {
                // Headless runs have no clock, end one-shot tracks halfway through
                if tick == scene.ticks / 2 {
                    if let Some(monitor) = &self.monitor {
                        monitor.finish_playing();
                    }
                }

                self.recorder.manage_events();
                let outcome = self.music.update(&scene.context, &self.registry, &self.data, &mut self.recorder);

                let quiet = matches!(outcome, MusicOutcome::Unchanged | MusicOutcome::Undecided);
                if !quiet && decisions.last() != Some(&outcome) {
                    log::info!("  tick {tick}: {outcome:?}");
                    decisions.push(outcome);
                }

                if self.monitor.is_none() {
                    std::thread::sleep(TICK);
                }
            }
        }

        decisions
    }

    fn shutdown(self) {
        self.recorder.shutdown();
    }
}

fn run(config_path: &Path) -> Result<(), JukeboxError> {
    let config = AudioConfig::load_or_default(config_path)?;
    config.validate()?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting SAR jukebox");
    let mut jukebox = Jukebox::new(&config)?;
    let decisions = jukebox.play(&scenes::sortie());
    jukebox.shutdown();

    log::info!("Sortie complete, {} music decision(s)", decisions.len());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    match run(Path::new(&config_path)) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("SAR jukebox failed: {e}");
            Err(e.into())
        }
    }
}
