//! # SAR Audio
//!
//! Background music and sound playback for a search and rescue flight
//! simulator.
//!
//! ## Features
//!
//! - **Music Selection**: Per-tick choice of the background track from the game situation
//! - **Music List**: Track references loaded from the game's music list file
//! - **Backends**: Rodio output or a headless backend, chosen at startup
//! - **Configuration**: TOML or RON configuration files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sar_audio::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AudioConfig::load_or_default("audio.toml")?;
//!     sar_audio::foundation::logging::init_with_level(&config.log_level);
//!
//!     let mut recorder = Recorder::init(&config.backend)?;
//!     let mut registry = MusicRegistry::new();
//!     registry.load_from_config(&config.music, &config.data)?;
//!
//!     let mut music = MusicState::new(config.music.enabled);
//!     let menu = SelectionContext::Menu { name: Some("Main") };
//!
//!     // Once per tick
//!     recorder.manage_events();
//!     music.update(&menu, &registry, &config.data, &mut recorder);
//!
//!     recorder.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod assets;
pub mod audio;
pub mod config;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        assets::DataDirs,
        audio::{
            AudioError, BackendConfig, BackendKind, LoadError, MusicOutcome, MusicRegistry,
            MusicSelection, MusicState, PlayError, PlayOptions, PlaybackSession, Recorder,
            SelectionContext, SoundBackend,
            music::{codes, AircraftView, HoistView, PlayerView, SceneView, TimeOfDay},
        },
        core::config::{AudioConfig, Config, ConfigError, MusicConfig},
    };
}
