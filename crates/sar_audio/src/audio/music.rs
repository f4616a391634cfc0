//! Music selection
//!
//! Picks the background track from the game situation once per tick. The
//! caller owns a [`MusicState`] and hands it a [`SelectionContext`] describing
//! what the player is doing; the state compares the desired music id with the
//! one last committed and starts, replaces or restarts the background track.
//!
//! Entry variants (`*_ENTER` ids) are one-shot clips. When one of them ends
//! the machine moves on to its steady-state id instead of replaying it.

use crate::assets::DataDirs;
use crate::audio::music_list::MusicRegistry;
use crate::audio::recorder::Recorder;
use crate::audio::PlayError;

/// Music id, the key of a track in the music list
pub type MusicId = i32;

/// Music ids shared with the music list file
pub mod codes {
    use super::MusicId;

    /// Fallback track
    pub const DEFAULT: MusicId = 0;
    /// Any menu
    pub const MENUS: MusicId = 10;
    /// Loading simulation screen
    pub const LOADING_SIMULATION: MusicId = 50;
    /// Mission failed
    pub const MISSION_FAILED: MusicId = 60;
    /// Mission accomplished
    pub const MISSION_SUCCESS: MusicId = 61;
    /// Landed or no aircraft
    pub const SIMULATION_ONGROUND: MusicId = 100;
    /// Entry clip for [`SIMULATION_ONGROUND`]
    pub const SIMULATION_ONGROUND_ENTER: MusicId = 101;
    /// Flying during the day
    pub const SIMULATION_INFLIGHT_DAY: MusicId = 110;
    /// Entry clip for [`SIMULATION_INFLIGHT_DAY`]
    pub const SIMULATION_INFLIGHT_DAY_ENTER: MusicId = 111;
    /// Flying at night
    pub const SIMULATION_INFLIGHT_NIGHT: MusicId = 120;
    /// Entry clip for [`SIMULATION_INFLIGHT_NIGHT`]
    pub const SIMULATION_INFLIGHT_NIGHT_ENTER: MusicId = 121;
    /// Hoist rope out
    pub const SIMULATION_RESCUE: MusicId = 150;
    /// Entry clip for [`SIMULATION_RESCUE`]
    pub const SIMULATION_RESCUE_ENTER: MusicId = 151;
}

/// Name of the main menu
pub const MENU_NAME_MAIN: &str = "Main";

/// Name of the menu shown while a simulation loads
pub const MENU_NAME_LOADING_SIMULATION: &str = "Loading Simulation";

/// Time of day category of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOfDay {
    /// Not set by the scene
    #[default]
    Undefined,
    /// Dawn
    Dawn,
    /// Day
    Day,
    /// Dusk
    Dusk,
    /// Night
    Night,
}

/// Aircraft state of the player object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AircraftView {
    /// On the ground
    pub landed: bool,
}

/// Rescue hoist state of the player object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoistView {
    /// Rope paid out, in meters
    pub rope_extension: f32,
}

/// The player object as far as music selection cares
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerView {
    /// Aircraft part, `None` when the player object is not an aircraft
    pub aircraft: Option<AircraftView>,
    /// First rescue hoist, if the object carries one
    pub hoist: Option<HoistView>,
}

/// The scene as far as music selection cares
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneView {
    /// Time of day category
    pub time_of_day: TimeOfDay,
    /// Player controlled object
    pub player: Option<PlayerView>,
}

/// Game situation read by the selection each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionContext<'a> {
    /// A menu is shown
    Menu {
        /// Name of the current menu
        name: Option<&'a str>,
    },
    /// In simulation
    Simulation {
        /// Current scene, `None` while none is loaded
        scene: Option<SceneView>,
    },
}

/// Music ids wanted for a situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MusicSelection {
    /// Track id to play, `None` for no opinion
    pub music_id: Option<MusicId>,
    /// Entry clip of that track, simulation only
    pub entry_id: Option<MusicId>,
}

impl MusicSelection {
    fn pair(music_id: MusicId, entry_id: MusicId) -> Self {
        Self { music_id: Some(music_id), entry_id: Some(entry_id) }
    }

    /// Decide the wanted music ids for a situation
    pub fn select(context: &SelectionContext<'_>) -> Self {
        match context {
            SelectionContext::Menu { name } => {
                let music_id = match name {
                    Some(name) if name.eq_ignore_ascii_case(MENU_NAME_LOADING_SIMULATION) => {
                        codes::LOADING_SIMULATION
                    }
                    _ => codes::MENUS,
                };
                Self { music_id: Some(music_id), entry_id: None }
            }
            SelectionContext::Simulation { scene: Some(scene) } => Self::select_in_scene(scene),
            SelectionContext::Simulation { scene: None } => Self::default(),
        }
    }

    fn select_in_scene(scene: &SceneView) -> Self {
        let on_ground = Self::pair(codes::SIMULATION_ONGROUND, codes::SIMULATION_ONGROUND_ENTER);
        let Some(player) = scene.player else {
            return on_ground;
        };

        let mut selection = Self::default();
        if let Some(aircraft) = player.aircraft {
            selection = if aircraft.landed {
                on_ground
            } else if scene.time_of_day == TimeOfDay::Night {
                Self::pair(codes::SIMULATION_INFLIGHT_NIGHT, codes::SIMULATION_INFLIGHT_NIGHT_ENTER)
            } else {
                Self::pair(codes::SIMULATION_INFLIGHT_DAY, codes::SIMULATION_INFLIGHT_DAY_ENTER)
            };
        }

        // Rescue overrides flight and ground
        if player.hoist.is_some_and(|hoist| hoist.rope_extension > 0.0) {
            selection = Self::pair(codes::SIMULATION_RESCUE, codes::SIMULATION_RESCUE_ENTER);
        }

        Self {
            music_id: selection.music_id.or(on_ground.music_id),
            entry_id: selection.entry_id.or(on_ground.entry_id),
        }
    }
}

/// Track that follows `id` once it has finished playing
pub fn continuation_of(id: MusicId) -> MusicId {
    match id {
        codes::SIMULATION_ONGROUND_ENTER => codes::SIMULATION_ONGROUND,
        codes::SIMULATION_INFLIGHT_DAY_ENTER => codes::SIMULATION_INFLIGHT_DAY,
        codes::SIMULATION_INFLIGHT_NIGHT_ENTER => codes::SIMULATION_INFLIGHT_NIGHT,
        codes::SIMULATION_RESCUE_ENTER => codes::SIMULATION_RESCUE,
        other => other,
    }
}

/// What [`MusicState::update`] did this tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicOutcome {
    /// Music is switched off, the background track was stopped
    Disabled,
    /// The situation named no track
    Undecided,
    /// The desired track is already playing
    Unchanged,
    /// Changed to a new track
    Started(MusicId),
    /// The current track ended and `to` was started after it
    Continued {
        /// Track that ended
        from: MusicId,
        /// Track started in its place
        to: MusicId,
    },
    /// No music list entry for the id, previous playback left alone
    Missing(MusicId),
    /// Playback failed and music was switched off
    Failed {
        /// Track that failed
        id: MusicId,
        /// Why it failed
        error: PlayError,
    },
}

/// Selection state kept across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicState {
    /// Last music id committed to playback
    pub current_music_id: Option<MusicId>,
    /// Music option switch
    pub enabled: bool,
}

impl MusicState {
    /// Create a state with nothing playing yet
    pub fn new(enabled: bool) -> Self {
        Self { current_music_id: None, enabled }
    }

    /// Bring the background track in line with the situation
    ///
    /// Any playback failure switches music off and forgets the current id;
    /// it stays off until `enabled` is set again.
    pub fn update(
        &mut self,
        context: &SelectionContext<'_>,
        registry: &MusicRegistry,
        dirs: &DataDirs,
        recorder: &mut Recorder,
    ) -> MusicOutcome {
        if !self.enabled {
            recorder.music_stop_play();
            return MusicOutcome::Disabled;
        }

        let Some(desired) = MusicSelection::select(context).music_id else {
            return MusicOutcome::Undecided;
        };

        if self.current_music_id != Some(desired) {
            log::debug!("Changing to music id {desired} from id {:?}", self.current_music_id);
            return self.play(desired, registry, dirs, recorder).map_or(
                MusicOutcome::Missing(desired),
                |result| match result {
                    Ok(()) => MusicOutcome::Started(desired),
                    Err(error) => MusicOutcome::Failed { id: desired, error },
                },
            );
        }

        if recorder.music_is_playing() {
            return MusicOutcome::Unchanged;
        }

        let next = continuation_of(desired);
        log::debug!("Music id {desired} stopped playing, playing music id {next}");
        self.play(next, registry, dirs, recorder).map_or(
            MusicOutcome::Missing(next),
            |result| match result {
                Ok(()) => MusicOutcome::Continued { from: desired, to: next },
                Err(error) => MusicOutcome::Failed { id: next, error },
            },
        )
    }

    /// Start the track for `id`, `None` when the music list has no entry
    fn play(
        &mut self,
        id: MusicId,
        registry: &MusicRegistry,
        dirs: &DataDirs,
        recorder: &mut Recorder,
    ) -> Option<Result<(), PlayError>> {
        let (reference, _) = registry.find_by_id(id)?;
        let path = dirs.resolve(&reference.file_path);

        match recorder.music_start_play(&path, reference.is_repeating()) {
            Ok(()) => {
                self.current_music_id = Some(id);
                Some(Ok(()))
            }
            Err(e) => {
                log::error!("{}: Unable to play music, turning music off: {e}", reference.file_path);
                self.enabled = false;
                self.current_music_id = None;
                Some(Err(e))
            }
        }
    }
}

impl Default for MusicState {
    fn default() -> Self {
        Self::new(true)
    }
}
