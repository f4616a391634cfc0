//! Scripted game situations
//!
//! A short sortie from the main menu through a night hoist rescue, used to
//! drive the music selection without the simulator.

use sar_audio::audio::music::{
    AircraftView, HoistView, PlayerView, SceneView, SelectionContext, TimeOfDay, MENU_NAME_LOADING_SIMULATION,
    MENU_NAME_MAIN,
};

/// One situation held for a number of ticks
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    /// Shown in the log
    pub label: &'static str,
    /// What the music selection sees
    pub context: SelectionContext<'static>,
    /// How long the situation lasts
    pub ticks: u32,
}

fn aircraft(time_of_day: TimeOfDay, landed: bool, rope_extension: f32) -> SelectionContext<'static> {
    SelectionContext::Simulation {
        scene: Some(SceneView {
            time_of_day,
            player: Some(PlayerView {
                aircraft: Some(AircraftView { landed }),
                hoist: Some(HoistView { rope_extension }),
            }),
        }),
    }
}

/// The sortie, in order
pub fn sortie() -> Vec<Scene> {
    vec![
        Scene {
            label: "main menu",
            context: SelectionContext::Menu { name: Some(MENU_NAME_MAIN) },
            ticks: 40,
        },
        Scene {
            label: "mission briefing",
            context: SelectionContext::Menu { name: Some("Mission Brief") },
            ticks: 20,
        },
        Scene {
            label: "loading simulation",
            context: SelectionContext::Menu { name: Some(MENU_NAME_LOADING_SIMULATION) },
            ticks: 20,
        },
        Scene {
            label: "scene not ready",
            context: SelectionContext::Simulation { scene: None },
            ticks: 5,
        },
        Scene {
            label: "on the pad",
            context: aircraft(TimeOfDay::Dusk, true, 0.0),
            ticks: 40,
        },
        Scene {
            label: "dusk flight",
            context: aircraft(TimeOfDay::Dusk, false, 0.0),
            ticks: 60,
        },
        Scene {
            label: "night flight",
            context: aircraft(TimeOfDay::Night, false, 0.0),
            ticks: 60,
        },
        Scene {
            label: "hoist rescue",
            context: aircraft(TimeOfDay::Night, false, 12.5),
            ticks: 40,
        },
        Scene {
            label: "return to base",
            context: aircraft(TimeOfDay::Night, true, 0.0),
            ticks: 30,
        },
    ]
}
