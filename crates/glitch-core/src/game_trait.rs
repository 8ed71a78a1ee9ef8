use serde::{Deserialize, Serialize};

use crate::input::InputEvent;
use crate::time::SimClock;

/// Core trait for a fixed-tick simulation.
///
/// The host loop owns the window, audio and menus; the simulation only
/// consumes key events and advances its own state.
pub trait Simulation {
    /// Metadata for the host's title/HUD.
    fn metadata(&self) -> SimMetadata;

    /// Called once per tick with the key events captured since the last tick.
    fn update(&mut self, dt: f32, inputs: &[InputEvent]) -> Vec<SimEvent>;

    /// Target tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Freeze updates (state and clock stay put).
    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// The simulation clock driving both tick-count and elapsed-time behaviour.
    fn clock(&self) -> &SimClock;
}

/// Metadata for the host's title screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimMetadata {
    pub name: String,
    pub description: String,
    pub level_count: usize,
}

/// Per-session flags threaded through update and render calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimContext {
    pub debug: bool,
}

/// Signals emitted during update for the host's state machine and HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    GlitchStarted { label: String },
    GlitchEnded { label: String },
    HazardHit,
    ExitReached,
    DebugToggled { enabled: bool },
}

/// Generates the `Simulation` methods that are identical across simulations:
/// `pause`, `resume`, `is_paused`, `clock`.
///
/// Requires the implementing struct to have `paused: bool` and
/// `clock: SimClock` fields.
#[macro_export]
macro_rules! simulation_boilerplate {
    () => {
        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn clock(&self) -> &$crate::time::SimClock {
            &self.clock
        }
    };
}
