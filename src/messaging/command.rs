// Command types - communication control surface → audio

use crate::sequencer::timeline::Resolution;

/// A typed configuration update, dispatched once per change
///
/// Raw control indices are carried as-is; out-of-range values are
/// rejected at the application site, keeping prior state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigChange {
    RootNote(i32),
    ScaleType(i32),
    FilterMode(i32),
    NumSteps(usize),
    Bpm(f64),
}

/// A control-surface command applied on the audio thread at block start
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetCell {
        step: usize,
        row: usize,
        active: bool,
    },
    ToggleCell {
        step: usize,
        row: usize,
    },
    ClearAll,
    Randomize,
    OctaveUp,
    OctaveDown,
    SetResolution(Resolution),
    Config(ConfigChange),
    Start,
    Stop,
}
