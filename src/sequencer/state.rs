// Persisted sequencer state
// Grid and key settings serialize as one record; timing state is always
// rederived from the host position and never stored

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State (de)serialization error types
#[derive(Debug, Error)]
pub enum StateError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_num_steps() -> usize {
    16
}

fn default_num_rows() -> usize {
    16
}

fn default_lowest_note() -> u8 {
    48
}

fn default_resolution() -> u8 {
    1
}

fn default_time_sig_numerator() -> u8 {
    4
}

fn default_time_sig_denominator() -> u8 {
    4
}

/// One step column, listing only its active rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepState {
    /// Step index in the pattern
    pub index: usize,
    /// Rows active at this step
    #[serde(default)]
    pub active_rows: Vec<usize>,
}

/// Serializable sequencer session state
///
/// Missing fields fall back to their documented defaults rather than
/// failing the whole load. Steps are stored sparsely: silent steps are
/// omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequencerState {
    /// Number of step columns
    #[serde(default = "default_num_steps")]
    pub num_steps: usize,
    /// Number of rows per column
    #[serde(default = "default_num_rows")]
    pub num_rows: usize,
    /// MIDI note of the bottom row
    #[serde(default = "default_lowest_note")]
    pub lowest_note: u8,
    /// Root pitch class of the key signature (0 = C)
    #[serde(default)]
    pub root_note: u8,
    /// Playback resolution index (0 = half, 1 = normal, 2 = double)
    #[serde(default = "default_resolution")]
    pub resolution: u8,
    #[serde(default = "default_time_sig_numerator")]
    pub time_sig_numerator: u8,
    #[serde(default = "default_time_sig_denominator")]
    pub time_sig_denominator: u8,
    /// Sparse step data: only steps with active rows
    #[serde(default)]
    pub steps: Vec<StepState>,
}

impl Default for SequencerState {
    fn default() -> Self {
        Self {
            num_steps: default_num_steps(),
            num_rows: default_num_rows(),
            lowest_note: default_lowest_note(),
            root_note: 0,
            resolution: default_resolution(),
            time_sig_numerator: default_time_sig_numerator(),
            time_sig_denominator: default_time_sig_denominator(),
            steps: Vec::new(),
        }
    }
}

/// Serialize sequencer state to JSON
pub fn to_json(state: &SequencerState) -> Result<String, StateError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Deserialize sequencer state from JSON
pub fn from_json(json: &str) -> Result<SequencerState, StateError> {
    Ok(serde_json::from_str(json)?)
}
