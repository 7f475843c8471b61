// Sequencer core - composition root and public facade
// Owns the grid, the step timer, the key signature and the pitch layout

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ringbuf::traits::Consumer;

use crate::messaging::channels::CommandConsumer;
use crate::messaging::command::{Command, ConfigChange};
use crate::midi::event::MidiEventTimed;
use crate::sequencer::engine::{LastNoteInfo, StepTimer, row_note};
use crate::sequencer::grid::StepGrid;
use crate::sequencer::key_signature::{FilterMode, KeySignature, ScaleType};
use crate::sequencer::state::{SequencerState, StepState};
use crate::sequencer::timeline::{Resolution, TimeSignature};
use crate::sequencer::transport::TransportSnapshot;

/// Lowest permitted value for the bottom row's MIDI note after octave
/// shifting
const LOWEST_NOTE_MIN: i16 = 0;
/// Highest permitted value for the bottom row's MIDI note
const LOWEST_NOTE_MAX: i16 = 108;

/// The sequencer: grid, key signature and step timer behind one facade
///
/// All mutation entry points run on a single control/audio context;
/// cross-thread edits arrive through the command channel and are
/// drained at block start (`drain_commands`).
pub struct StepSequencer {
    grid: StepGrid,
    timer: StepTimer,
    key_signature: KeySignature,
    lowest_note: u8,
    host_was_playing: bool,
    rng: StdRng,
}

impl StepSequencer {
    /// 16 steps x 16 rows, bottom row C3
    pub fn new() -> Self {
        let mut sequencer = Self {
            grid: StepGrid::new(0, 0),
            timer: StepTimer::new(),
            key_signature: KeySignature::new(),
            lowest_note: 48,
            host_was_playing: false,
            rng: StdRng::from_entropy(),
        };
        sequencer.initialize(16, 16);
        sequencer
    }

    /// Reset to a fresh pattern of the given dimensions
    ///
    /// Clears the grid, restores the default key signature and rewinds
    /// playback; the sample rate survives.
    pub fn initialize(&mut self, num_steps: usize, num_rows: usize) {
        self.grid = StepGrid::new(num_steps, num_rows);

        let sample_rate = self.timer.sample_rate();
        let mut timer = StepTimer::new();
        timer.set_pattern_size(num_steps, num_rows);
        timer.prepare(sample_rate);
        self.timer = timer;

        self.key_signature = KeySignature::new();
        debug!("initialize: {num_steps} steps x {num_rows} rows");
    }

    /// Adopt the session audio format before the first block
    pub fn prepare_to_play(&mut self, sample_rate: f64, block_size: usize) {
        self.timer.prepare(sample_rate);
        debug!("prepare_to_play: sample_rate={sample_rate}, block_size={block_size}");
    }

    // ------------------------------------------------------------------
    // Block path
    // ------------------------------------------------------------------

    /// Track the host position, called once per block before
    /// `process_block`
    ///
    /// Host play/stop edges start and stop the timer; the timer then
    /// adopts tempo/signature changes and jump-corrects its phase.
    pub fn update_transport(&mut self, position: &TransportSnapshot) {
        if position.is_playing && !self.host_was_playing {
            self.timer.start();
        } else if !position.is_playing && self.host_was_playing {
            self.timer.stop();
        }
        self.host_was_playing = position.is_playing;

        self.timer.update_transport(position);
    }

    /// Emit this block's events into `events` at exact sample offsets
    pub fn process_block(&mut self, num_samples: usize, events: &mut Vec<MidiEventTimed>) {
        self.timer
            .process_block(&self.grid, self.lowest_note, num_samples, events);
    }

    /// Apply every queued control-surface command
    ///
    /// Called at block start on the audio thread; commands enqueued
    /// before a block are guaranteed audible in that block.
    pub fn drain_commands(&mut self, commands: &mut CommandConsumer) {
        while let Some(command) = commands.try_pop() {
            self.apply_command(command);
        }
    }

    // ------------------------------------------------------------------
    // Transport control
    // ------------------------------------------------------------------

    pub fn start(&mut self) {
        self.timer.start();
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_playing()
    }

    pub fn current_step(&self) -> usize {
        self.timer.current_step()
    }

    pub fn last_note(&self) -> &LastNoteInfo {
        self.timer.last_note()
    }

    pub fn samples_per_step(&self) -> f64 {
        self.timer.samples_per_step()
    }

    pub fn bpm(&self) -> f64 {
        self.timer.bpm()
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.timer.time_signature()
    }

    // ------------------------------------------------------------------
    // Grid editing
    // ------------------------------------------------------------------

    pub fn num_steps(&self) -> usize {
        self.grid.num_steps()
    }

    pub fn num_rows(&self) -> usize {
        self.grid.num_rows()
    }

    /// Read a cell; out-of-range coordinates read as inactive
    pub fn cell(&self, step: usize, row: usize) -> bool {
        self.grid.cell(step, row)
    }

    /// Write a cell, subject to the key-signature admission policy
    ///
    /// In Lock mode an activation of an out-of-key row is silently
    /// rejected. Clearing always succeeds: a leftover out-of-key cell
    /// must remain clearable after the key changes.
    pub fn set_cell(&mut self, step: usize, row: usize, active: bool) {
        if step >= self.grid.num_steps() || row >= self.grid.num_rows() {
            return;
        }
        if active
            && self.key_signature.filter_mode() == FilterMode::Lock
            && !self.key_signature.is_in_key(self.note_for_row(row))
        {
            return;
        }
        self.grid.set(step, row, active);
    }

    /// Flip a cell through the same admission policy as `set_cell`
    pub fn toggle_cell(&mut self, step: usize, row: usize) {
        let active = self.grid.cell(step, row);
        self.set_cell(step, row, !active);
    }

    pub fn clear_all(&mut self) {
        self.grid.clear();
    }

    /// Replace the pattern with a random one
    pub fn randomize(&mut self) {
        self.grid.randomize(&mut self.rng);
    }

    /// Change the pattern length, preserving the left-aligned overlap
    ///
    /// Step counts outside the supported range (multiples of 4 in
    /// [4, 64]) are ignored.
    pub fn set_num_steps(&mut self, num_steps: usize) {
        if num_steps == self.grid.num_steps() {
            return;
        }
        if !(4..=64).contains(&num_steps) || num_steps % 4 != 0 {
            return;
        }
        self.grid.resize_steps(num_steps);
        self.timer.set_pattern_size(num_steps, self.grid.num_rows());
        debug!("set_num_steps: {num_steps}");
    }

    // ------------------------------------------------------------------
    // Pitch layout
    // ------------------------------------------------------------------

    /// MIDI note of the bottom row
    pub fn lowest_note(&self) -> u8 {
        self.lowest_note
    }

    /// MIDI note a row maps to: row 0 is the highest pitch
    pub fn note_for_row(&self, row: usize) -> u8 {
        row_note(self.lowest_note, self.grid.num_rows(), row)
    }

    /// Octave of the bottom row as displayed (C4 = octave 4)
    pub fn current_octave(&self) -> i32 {
        (self.lowest_note / 12) as i32 - 1
    }

    pub fn shift_octave_up(&mut self) {
        self.lowest_note =
            (self.lowest_note as i16 + 12).clamp(LOWEST_NOTE_MIN, LOWEST_NOTE_MAX) as u8;
    }

    pub fn shift_octave_down(&mut self) {
        self.lowest_note =
            (self.lowest_note as i16 - 12).clamp(LOWEST_NOTE_MIN, LOWEST_NOTE_MAX) as u8;
    }

    // ------------------------------------------------------------------
    // Key signature and resolution
    // ------------------------------------------------------------------

    pub fn key_signature(&self) -> &KeySignature {
        &self.key_signature
    }

    pub fn set_root_note(&mut self, root_note: u8) {
        self.key_signature.set_root_note(root_note);
    }

    /// Change the scale type
    ///
    /// Cells already out of the new key are left untouched; Lock mode
    /// only constrains future activations.
    pub fn set_scale_type(&mut self, scale_type: ScaleType) {
        self.key_signature.set_scale_type(scale_type);
    }

    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        self.key_signature.set_filter_mode(filter_mode);
    }

    pub fn resolution(&self) -> Resolution {
        self.timer.resolution()
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.timer.set_resolution(resolution);
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply one control-surface command
    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::SetCell { step, row, active } => self.set_cell(step, row, active),
            Command::ToggleCell { step, row } => self.toggle_cell(step, row),
            Command::ClearAll => self.clear_all(),
            Command::Randomize => self.randomize(),
            Command::OctaveUp => self.shift_octave_up(),
            Command::OctaveDown => self.shift_octave_down(),
            Command::SetResolution(resolution) => self.set_resolution(resolution),
            Command::Config(change) => self.apply_config(change),
            Command::Start => self.start(),
            Command::Stop => self.stop(),
        }
    }

    /// Apply one typed configuration update
    ///
    /// Out-of-range values are silently ignored, keeping prior state.
    pub fn apply_config(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::RootNote(root_note) => {
                if let Ok(root_note) = u8::try_from(root_note) {
                    self.key_signature.set_root_note(root_note);
                }
            }
            ConfigChange::ScaleType(index) => {
                if let Some(scale_type) =
                    u8::try_from(index).ok().and_then(ScaleType::from_index)
                {
                    self.key_signature.set_scale_type(scale_type);
                }
            }
            ConfigChange::FilterMode(index) => {
                if let Some(filter_mode) =
                    u8::try_from(index).ok().and_then(FilterMode::from_index)
                {
                    self.key_signature.set_filter_mode(filter_mode);
                }
            }
            ConfigChange::NumSteps(num_steps) => self.set_num_steps(num_steps),
            ConfigChange::Bpm(bpm) => self.timer.set_bpm(bpm),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Snapshot the grid and key settings as one serializable record
    pub fn export_state(&self) -> SequencerState {
        let steps = (0..self.grid.num_steps())
            .filter_map(|index| {
                let active_rows: Vec<usize> = self.grid.active_rows(index).collect();
                (!active_rows.is_empty()).then_some(StepState { index, active_rows })
            })
            .collect();

        let time_signature = self.timer.time_signature();
        SequencerState {
            num_steps: self.grid.num_steps(),
            num_rows: self.grid.num_rows(),
            lowest_note: self.lowest_note,
            root_note: self.key_signature.root_note(),
            resolution: self.timer.resolution().index(),
            time_sig_numerator: time_signature.numerator,
            time_sig_denominator: time_signature.denominator,
            steps,
        }
    }

    /// Restore a previously exported record
    ///
    /// Mismatched dimensions re-initialize the grid before it is
    /// repopulated. Cells are written directly: Lock mode is an
    /// edit-time admission policy, not a load-time filter. Out-of-range
    /// step indices and rows in the record are dropped.
    pub fn import_state(&mut self, state: &SequencerState) {
        let num_steps = if state.num_steps == 0 { 16 } else { state.num_steps };
        let num_rows = if state.num_rows == 0 { 16 } else { state.num_rows };

        if num_steps != self.grid.num_steps() || num_rows != self.grid.num_rows() {
            self.initialize(num_steps, num_rows);
        } else {
            self.grid.clear();
        }

        self.lowest_note = (state.lowest_note as i16).clamp(LOWEST_NOTE_MIN, LOWEST_NOTE_MAX) as u8;
        self.key_signature.set_root_note(state.root_note);
        if let Some(resolution) = Resolution::from_index(state.resolution) {
            self.timer.set_resolution(resolution);
        }
        self.timer.set_time_signature(TimeSignature::new(
            state.time_sig_numerator,
            state.time_sig_denominator,
        ));

        for step in &state.steps {
            for &row in &step.active_rows {
                self.grid.set(step.index, row, true);
            }
        }
        debug!(
            "import_state: {num_steps} steps x {num_rows} rows, {} populated",
            state.steps.len()
        );
    }
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}
